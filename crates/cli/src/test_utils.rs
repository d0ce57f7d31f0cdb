//! Shared unit test utilities.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::TempDir;

use crate::discovery::{ConfigFs, OsFs};

/// Creates an empty temp directory to act as a project root.
pub fn temp_project() -> TempDir {
    TempDir::new().unwrap()
}

/// Creates a directory tree from a list of (path, content) pairs.
///
/// Parent directories are created automatically.
///
/// # Example
///
/// ```ignore
/// let tmp = temp_project();
/// create_tree(tmp.path(), &[
///     (".trialrc.yml", "reporter: dot\n"),
///     ("test/a.sh", "exit 0\n"),
/// ]);
/// ```
pub fn create_tree(root: &Path, files: &[(&str, &str)]) {
    for (path, content) in files {
        let full_path = root.join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full_path, content).unwrap();
    }
}

/// Real filesystem that records every read.
#[derive(Debug, Default)]
pub struct RecordingFs {
    reads: Mutex<Vec<PathBuf>>,
    probes: Mutex<Vec<PathBuf>>,
}

impl RecordingFs {
    pub fn reads(&self) -> Vec<PathBuf> {
        self.reads.lock().unwrap().clone()
    }

    pub fn probes(&self) -> Vec<PathBuf> {
        self.probes.lock().unwrap().clone()
    }
}

impl ConfigFs for RecordingFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.reads.lock().unwrap().push(path.to_path_buf());
        OsFs.read_to_string(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.probes.lock().unwrap().push(path.to_path_buf());
        OsFs.is_file(path)
    }
}
