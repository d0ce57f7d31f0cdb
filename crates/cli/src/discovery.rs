// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Config file discovery.
//!
//! Walks from a start directory up through every ancestor looking for rc
//! files or the package manifest. File access goes through [`ConfigFs`] so
//! resolution can be observed in tests.

use std::io;
use std::path::{Path, PathBuf};

/// Recognized rc file names, in lookup order within one directory.
pub const RC_FILES: &[&str] = &[
    ".trialrc.sh",
    ".trialrc.yaml",
    ".trialrc.yml",
    ".trialrc.toml",
    ".trialrc.json",
];

/// Package manifest file name.
pub const PACKAGE_FILE: &str = "package.json";

/// Filesystem access used by config discovery and loading.
pub trait ConfigFs: Send + Sync {
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
    fn is_file(&self, path: &Path) -> bool;
}

/// The real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFs;

impl ConfigFs for OsFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// Find the nearest rc file, starting at `start_dir` and walking up.
pub fn find_config(fs: &dyn ConfigFs, start_dir: &Path) -> Option<PathBuf> {
    start_dir.ancestors().find_map(|dir| {
        RC_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| fs.is_file(candidate))
    })
}

/// Find the nearest file called `name`, starting at `start_dir` and walking up.
pub fn find_up(fs: &dyn ConfigFs, name: &str, start_dir: &Path) -> Option<PathBuf> {
    start_dir
        .ancestors()
        .map(|dir| dir.join(name))
        .find(|candidate| fs.is_file(candidate))
}

#[cfg(test)]
#[path = "discovery_tests.rs"]
mod tests;
