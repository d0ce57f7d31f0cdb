// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Reporter implemented by a loaded module.
//!
//! The module runs once per session end, with the JSON summary on stdin and
//! stdout/stderr inherited.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use super::{FileOutcome, Reporter, Summary};
use crate::module::Module;

pub struct ExternalReporter {
    module: Arc<Module>,
    cwd: PathBuf,
}

impl ExternalReporter {
    pub fn new(module: Arc<Module>, cwd: PathBuf) -> Self {
        Self { module, cwd }
    }
}

impl Reporter for ExternalReporter {
    fn start(&mut self, _total: usize) -> io::Result<()> {
        Ok(())
    }

    fn pass(&mut self, _outcome: &FileOutcome) -> io::Result<()> {
        Ok(())
    }

    fn fail(&mut self, _outcome: &FileOutcome) -> io::Result<()> {
        Ok(())
    }

    fn pending(&mut self, _path: &Path) -> io::Result<()> {
        Ok(())
    }

    fn end(&mut self, summary: &Summary) -> io::Result<()> {
        let payload = serde_json::to_vec(summary)?;
        let mut child = self
            .module
            .command(&self.cwd)
            .stdin(Stdio::piped())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            // A reporter that exits without reading its input is not an error.
            if let Err(e) = stdin.write_all(&payload)
                && e.kind() != io::ErrorKind::BrokenPipe
            {
                return Err(e);
            }
        }

        let status = child.wait()?;
        if !status.success() {
            tracing::warn!(path = %self.module.path.display(), %status, "reporter module failed");
        }
        Ok(())
    }
}
