// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! JSON reporter.
//!
//! Buffered: nothing is written until the session ends, then the whole
//! [`Summary`] is written as one pretty-printed object.

use std::io::{self, Write};
use std::path::Path;

use super::{FileOutcome, Reporter, Summary};

pub struct JsonReporter<W: Write> {
    out: W,
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> Reporter for JsonReporter<W> {
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
        serde_json::to_writer_pretty(&mut self.out, summary)?;
        writeln!(self.out)?;
        self.out.flush()
    }
}

#[cfg(test)]
#[path = "json_tests.rs"]
mod tests;
