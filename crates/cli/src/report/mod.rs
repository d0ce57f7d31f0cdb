// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Reporters for session progress and results.
//!
//! The engine drives a [`Reporter`] with one event per test file and a
//! [`Summary`] at the end of the session. Builtins render to any
//! `termcolor::WriteColor`; an external reporter module receives the JSON
//! summary on stdin.

mod external;
mod json;
mod text;

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use termcolor::{ColorChoice, StandardStream};

use crate::error::{Error, Result};
use crate::options::Options;
use crate::plugin::ResolvedPlugin;

pub use external::ExternalReporter;
pub use json::JsonReporter;
pub use text::{DotReporter, SpecReporter, TapReporter};

/// Result of running one test file.
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub passed: bool,
    pub duration: Duration,
    /// Runs including retries.
    pub attempts: u32,
    pub timed_out: bool,
    /// Captured stdout followed by stderr of the last attempt.
    pub output: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileState {
    Passed,
    Failed,
    /// Filtered out by grep.
    Pending,
}

/// Per-file entry of a [`Summary`].
#[derive(Debug, Clone, Serialize)]
pub struct FileRecord {
    pub path: PathBuf,
    pub state: FileState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "is_zero")]
    pub attempts: u32,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub timed_out: bool,
    /// Captured output, kept for failures only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

fn is_zero(n: &u32) -> bool {
    *n == 0
}

impl FileRecord {
    pub fn pending(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            state: FileState::Pending,
            duration_ms: None,
            attempts: 0,
            timed_out: false,
            output: None,
        }
    }
}

impl From<&FileOutcome> for FileRecord {
    fn from(outcome: &FileOutcome) -> Self {
        Self {
            path: outcome.path.clone(),
            state: if outcome.passed {
                FileState::Passed
            } else {
                FileState::Failed
            },
            duration_ms: Some(outcome.duration.as_millis() as u64),
            attempts: outcome.attempts,
            timed_out: outcome.timed_out,
            output: (!outcome.passed).then(|| outcome.output.clone()),
        }
    }
}

/// Totals and per-file records of one session.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub passes: u32,
    pub failures: u32,
    pub pending: u32,
    /// The session stopped early on abort.
    pub aborted: bool,
    pub files: Vec<FileRecord>,
}

impl Summary {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            duration_ms: 0,
            passes: 0,
            failures: 0,
            pending: 0,
            aborted: false,
            files: Vec::new(),
        }
    }

    pub fn record(&mut self, record: FileRecord) {
        match record.state {
            FileState::Passed => self.passes += 1,
            FileState::Failed => self.failures += 1,
            FileState::Pending => self.pending += 1,
        }
        self.files.push(record);
    }

    pub fn failed(&self) -> impl Iterator<Item = &FileRecord> {
        self.files.iter().filter(|f| f.state == FileState::Failed)
    }
}

/// Receives session events.
pub trait Reporter: Send {
    fn start(&mut self, total: usize) -> io::Result<()>;
    fn pass(&mut self, outcome: &FileOutcome) -> io::Result<()>;
    fn fail(&mut self, outcome: &FileOutcome) -> io::Result<()>;
    fn pending(&mut self, path: &Path) -> io::Result<()>;
    fn end(&mut self, summary: &Summary) -> io::Result<()>;
}

/// Settings shared by all reporters.
#[derive(Debug, Clone)]
pub struct ReporterConfig {
    /// Files slower than this are flagged.
    pub slow: Duration,
    /// Parsed `reporter-options`.
    pub options: BTreeMap<String, String>,
    /// Base for relative paths in output.
    pub cwd: PathBuf,
}

impl ReporterConfig {
    pub fn from_options(options: &Options, cwd: &Path) -> Result<Self> {
        let slow = options.number("slow").unwrap_or(75.0).max(0.0);
        Ok(Self {
            slow: Duration::from_millis(slow as u64),
            options: options.reporter_options()?,
            cwd: cwd.to_path_buf(),
        })
    }

    /// Path relative to the working directory, for display.
    pub fn display_path<'a>(&self, path: &'a Path) -> std::borrow::Cow<'a, str> {
        path.strip_prefix(&self.cwd)
            .unwrap_or(path)
            .to_string_lossy()
    }
}

/// Instantiate the resolved reporter.
pub fn build_reporter(
    resolved: &ResolvedPlugin,
    config: ReporterConfig,
    color: ColorChoice,
) -> Result<Box<dyn Reporter>> {
    let name = match resolved {
        ResolvedPlugin::Module { module, .. } => {
            return Ok(Box::new(ExternalReporter::new(module.clone(), config.cwd)));
        }
        ResolvedPlugin::Builtin(name) => name.as_str(),
    };

    let stdout = || StandardStream::stdout(color);
    let reporter: Box<dyn Reporter> = match name {
        "spec" => Box::new(SpecReporter::new(stdout(), config)),
        "dot" => Box::new(DotReporter::new(stdout(), config)),
        "tap" => Box::new(TapReporter::new(stdout(), config)),
        "json" => match config.options.get("output") {
            Some(target) => {
                let path = config.cwd.join(target);
                let file = File::create(&path).map_err(|source| Error::Io {
                    path: path.clone(),
                    source,
                })?;
                Box::new(JsonReporter::new(BufWriter::new(file)))
            }
            None => Box::new(JsonReporter::new(io::stdout())),
        },
        other => {
            return Err(Error::Plugin(format!(
                "reporter '{other}' has no builtin implementation"
            )));
        }
    };
    tracing::debug!(reporter = name, "built reporter");
    Ok(reporter)
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
