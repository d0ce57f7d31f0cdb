// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

/// Trial error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Explicitly named config file could not be read or parsed
    #[error("config error: {message}")]
    Config {
        message: String,
        path: Option<PathBuf>,
    },

    /// Invalid command-line arguments or option values
    #[error("{0}")]
    Argument(String),

    /// Reporter or interface could not be resolved
    #[error("{0}")]
    Plugin(String),

    /// Side-loaded module could not be loaded or executed
    #[error("module error: {}: {message}", .path.display())]
    Module { path: PathBuf, message: String },

    /// File I/O error
    #[error("io error: {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Internal error (bug)
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Build a config error for a file path.
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            path: Some(path.into()),
        }
    }
}

/// Result type using trial Error
pub type Result<T> = std::result::Result<T, Error>;

/// Exit code reserved for a user interrupt (128 + SIGINT).
pub const INTERRUPT_EXIT_CODE: i32 = 130;

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// All tests passed (or a terminal flag was handled)
    Success,
    /// Configuration, argument or plugin error
    ConfigError,
    /// Normal completion with this many failures
    Failures(u32),
    /// User interrupt
    Interrupted,
    /// Internal error
    InternalError,
}

impl ExitCode {
    /// Exit code for a completed session; failure counts are capped at 255.
    pub fn from_failures(failures: u32) -> Self {
        if failures == 0 {
            ExitCode::Success
        } else {
            ExitCode::Failures(failures)
        }
    }

    /// Numeric process exit code.
    pub fn code(self) -> i32 {
        match self {
            ExitCode::Success => 0,
            ExitCode::ConfigError | ExitCode::InternalError => 1,
            ExitCode::Failures(n) => n.min(255) as i32,
            ExitCode::Interrupted => INTERRUPT_EXIT_CODE,
        }
    }
}

impl From<&Error> for ExitCode {
    fn from(err: &Error) -> Self {
        match err {
            Error::Config { .. }
            | Error::Argument(_)
            | Error::Plugin(_)
            | Error::Module { .. }
            | Error::Io { .. } => ExitCode::ConfigError,
            Error::Internal(_) => ExitCode::InternalError,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
