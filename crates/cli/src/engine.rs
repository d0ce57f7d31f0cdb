// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Run sessions.
//!
//! An [`Engine`] starts one session at a time over a fixed file list and
//! reports the failure count through a completion callback. Abort is
//! cooperative: the session checks its flag between files and still calls
//! back when it stops.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use chrono::Utc;
use regex::Regex;

use crate::error::{Error, Result};
use crate::module::ModuleLoader;
use crate::options::{OptionValue, Options};
use crate::report::{FileOutcome, FileRecord, Reporter, Summary};

/// Called once with the session's failure count.
pub type OnComplete = Box<dyn FnOnce(u32) + Send>;

/// Handle to a running session.
pub trait SessionHandle: Send {
    /// Ask the session to stop after the current file.
    fn abort(&self);
}

/// Starts run sessions.
pub trait Engine {
    fn run(&mut self, files: &[PathBuf], on_complete: OnComplete) -> Result<Box<dyn SessionHandle>>;

    /// Drop the grep filter for subsequent sessions.
    fn reset_grep(&mut self);
}

/// How often a running test process is polled for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Options forwarded to test processes as `TRIAL_<NAME>` variables.
const FORWARDED: &[&str] = &[
    "allow-uncaught",
    "async-only",
    "check-leaks",
    "delay",
    "diff",
    "forbid-only",
    "forbid-pending",
    "full-trace",
    "globals",
    "inline-diffs",
    "slow",
    "ui",
];

fn env_name(option: &str) -> String {
    format!("TRIAL_{}", option.replace('-', "_").to_uppercase())
}

fn env_value(value: &OptionValue) -> String {
    match value {
        OptionValue::Bool(b) => String::from(if *b { "1" } else { "0" }),
        OptionValue::Number(n) => n.to_string(),
        OptionValue::String(s) => s.clone(),
        OptionValue::List(items) => items.join(","),
    }
}

/// Session settings derived from resolved options.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub cwd: PathBuf,
    /// Files whose path matches (or, inverted, does not match) run.
    pub grep: Option<Regex>,
    pub invert: bool,
    pub bail: bool,
    pub retries: u32,
    /// Per-file limit; `None` disables timeouts.
    pub timeout: Option<Duration>,
    pub env: Vec<(String, String)>,
}

impl EngineSettings {
    pub fn from_options(options: &Options, cwd: &Path) -> Result<Self> {
        let grep = match (options.string("grep"), options.string("fgrep")) {
            (Some(pattern), _) if !pattern.is_empty() => Some(
                Regex::new(pattern)
                    .map_err(|e| Error::Argument(format!("invalid --grep regexp: {e}")))?,
            ),
            (_, Some(literal)) if !literal.is_empty() => Some(
                Regex::new(&regex::escape(literal))
                    .map_err(|e| Error::Internal(e.to_string()))?,
            ),
            _ => None,
        };

        let timeout_ms = options.number("timeout").unwrap_or(2000.0);
        let timeout = if options.flag("no-timeouts") || timeout_ms <= 0.0 {
            None
        } else {
            Some(Duration::from_millis(timeout_ms as u64))
        };

        let mut env: Vec<(String, String)> = FORWARDED
            .iter()
            .filter_map(|name| Some((env_name(name), env_value(options.get(name)?))))
            .collect();
        env.push((
            env_name("timeout"),
            timeout.map_or(0, |t| t.as_millis()).to_string(),
        ));

        Ok(Self {
            cwd: cwd.to_path_buf(),
            grep,
            invert: options.flag("invert"),
            bail: options.flag("bail"),
            retries: options.number("retries").unwrap_or(0.0).max(0.0) as u32,
            timeout,
            env,
        })
    }

    /// Whether the grep filter selects this file.
    pub fn selects(&self, path: &Path) -> bool {
        match &self.grep {
            Some(re) => re.is_match(&path.to_string_lossy()) != self.invert,
            None => true,
        }
    }
}

/// Shared reporter slot.
pub type SharedReporter = Arc<Mutex<Box<dyn Reporter>>>;

/// Runs each test file as a child process on a worker thread.
pub struct ProcessEngine {
    settings: EngineSettings,
    loader: Arc<dyn ModuleLoader>,
    reporter: SharedReporter,
}

impl ProcessEngine {
    pub fn new(
        settings: EngineSettings,
        loader: Arc<dyn ModuleLoader>,
        reporter: Box<dyn Reporter>,
    ) -> Self {
        Self {
            settings,
            loader,
            reporter: Arc::new(Mutex::new(reporter)),
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }
}

impl Engine for ProcessEngine {
    fn run(
        &mut self,
        files: &[PathBuf],
        on_complete: OnComplete,
    ) -> Result<Box<dyn SessionHandle>> {
        let abort = Arc::new(AtomicBool::new(false));
        let session = Session {
            files: files.to_vec(),
            settings: self.settings.clone(),
            loader: Arc::clone(&self.loader),
            reporter: Arc::clone(&self.reporter),
            abort: Arc::clone(&abort),
        };

        let worker = thread::Builder::new()
            .name("trial-session".to_string())
            .spawn(move || {
                let failures = session.run();
                on_complete(failures);
            })
            .map_err(|e| Error::Internal(format!("cannot start session: {e}")))?;

        tracing::debug!(files = files.len(), "session started");
        Ok(Box::new(ProcessSession {
            abort,
            _worker: worker,
        }))
    }

    fn reset_grep(&mut self) {
        if self.settings.grep.take().is_some() {
            tracing::debug!("grep filter reset");
        }
    }
}

struct ProcessSession {
    abort: Arc<AtomicBool>,
    _worker: JoinHandle<()>,
}

impl SessionHandle for ProcessSession {
    fn abort(&self) {
        tracing::debug!("session abort requested");
        self.abort.store(true, Ordering::SeqCst);
    }
}

struct Session {
    files: Vec<PathBuf>,
    settings: EngineSettings,
    loader: Arc<dyn ModuleLoader>,
    reporter: SharedReporter,
    abort: Arc<AtomicBool>,
}

impl Session {
    fn report(&self, event: impl FnOnce(&mut dyn Reporter) -> std::io::Result<()>) {
        let mut reporter = self.reporter.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = event(reporter.as_mut()) {
            tracing::warn!("reporter error: {e}");
        }
    }

    fn run(&self) -> u32 {
        let clock = Instant::now();
        let mut summary = Summary::new(Utc::now());
        self.report(|r| r.start(self.files.len()));

        for path in &self.files {
            if self.abort.load(Ordering::SeqCst) {
                summary.aborted = true;
                break;
            }
            if !self.settings.selects(path) {
                self.report(|r| r.pending(path));
                summary.record(FileRecord::pending(path));
                continue;
            }

            let outcome = self.run_file(path);
            if outcome.passed {
                self.report(|r| r.pass(&outcome));
            } else {
                self.report(|r| r.fail(&outcome));
            }
            summary.record(FileRecord::from(&outcome));

            if !outcome.passed && self.settings.bail {
                tracing::debug!(path = %path.display(), "bail after first failure");
                break;
            }
        }

        summary.duration_ms = clock.elapsed().as_millis() as u64;
        self.report(|r| r.end(&summary));
        tracing::debug!(
            passes = summary.passes,
            failures = summary.failures,
            aborted = summary.aborted,
            "session finished"
        );
        summary.failures
    }

    /// Run one file, retrying failures.
    fn run_file(&self, path: &Path) -> FileOutcome {
        let clock = Instant::now();
        let mut attempts = 0;
        loop {
            attempts += 1;
            let (passed, timed_out, output) = match self.attempt(path, attempts) {
                Ok(result) => result,
                Err(e) => (false, false, e.to_string()),
            };
            if passed || attempts > self.settings.retries {
                return FileOutcome {
                    path: path.to_path_buf(),
                    passed,
                    duration: clock.elapsed(),
                    attempts,
                    timed_out,
                    output,
                };
            }
            tracing::debug!(path = %path.display(), attempts, "retrying failed file");
        }
    }

    fn attempt(&self, path: &Path, attempt: u32) -> Result<(bool, bool, String)> {
        let module = self.loader.load(path)?;
        let mut cmd = module.command(&self.settings.cwd);
        cmd.envs(self.settings.env.iter().cloned())
            .env("TRIAL_FILE", &module.path)
            .env("TRIAL_ATTEMPT", attempt.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let io_error = |source| Error::Io {
            path: module.path.clone(),
            source,
        };
        let mut child = cmd.spawn().map_err(io_error)?;
        let stdout = capture(child.stdout.take());
        let stderr = capture(child.stderr.take());

        let (status, timed_out) = wait(&mut child, self.settings.timeout).map_err(io_error)?;
        let mut output = join(stdout);
        output.push_str(&join(stderr));
        if timed_out {
            output.push_str(&format!(
                "timeout of {}ms exceeded\n",
                self.settings.timeout.map_or(0, |t| t.as_millis())
            ));
        }

        tracing::trace!(path = %module.path.display(), ?status, timed_out, "file finished");
        Ok((status.is_some_and(|s| s.success()), timed_out, output))
    }
}

fn capture<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<String>> {
    let mut pipe = pipe?;
    Some(thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }))
}

fn join(handle: Option<JoinHandle<String>>) -> String {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}

/// Wait for exit, killing the child once `timeout` passes.
/// Returns the exit status (`None` when killed) and whether it timed out.
fn wait(
    child: &mut Child,
    timeout: Option<Duration>,
) -> std::io::Result<(Option<std::process::ExitStatus>, bool)> {
    let Some(timeout) = timeout else {
        return Ok((Some(child.wait()?), false));
    };
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok((Some(status), false));
        }
        if Instant::now() >= deadline {
            child.kill()?;
            child.wait()?;
            return Ok((None, true));
        }
        thread::sleep(POLL_INTERVAL);
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
