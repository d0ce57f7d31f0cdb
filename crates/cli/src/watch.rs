// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Session supervision.
//!
//! [`run_once`] drives a single session to completion. [`WatchSupervisor`]
//! reruns sessions on file changes: at most one session is active, a burst
//! of changes during a run becomes exactly one rerun after it ends, and the
//! module cache is purged for every watched file before each rerun.
//!
//! Every input arrives as a [`WatchEvent`] on one channel: change batches
//! from the file watcher, completion callbacks from the engine, and SIGINT.

use std::collections::BTreeSet;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};

use crate::engine::{Engine, SessionHandle};
use crate::error::{Error, ExitCode, Result};
use crate::module::ModuleCache;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// Paths reported by the file watcher.
    Changed(Vec<PathBuf>),
    /// The active session called back.
    SessionEnded { failures: u32 },
    Interrupt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    Idle,
    Running,
    RunningWithPendingRerun,
    /// Terminal.
    Stopping,
}

/// Terminal side effects of watch mode.
pub trait Screen: Send {
    fn hide_cursor(&mut self);
    fn show_cursor(&mut self);
    fn clear_line(&mut self);
}

/// ANSI escapes on a writer (stdout in practice).
pub struct AnsiScreen<W: Write + Send> {
    out: W,
}

impl<W: Write + Send> AnsiScreen<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    fn emit(&mut self, code: &str) {
        if let Err(e) = self.out.write_all(code.as_bytes()).and_then(|()| self.out.flush()) {
            tracing::debug!("terminal write failed: {e}");
        }
    }
}

impl<W: Write + Send> Screen for AnsiScreen<W> {
    fn hide_cursor(&mut self) {
        self.emit("\x1b[?25l");
    }

    fn show_cursor(&mut self) {
        self.emit("\x1b[?25h");
    }

    fn clear_line(&mut self) {
        self.emit("\x1b[2K\r");
    }
}

/// Send the session's failure count back as an event.
fn completion(events: &Sender<WatchEvent>) -> crate::engine::OnComplete {
    let events = events.clone();
    Box::new(move |failures| {
        // The receiver is gone only when the process is exiting.
        let _ = events.send(WatchEvent::SessionEnded { failures });
    })
}

/// Run one session and wait for it.
///
/// An interrupt aborts the session and reports [`ExitCode::Interrupted`]
/// whatever the session's tally would have been.
pub fn run_once<E: Engine>(
    engine: &mut E,
    files: &[PathBuf],
    events: &Sender<WatchEvent>,
    rx: &Receiver<WatchEvent>,
) -> Result<ExitCode> {
    let session = engine.run(files, completion(events))?;
    for event in rx.iter() {
        match event {
            WatchEvent::SessionEnded { failures } => {
                tracing::debug!(failures, "session ended");
                return Ok(ExitCode::from_failures(failures));
            }
            WatchEvent::Interrupt => {
                tracing::debug!("interrupted");
                session.abort();
                return Ok(ExitCode::Interrupted);
            }
            WatchEvent::Changed(_) => {}
        }
    }
    Err(Error::Internal("event channel closed before the session ended".into()))
}

/// Reruns sessions on change events.
pub struct WatchSupervisor<E: Engine> {
    engine: E,
    cache: Arc<dyn ModuleCache>,
    files: Vec<PathBuf>,
    /// Canonical paths whose changes trigger a rerun.
    watched: BTreeSet<PathBuf>,
    /// Cache keys evicted before each rerun.
    purge_keys: BTreeSet<PathBuf>,
    events: Sender<WatchEvent>,
    active: Option<Box<dyn SessionHandle>>,
    pending_rerun: bool,
    stopping: bool,
    /// Drop the grep filter on rerun (grep was not given explicitly).
    reset_grep: bool,
    screen: Box<dyn Screen>,
    cursor_hidden: bool,
}

impl<E: Engine> WatchSupervisor<E> {
    pub fn new(
        engine: E,
        cache: Arc<dyn ModuleCache>,
        files: Vec<PathBuf>,
        watched: BTreeSet<PathBuf>,
        events: Sender<WatchEvent>,
    ) -> Self {
        let purge_keys = watched
            .iter()
            .cloned()
            .chain(files.iter().filter_map(|f| f.canonicalize().ok()))
            .collect();
        Self {
            engine,
            cache,
            files,
            watched,
            purge_keys,
            events,
            active: None,
            pending_rerun: false,
            stopping: false,
            reset_grep: false,
            screen: Box::new(AnsiScreen::new(io::stdout())),
            cursor_hidden: false,
        }
    }

    pub fn with_screen(mut self, screen: Box<dyn Screen>) -> Self {
        self.screen = screen;
        self
    }

    pub fn reset_grep_on_rerun(mut self, reset: bool) -> Self {
        self.reset_grep = reset;
        self
    }

    pub fn state(&self) -> WatchState {
        match (self.stopping, &self.active, self.pending_rerun) {
            (true, _, _) => WatchState::Stopping,
            (false, Some(_), true) => WatchState::RunningWithPendingRerun,
            (false, Some(_), false) => WatchState::Running,
            (false, None, _) => WatchState::Idle,
        }
    }

    /// Hide the cursor and start the first session.
    pub fn start(&mut self) {
        self.screen.hide_cursor();
        self.cursor_hidden = true;
        self.load_and_run();
    }

    /// Handle one event. Returns the exit code once stopping.
    pub fn handle(&mut self, event: WatchEvent) -> Option<ExitCode> {
        let before = self.state();
        let exit = match event {
            WatchEvent::Changed(paths) => {
                self.on_change(&paths);
                None
            }
            WatchEvent::SessionEnded { failures } => {
                self.on_session_end(failures);
                None
            }
            WatchEvent::Interrupt => Some(self.on_interrupt()),
        };
        let after = self.state();
        if before != after {
            tracing::debug!(?before, ?after, "watch transition");
        }
        exit
    }

    /// Start, then handle events until interrupted.
    pub fn run(&mut self, rx: &Receiver<WatchEvent>) -> ExitCode {
        self.start();
        for event in rx.iter() {
            if let Some(code) = self.handle(event) {
                return code;
            }
        }
        self.restore_cursor();
        ExitCode::Success
    }

    fn on_change(&mut self, paths: &[PathBuf]) {
        if self.stopping {
            return;
        }
        let Some(changed) = paths.iter().find(|p| self.watched.contains(*p)) else {
            tracing::trace!(?paths, "ignoring unwatched change");
            return;
        };
        tracing::debug!(path = %changed.display(), "watched file changed");

        match &self.active {
            Some(session) if !self.pending_rerun => {
                self.pending_rerun = true;
                session.abort();
            }
            Some(_) => tracing::trace!("rerun already pending"),
            None => self.rerun(),
        }
    }

    fn on_session_end(&mut self, failures: u32) {
        tracing::debug!(failures, "session ended");
        self.active = None;
        if self.stopping {
            return;
        }
        if self.pending_rerun {
            self.pending_rerun = false;
            self.rerun();
        }
    }

    fn on_interrupt(&mut self) -> ExitCode {
        self.stopping = true;
        if let Some(session) = &self.active {
            session.abort();
        }
        self.restore_cursor();
        ExitCode::Interrupted
    }

    fn rerun(&mut self) {
        self.purge();
        self.screen.clear_line();
        if self.reset_grep {
            self.engine.reset_grep();
        }
        self.load_and_run();
    }

    fn purge(&self) {
        let purged = self
            .purge_keys
            .iter()
            .filter(|path| self.cache.purge(path))
            .count();
        tracing::debug!(purged, "purged module cache");
    }

    fn load_and_run(&mut self) {
        match self.engine.run(&self.files, completion(&self.events)) {
            Ok(session) => self.active = Some(session),
            Err(e) => {
                tracing::warn!("cannot start session: {e}");
                eprintln!("trial: {e}");
            }
        }
    }

    fn restore_cursor(&mut self) {
        if self.cursor_hidden {
            self.screen.show_cursor();
            self.cursor_hidden = false;
        }
    }
}

impl<E: Engine> Drop for WatchSupervisor<E> {
    fn drop(&mut self) {
        self.restore_cursor();
    }
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;
