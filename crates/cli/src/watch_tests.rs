// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::Utc;
use crossbeam_channel::unbounded;

use super::*;
use crate::engine::OnComplete;
use crate::module::{MemoryModuleCache, Module, ModuleKind};

#[derive(Default)]
struct Counters {
    runs: AtomicUsize,
    aborts: AtomicUsize,
    grep_resets: AtomicUsize,
}

/// Engine that records calls; sessions end only when the test says so,
/// unless `complete_with` is set.
struct FakeEngine {
    counters: Arc<Counters>,
    complete_with: Option<u32>,
    fail_to_start: bool,
}

struct FakeSession(Arc<Counters>);

impl SessionHandle for FakeSession {
    fn abort(&self) {
        self.0.aborts.fetch_add(1, Ordering::SeqCst);
    }
}

impl Engine for FakeEngine {
    fn run(
        &mut self,
        _files: &[PathBuf],
        on_complete: OnComplete,
    ) -> Result<Box<dyn SessionHandle>> {
        if self.fail_to_start {
            return Err(Error::Internal("no engine".into()));
        }
        self.counters.runs.fetch_add(1, Ordering::SeqCst);
        if let Some(failures) = self.complete_with {
            on_complete(failures);
        }
        Ok(Box::new(FakeSession(Arc::clone(&self.counters))))
    }

    fn reset_grep(&mut self) {
        self.counters.grep_resets.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Clone, Default)]
struct RecordingScreen(Arc<Mutex<Vec<&'static str>>>);

impl RecordingScreen {
    fn calls(&self) -> Vec<&'static str> {
        self.0.lock().unwrap().clone()
    }
}

impl Screen for RecordingScreen {
    fn hide_cursor(&mut self) {
        self.0.lock().unwrap().push("hide");
    }
    fn show_cursor(&mut self) {
        self.0.lock().unwrap().push("show");
    }
    fn clear_line(&mut self) {
        self.0.lock().unwrap().push("clear");
    }
}

const WATCHED: &str = "/project/test/a.sh";

fn module(path: &str) -> Arc<Module> {
    Arc::new(Module {
        path: PathBuf::from(path),
        kind: ModuleKind::Script,
        source: Some(Arc::from("exit 0\n")),
        exports: None,
        loaded_at: Utc::now(),
    })
}

struct Harness {
    supervisor: WatchSupervisor<FakeEngine>,
    counters: Arc<Counters>,
    cache: Arc<MemoryModuleCache>,
    screen: RecordingScreen,
    rx: Receiver<WatchEvent>,
    tx: Sender<WatchEvent>,
}

impl Harness {
    fn new(engine: impl FnOnce(Arc<Counters>) -> FakeEngine) -> Self {
        let counters = Arc::new(Counters::default());
        let cache = Arc::new(MemoryModuleCache::new());
        let screen = RecordingScreen::default();
        let (tx, rx) = unbounded();
        let supervisor = WatchSupervisor::new(
            engine(Arc::clone(&counters)),
            cache.clone(),
            vec![PathBuf::from(WATCHED)],
            BTreeSet::from([PathBuf::from(WATCHED)]),
            tx.clone(),
        )
        .with_screen(Box::new(screen.clone()));
        Self {
            supervisor,
            counters,
            cache,
            screen,
            rx,
            tx,
        }
    }

    fn manual() -> Self {
        Self::new(|counters| FakeEngine {
            counters,
            complete_with: None,
            fail_to_start: false,
        })
    }

    fn runs(&self) -> usize {
        self.counters.runs.load(Ordering::SeqCst)
    }

    fn aborts(&self) -> usize {
        self.counters.aborts.load(Ordering::SeqCst)
    }

    fn change(&mut self, path: &str) -> Option<ExitCode> {
        self.supervisor
            .handle(WatchEvent::Changed(vec![PathBuf::from(path)]))
    }

    fn end(&mut self, failures: u32) -> Option<ExitCode> {
        self.supervisor.handle(WatchEvent::SessionEnded { failures })
    }
}

#[test]
fn start_runs_first_session_with_cursor_hidden() {
    let mut h = Harness::manual();
    assert_eq!(h.supervisor.state(), WatchState::Idle);

    h.supervisor.start();
    assert_eq!(h.supervisor.state(), WatchState::Running);
    assert_eq!(h.runs(), 1);
    assert_eq!(h.screen.calls(), ["hide"]);
}

#[test]
fn change_during_run_aborts_and_defers_rerun() {
    let mut h = Harness::manual();
    h.supervisor.start();

    h.change(WATCHED);
    assert_eq!(h.supervisor.state(), WatchState::RunningWithPendingRerun);
    assert_eq!(h.aborts(), 1);
    assert_eq!(h.runs(), 1);
}

#[test]
fn burst_of_changes_yields_one_rerun() {
    let mut h = Harness::manual();
    h.supervisor.start();

    for _ in 0..5 {
        h.change(WATCHED);
    }
    assert_eq!(h.aborts(), 1);

    h.end(0);
    assert_eq!(h.runs(), 2);
    assert_eq!(h.supervisor.state(), WatchState::Running);

    h.end(0);
    assert_eq!(h.runs(), 2);
    assert_eq!(h.supervisor.state(), WatchState::Idle);
}

#[test]
fn change_while_idle_purges_and_reruns_immediately() {
    let mut h = Harness::manual();
    h.supervisor.start();
    h.end(2);
    assert_eq!(h.supervisor.state(), WatchState::Idle);

    h.cache.set(module(WATCHED));
    h.cache.set(module("/project/lib/other.sh"));
    h.change(WATCHED);

    assert_eq!(h.runs(), 2);
    assert_eq!(h.supervisor.state(), WatchState::Running);
    assert!(h.cache.get(Path::new(WATCHED)).is_none());
    assert!(h.cache.get(Path::new("/project/lib/other.sh")).is_some());
    assert_eq!(h.screen.calls(), ["hide", "clear"]);
}

#[test]
fn pending_rerun_purges_before_starting() {
    let mut h = Harness::manual();
    h.supervisor.start();
    h.change(WATCHED);
    h.cache.set(module(WATCHED));

    h.end(1);
    assert!(h.cache.get(Path::new(WATCHED)).is_none());
    assert_eq!(h.runs(), 2);
}

#[test]
fn unwatched_change_is_ignored() {
    let mut h = Harness::manual();
    h.supervisor.start();
    h.end(0);

    h.change("/project/README.md");
    assert_eq!(h.runs(), 1);
    assert_eq!(h.supervisor.state(), WatchState::Idle);
}

#[test]
fn interrupt_aborts_and_restores_cursor() {
    let mut h = Harness::manual();
    h.supervisor.start();

    let code = h.supervisor.handle(WatchEvent::Interrupt);
    assert_eq!(code, Some(ExitCode::Interrupted));
    assert_eq!(code.map(ExitCode::code), Some(130));
    assert_eq!(h.supervisor.state(), WatchState::Stopping);
    assert_eq!(h.aborts(), 1);
    assert_eq!(h.screen.calls(), ["hide", "show"]);

    // Late completion and change events do not restart anything.
    h.end(7);
    h.change(WATCHED);
    assert_eq!(h.runs(), 1);
    assert_eq!(h.supervisor.state(), WatchState::Stopping);
}

#[test]
fn interrupt_while_idle_stops() {
    let mut h = Harness::manual();
    h.supervisor.start();
    h.end(0);

    assert_eq!(
        h.supervisor.handle(WatchEvent::Interrupt),
        Some(ExitCode::Interrupted)
    );
    assert_eq!(h.aborts(), 0);
}

#[test]
fn grep_is_reset_on_rerun_only_when_asked() {
    for (reset, expected) in [(true, 1), (false, 0)] {
        let mut h = Harness::manual();
        h.supervisor = h.supervisor.reset_grep_on_rerun(reset);
        h.supervisor.start();
        h.end(0);
        h.change(WATCHED);
        assert_eq!(h.counters.grep_resets.load(Ordering::SeqCst), expected);
    }
}

#[test]
fn failed_start_leaves_supervisor_idle() {
    let mut h = Harness::new(|counters| FakeEngine {
        counters,
        complete_with: None,
        fail_to_start: true,
    });
    h.supervisor.start();
    assert_eq!(h.supervisor.state(), WatchState::Idle);

    h.change(WATCHED);
    assert_eq!(h.supervisor.state(), WatchState::Idle);
}

#[test]
fn cursor_is_restored_on_drop() {
    let h = Harness::manual();
    let screen = h.screen.clone();
    let mut supervisor = h.supervisor;
    supervisor.start();
    drop(supervisor);
    assert_eq!(screen.calls(), ["hide", "show"]);
}

#[test]
fn run_loop_exits_on_interrupt() {
    let h = Harness::new(|counters| FakeEngine {
        counters,
        complete_with: Some(0),
        fail_to_start: false,
    });
    let Harness {
        mut supervisor,
        counters,
        rx,
        tx,
        ..
    } = h;

    // The first session completes during start; the change then reruns.
    let worker = std::thread::spawn(move || supervisor.run(&rx));
    tx.send(WatchEvent::Changed(vec![PathBuf::from(WATCHED)])).unwrap();
    while counters.runs.load(Ordering::SeqCst) < 2 {
        std::thread::yield_now();
    }
    tx.send(WatchEvent::Interrupt).unwrap();

    assert_eq!(worker.join().unwrap(), ExitCode::Interrupted);
}

#[test]
fn run_once_reports_failures() {
    let counters = Arc::new(Counters::default());
    let mut engine = FakeEngine {
        counters,
        complete_with: Some(3),
        fail_to_start: false,
    };
    let (tx, rx) = unbounded();

    let code = run_once(&mut engine, &[PathBuf::from(WATCHED)], &tx, &rx).unwrap();
    assert_eq!(code, ExitCode::Failures(3));
}

#[test]
fn run_once_interrupt_overrides_failure_count() {
    let counters = Arc::new(Counters::default());
    let mut engine = FakeEngine {
        counters: Arc::clone(&counters),
        complete_with: Some(3),
        fail_to_start: false,
    };
    let (tx, rx) = unbounded();
    tx.send(WatchEvent::Interrupt).unwrap();

    let code = run_once(&mut engine, &[PathBuf::from(WATCHED)], &tx, &rx).unwrap();
    assert_eq!(code.code(), 130);
    assert_eq!(counters.aborts.load(Ordering::SeqCst), 1);
}
