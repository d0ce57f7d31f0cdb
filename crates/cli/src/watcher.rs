// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! File-change notifications for watch mode.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crossbeam_channel::Sender;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::error::{Error, Result};
use crate::walker::{FileWalker, WalkerConfig};
use crate::watch::WatchEvent;

/// Canonical paths of every file under `root` with one of `extensions`.
pub fn watch_set(root: &Path, extensions: &[String]) -> BTreeSet<PathBuf> {
    let walker = FileWalker::new(WalkerConfig::for_extensions(extensions, true));
    let (files, stats) = walker.walk_collect(root);
    tracing::debug!(files = stats.files_found, "watch set collected");
    files
        .into_iter()
        .filter_map(|f| f.path.canonicalize().ok())
        .collect()
}

fn is_change(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}

/// Forward changes under the parent directories of `paths` as
/// [`WatchEvent::Changed`]. The returned watcher must be kept alive.
pub fn watch_paths(
    paths: &BTreeSet<PathBuf>,
    events: Sender<WatchEvent>,
) -> Result<RecommendedWatcher> {
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
        Ok(event) if is_change(&event.kind) => {
            let changed: Vec<PathBuf> = event
                .paths
                .into_iter()
                .map(|p| p.canonicalize().unwrap_or(p))
                .collect();
            let _ = events.send(WatchEvent::Changed(changed));
        }
        Ok(_) => {}
        Err(e) => tracing::warn!("watch error: {e}"),
    })
    .map_err(|e| Error::Internal(format!("cannot start file watcher: {e}")))?;

    let dirs: BTreeSet<&Path> = paths.iter().filter_map(|p| p.parent()).collect();
    for dir in &dirs {
        watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .map_err(|e| Error::Internal(format!("cannot watch {}: {e}", dir.display())))?;
    }
    tracing::debug!(dirs = dirs.len(), "watching directories");
    Ok(watcher)
}

#[cfg(test)]
#[path = "watcher_tests.rs"]
mod tests;
