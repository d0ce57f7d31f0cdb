// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Directory walking for test lookup and the watch set.
//!
//! Built on the `ignore` crate. Files stream through a bounded channel from
//! a background thread; [`FileWalker::walk_collect`] gathers them sorted.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender, bounded};
use ignore::{DirEntry, WalkBuilder};

/// Depth limit for recursive walks.
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Directories never entered.
pub(crate) const SKIP_DIRECTORIES: &[&str] = &["node_modules", ".git"];

const CHANNEL_CAPACITY: usize = 1000;

fn is_loop_error(err: &ignore::Error) -> bool {
    match err {
        ignore::Error::Loop { .. } => true,
        ignore::Error::WithPath { err, .. }
        | ignore::Error::WithDepth { err, .. }
        | ignore::Error::WithLineNumber { err, .. } => is_loop_error(err),
        _ => false,
    }
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_some_and(|t| t.is_dir())
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| SKIP_DIRECTORIES.contains(&name))
}

#[derive(Debug, Clone)]
pub struct WalkerConfig {
    /// `Some(1)` lists the root's direct children only.
    pub max_depth: Option<usize>,

    /// Accepted extensions, without the dot. Empty accepts every file.
    pub extensions: Vec<String>,

    /// Honour `.gitignore` and git excludes.
    pub git_ignore: bool,

    /// Skip dot files and dot directories below the root.
    pub hidden: bool,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            max_depth: Some(DEFAULT_MAX_DEPTH),
            extensions: Vec::new(),
            git_ignore: false,
            hidden: true,
        }
    }
}

impl WalkerConfig {
    /// Files with one of `extensions`, descending only when `recursive`.
    pub fn for_extensions(extensions: &[String], recursive: bool) -> Self {
        Self {
            max_depth: Some(if recursive { DEFAULT_MAX_DEPTH } else { 1 }),
            extensions: extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_string())
                .collect(),
            ..Self::default()
        }
    }

    fn accepts(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        path.extension()
            .and_then(OsStr::to_str)
            .is_some_and(|ext| self.extensions.iter().any(|e| e == ext))
    }

    fn builder(&self, root: &Path) -> WalkBuilder {
        let mut builder = WalkBuilder::new(root);
        builder
            .hidden(self.hidden)
            .ignore(false)
            .parents(self.git_ignore)
            .git_ignore(self.git_ignore)
            .git_exclude(self.git_ignore)
            .git_global(self.git_ignore)
            .follow_links(true)
            .max_depth(self.max_depth)
            .filter_entry(|entry| !is_skipped_dir(entry));
        builder
    }
}

/// A file found by the walker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkedFile {
    pub path: PathBuf,
    /// 1 for the root's direct children.
    pub depth: usize,
}

/// Counters for one walk.
#[derive(Debug, Default)]
pub struct WalkStats {
    pub files_found: usize,
    /// Files rejected for their extension.
    pub files_filtered: usize,
    pub symlink_loops: usize,
    pub errors: usize,
}

pub struct FileWalker {
    config: WalkerConfig,
}

impl FileWalker {
    pub fn new(config: WalkerConfig) -> Self {
        Self { config }
    }

    /// Start walking `root` on a background thread.
    ///
    /// Join the returned handle for the counters once the receiver is
    /// drained.
    pub fn walk(&self, root: &Path) -> (Receiver<WalkedFile>, JoinHandle<WalkStats>) {
        let (tx, rx) = bounded(CHANNEL_CAPACITY);
        let walk = self.config.builder(root).build();
        let config = self.config.clone();
        let handle = std::thread::spawn(move || stream(walk, &config, &tx));
        (rx, handle)
    }

    /// Walk `root` to completion. Files are sorted by path.
    pub fn walk_collect(&self, root: &Path) -> (Vec<WalkedFile>, WalkStats) {
        let (rx, handle) = self.walk(root);
        let mut files: Vec<WalkedFile> = rx.iter().collect();
        files.sort_by(|a, b| a.path.cmp(&b.path));
        let stats = handle.join().unwrap_or_default();
        tracing::trace!(
            root = %root.display(),
            found = stats.files_found,
            filtered = stats.files_filtered,
            "walk finished"
        );
        (files, stats)
    }
}

fn stream(walk: ignore::Walk, config: &WalkerConfig, tx: &Sender<WalkedFile>) -> WalkStats {
    let mut stats = WalkStats::default();
    for result in walk {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) if is_loop_error(&err) => {
                tracing::warn!("symlink loop: {err}");
                stats.symlink_loops += 1;
                continue;
            }
            Err(err) => {
                tracing::warn!("walk error: {err}");
                stats.errors += 1;
                continue;
            }
        };

        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        if !config.accepts(entry.path()) {
            stats.files_filtered += 1;
            continue;
        }

        stats.files_found += 1;
        let file = WalkedFile {
            depth: entry.depth(),
            path: entry.into_path(),
        };
        if tx.send(file).is_err() {
            break;
        }
    }
    stats
}

#[cfg(test)]
#[path = "walker_tests.rs"]
mod tests;
