// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Test-file lookup.
//!
//! Each `spec` pattern is a file, a directory, or a glob. Directories list
//! files with one of the configured extensions; globs are matched over a
//! walk of their literal prefix directory.

use std::path::{Component, Path, PathBuf};

use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};

use crate::error::{Error, Result};
use crate::options::Options;
use crate::walker::{FileWalker, WalkerConfig};

/// Resolved test files plus warnings for patterns that matched nothing.
#[derive(Debug, Default)]
pub struct FileSet {
    pub files: Vec<PathBuf>,
    pub warnings: Vec<String>,
}

impl FileSet {
    /// Error out when nothing was found.
    pub fn require_files(&self, spec: &[String]) -> Result<()> {
        if !self.files.is_empty() {
            return Ok(());
        }
        let patterns = spec
            .iter()
            .map(|p| format!("\"{p}\""))
            .collect::<Vec<_>>()
            .join(", ");
        Err(Error::Argument(format!("No test files found: {patterns}")))
    }
}

fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '[', '{'])
}

fn absolute(cwd: &Path, path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    let joined = cwd.join(path);
    // Drop `.` components so `./test/a.sh` and `test/a.sh` compare equal.
    joined
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

fn push_unique(files: &mut Vec<PathBuf>, path: PathBuf) {
    if !files.contains(&path) {
        files.push(path);
    }
}

/// Longest leading run of components without glob characters.
fn literal_base(pattern: &Path) -> PathBuf {
    pattern
        .components()
        .take_while(|c| !is_glob(&c.as_os_str().to_string_lossy()))
        .collect()
}

fn glob_error(pattern: &str, e: globset::Error) -> Error {
    Error::Argument(format!("invalid glob pattern '{pattern}': {e}"))
}

/// Files matched by one pattern, in walk order.
pub fn lookup_pattern(
    pattern: &str,
    cwd: &Path,
    extensions: &[String],
    recursive: bool,
) -> Result<Vec<PathBuf>> {
    let path = absolute(cwd, pattern);

    if !is_glob(pattern) {
        if path.is_file() {
            return Ok(vec![path]);
        }
        if path.is_dir() {
            let walker = FileWalker::new(WalkerConfig::for_extensions(extensions, recursive));
            let (files, _) = walker.walk_collect(&path);
            return Ok(files.into_iter().map(|f| f.path).collect());
        }
        // `test/a` also finds `test/a.sh`.
        let with_extension = extensions.iter().find_map(|ext| {
            let candidate = PathBuf::from(format!(
                "{}.{}",
                path.display(),
                ext.trim_start_matches('.')
            ));
            candidate.is_file().then_some(candidate)
        });
        return Ok(with_extension.into_iter().collect());
    }

    let matcher = GlobBuilder::new(&path.to_string_lossy())
        .literal_separator(true)
        .build()
        .map_err(|e| glob_error(pattern, e))?
        .compile_matcher();
    let base = literal_base(&path);
    if !base.is_dir() {
        return Ok(Vec::new());
    }

    let walker = FileWalker::new(WalkerConfig::default());
    let (files, _) = walker.walk_collect(&base);
    Ok(files
        .into_iter()
        .map(|f| f.path)
        .filter(|p| matcher.is_match(p))
        .collect())
}

fn exclusions(patterns: &[String], cwd: &Path) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(&absolute(cwd, pattern).to_string_lossy())
            .map_err(|e| glob_error(pattern, e))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| Error::Argument(format!("invalid exclude pattern: {e}")))
}

/// Resolve the test files named by `spec`, `file`, `exclude`, `extension`,
/// `recursive` and `sort`.
pub fn handle_files(options: &Options, cwd: &Path) -> Result<FileSet> {
    let extensions = options.list("extension");
    let recursive = options.flag("recursive");
    let excluded = exclusions(options.list("exclude"), cwd)?;

    let mut set = FileSet::default();
    let mut found = Vec::new();
    for pattern in options.list("spec") {
        let matched = lookup_pattern(pattern, cwd, extensions, recursive)?;
        if matched.is_empty() {
            set.warnings.push(format!(
                "Warning: Could not find any test files matching pattern: {pattern}"
            ));
            continue;
        }
        tracing::debug!(%pattern, count = matched.len(), "spec pattern matched");
        for path in matched {
            if excluded.is_match(&path) {
                tracing::trace!(path = %path.display(), "excluded");
                continue;
            }
            push_unique(&mut found, path);
        }
    }

    if options.flag("sort") {
        found.sort();
    }

    for file in options.list("file") {
        push_unique(&mut set.files, absolute(cwd, file));
    }
    for path in found {
        push_unique(&mut set.files, path);
    }

    Ok(set)
}

#[cfg(test)]
#[path = "lookup_tests.rs"]
mod tests;
