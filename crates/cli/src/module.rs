// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Module loading with a path-keyed cache.
//!
//! Test files, side-loaded requires and plugin modules are all loaded
//! through a [`ModuleLoader`]. A loaded module is cached by its canonical
//! path, so a second load sees the first load's content until the entry is
//! purged. Watch mode purges changed files before each rerun.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde_json::Value;

use crate::error::{Error, Result};

/// Extensions tried after the bare name when resolving a request.
const RESOLVE_EXTENSIONS: &[&str] = &["json", "sh"];

/// Plugin search directory, relative to the working directory.
pub const LOCAL_PLUGIN_DIR: &str = ".trial/plugins";

/// Colon-separated extra plugin search roots.
pub const PLUGIN_PATH_ENV: &str = "TRIAL_PLUGIN_PATH";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleKind {
    /// Parsed JSON exports.
    Json,
    /// Shell source, run with `sh -c`.
    Script,
    /// Anything else, executed directly.
    Executable,
}

impl ModuleKind {
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => ModuleKind::Json,
            Some("sh") => ModuleKind::Script,
            _ => ModuleKind::Executable,
        }
    }
}

/// A loaded module.
#[derive(Debug, Clone)]
pub struct Module {
    /// Canonical path; the cache key.
    pub path: PathBuf,
    pub kind: ModuleKind,
    /// Source text captured at load time (scripts and JSON).
    pub source: Option<Arc<str>>,
    /// Parsed exports (JSON modules).
    pub exports: Option<Value>,
    pub loaded_at: DateTime<Utc>,
}

impl Module {
    /// A command that runs this module from `cwd`.
    ///
    /// Scripts run the source captured at load time, not the file's
    /// current content.
    pub fn command(&self, cwd: &Path) -> Command {
        let mut cmd = match (self.kind, &self.source) {
            (ModuleKind::Script, Some(source)) => {
                let mut cmd = Command::new("sh");
                cmd.arg("-c").arg(&**source).arg(&self.path);
                cmd
            }
            _ => Command::new(&self.path),
        };
        cmd.current_dir(cwd);
        cmd
    }

    /// Run the module once as a setup step; a non-zero exit is an error.
    pub fn run_setup(&self, cwd: &Path) -> Result<()> {
        let Output { status, stderr, .. } = self.command(cwd).output().map_err(|e| {
            Error::Module {
                path: self.path.clone(),
                message: e.to_string(),
            }
        })?;
        if !status.success() {
            return Err(Error::Module {
                path: self.path.clone(),
                message: format!(
                    "setup exited with {status}: {}",
                    String::from_utf8_lossy(&stderr).trim()
                ),
            });
        }
        Ok(())
    }
}

/// Cache of loaded modules keyed by canonical path.
pub trait ModuleCache: Send + Sync {
    fn get(&self, path: &Path) -> Option<Arc<Module>>;
    fn set(&self, module: Arc<Module>);
    /// Evict one entry. Returns whether it was present.
    fn purge(&self, path: &Path) -> bool;
}

/// In-memory cache shared between the loader and the watch supervisor.
#[derive(Debug, Default)]
pub struct MemoryModuleCache {
    entries: DashMap<PathBuf, Arc<Module>>,
}

impl MemoryModuleCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ModuleCache for MemoryModuleCache {
    fn get(&self, path: &Path) -> Option<Arc<Module>> {
        self.entries.get(path).map(|entry| Arc::clone(entry.value()))
    }

    fn set(&self, module: Arc<Module>) {
        self.entries.insert(module.path.clone(), module);
    }

    fn purge(&self, path: &Path) -> bool {
        self.entries.remove(path).is_some()
    }
}

/// Resolves module requests and loads modules.
pub trait ModuleLoader: Send + Sync {
    /// Resolve a request as given: an absolute path, or a name under one of
    /// the search roots.
    fn resolve(&self, request: &str) -> Option<PathBuf>;

    /// Load (or fetch from cache) the module at `path`.
    fn load(&self, path: &Path) -> Result<Arc<Module>>;
}

/// Loader over the real filesystem.
pub struct FsModuleLoader {
    search_paths: Vec<PathBuf>,
    cache: Arc<dyn ModuleCache>,
}

impl FsModuleLoader {
    /// Loader searching `<cwd>/.trial/plugins` and then `TRIAL_PLUGIN_PATH`.
    pub fn new(cwd: &Path, cache: Arc<dyn ModuleCache>) -> Self {
        let mut search_paths = vec![cwd.join(LOCAL_PLUGIN_DIR)];
        if let Some(extra) = std::env::var_os(PLUGIN_PATH_ENV) {
            search_paths
                .extend(std::env::split_paths(&extra).filter(|p| !p.as_os_str().is_empty()));
        }
        Self::with_search_paths(search_paths, cache)
    }

    pub fn with_search_paths(search_paths: Vec<PathBuf>, cache: Arc<dyn ModuleCache>) -> Self {
        Self {
            search_paths,
            cache,
        }
    }

    fn candidates(base: &Path) -> impl Iterator<Item = PathBuf> + '_ {
        std::iter::once(base.to_path_buf()).chain(
            RESOLVE_EXTENSIONS
                .iter()
                .map(move |ext| PathBuf::from(format!("{}.{ext}", base.display()))),
        )
    }
}

impl ModuleLoader for FsModuleLoader {
    fn resolve(&self, request: &str) -> Option<PathBuf> {
        let request = Path::new(request);
        if request.is_absolute() {
            return Self::candidates(request).find(|p| p.is_file());
        }
        self.search_paths
            .iter()
            .flat_map(|root| Self::candidates(&root.join(request)).collect::<Vec<_>>())
            .find(|p| p.is_file())
    }

    fn load(&self, path: &Path) -> Result<Arc<Module>> {
        let module_error = |message: String| Error::Module {
            path: path.to_path_buf(),
            message,
        };
        let canonical = path
            .canonicalize()
            .map_err(|e| module_error(format!("cannot find module: {e}")))?;

        if let Some(module) = self.cache.get(&canonical) {
            tracing::trace!(
                path = %canonical.display(),
                loaded_at = %module.loaded_at,
                "module cache hit"
            );
            return Ok(module);
        }

        let kind = ModuleKind::for_path(&canonical);
        let (source, exports): (Option<Arc<str>>, Option<Value>) = match kind {
            ModuleKind::Executable => (None, None),
            ModuleKind::Script | ModuleKind::Json => {
                let text = std::fs::read_to_string(&canonical).map_err(|e| Error::Io {
                    path: canonical.clone(),
                    source: e,
                })?;
                let exports = match kind {
                    ModuleKind::Json => Some(
                        serde_json::from_str::<Value>(&text)
                            .map_err(|e| module_error(format!("invalid JSON: {e}")))?,
                    ),
                    _ => None,
                };
                (Some(Arc::from(text)), exports)
            }
        };

        let module = Arc::new(Module {
            path: canonical,
            kind,
            source,
            exports,
            loaded_at: Utc::now(),
        });
        tracing::debug!(path = %module.path.display(), ?kind, "loaded module");
        self.cache.set(Arc::clone(&module));
        Ok(module)
    }
}

#[cfg(test)]
#[path = "module_tests.rs"]
mod tests;
