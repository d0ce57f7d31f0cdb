// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Reporter and interface resolution.
//!
//! A plugin name resolves through an ordered list of strategies: the
//! registry (builtins plus anything a required module registered), the
//! name as a module request, then the name as a path relative to the
//! working directory.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;

use crate::error::{Error, Result};
use crate::module::{Module, ModuleKind, ModuleLoader};
use crate::options::OptionValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PluginKind {
    Reporter,
    Interface,
}

impl PluginKind {
    /// Option that selects this plugin.
    pub fn option(self) -> &'static str {
        match self {
            PluginKind::Reporter => "reporter",
            PluginKind::Interface => "ui",
        }
    }

    /// Key under which a JSON module exports plugins of this kind.
    fn export_key(self) -> &'static str {
        match self {
            PluginKind::Reporter => "reporters",
            PluginKind::Interface => "interfaces",
        }
    }
}

impl fmt::Display for PluginKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PluginKind::Reporter => write!(f, "reporter"),
            PluginKind::Interface => write!(f, "interface"),
        }
    }
}

/// A registry entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginEntry {
    /// Compiled in; carries a one-line description.
    Builtin(&'static str),
    /// Registered by a required module.
    Module(PathBuf),
}

pub const BUILTIN_REPORTERS: &[(&str, &str)] = &[
    ("dot", "dot matrix representation"),
    ("json", "single JSON object"),
    ("spec", "hierarchical file listing"),
    ("tap", "TAP-compatible output"),
];

pub const BUILTIN_INTERFACES: &[(&str, &str)] = &[
    ("bdd", "describe / it"),
    ("exports", "exported test objects"),
    ("qunit", "flat suites"),
    ("tdd", "suite / test"),
];

/// Known reporters and interfaces.
#[derive(Debug, Clone)]
pub struct PluginRegistry {
    entries: BTreeMap<(PluginKind, String), PluginEntry>,
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PluginRegistry {
    /// Registry holding the builtins only.
    pub fn builtin() -> Self {
        let mut entries = BTreeMap::new();
        for (kind, builtins) in [
            (PluginKind::Reporter, BUILTIN_REPORTERS),
            (PluginKind::Interface, BUILTIN_INTERFACES),
        ] {
            for (name, description) in builtins {
                entries.insert((kind, (*name).to_string()), PluginEntry::Builtin(*description));
            }
        }
        Self { entries }
    }

    /// Empty registry.
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, kind: PluginKind, name: impl Into<String>, entry: PluginEntry) {
        let name = name.into();
        tracing::debug!(%kind, %name, ?entry, "registered plugin");
        self.entries.insert((kind, name), entry);
    }

    pub fn get(&self, kind: PluginKind, name: &str) -> Option<&PluginEntry> {
        self.entries.get(&(kind, name.to_string()))
    }

    /// Registered names of one kind, sorted.
    pub fn names(&self, kind: PluginKind) -> impl Iterator<Item = &str> {
        self.entries
            .keys()
            .filter(move |(k, _)| *k == kind)
            .map(|(_, name)| name.as_str())
    }

    /// Register every plugin a JSON module exports, as
    /// `{"reporters": {name: path}, "interfaces": {name: path}}`.
    /// Paths are relative to the module's directory.
    pub fn register_exports(&mut self, module: &Module) -> Result<usize> {
        let Some(Value::Object(exports)) = &module.exports else {
            return Ok(0);
        };
        let base = module.path.parent().unwrap_or(Path::new("/"));

        let mut count = 0;
        for kind in [PluginKind::Reporter, PluginKind::Interface] {
            let Some(table) = exports.get(kind.export_key()) else {
                continue;
            };
            let Value::Object(table) = table else {
                return Err(Error::Module {
                    path: module.path.clone(),
                    message: format!("\"{}\" must map names to paths", kind.export_key()),
                });
            };
            for (name, target) in table {
                let Value::String(target) = target else {
                    return Err(Error::Module {
                        path: module.path.clone(),
                        message: format!("{kind} '{name}' must name a path"),
                    });
                };
                self.register(kind, name.clone(), PluginEntry::Module(base.join(target)));
                count += 1;
            }
        }
        Ok(count)
    }
}

/// Outcome of plugin resolution.
#[derive(Debug, Clone)]
pub enum ResolvedPlugin {
    Builtin(String),
    Module { name: String, module: Arc<Module> },
}

impl ResolvedPlugin {
    pub fn name(&self) -> &str {
        match self {
            ResolvedPlugin::Builtin(name) => name,
            ResolvedPlugin::Module { name, .. } => name,
        }
    }
}

/// One way of turning a plugin name into a plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Look the name up in the registry.
    Registry,
    /// Load the name as a module request.
    AsGiven,
    /// Load the name as a path relative to the working directory.
    CwdRelative,
}

pub const DEFAULT_STRATEGIES: &[Strategy] =
    &[Strategy::Registry, Strategy::AsGiven, Strategy::CwdRelative];

/// Resolves plugin option values, memoizing each result.
pub struct PluginResolver<'a> {
    registry: &'a PluginRegistry,
    loader: &'a dyn ModuleLoader,
    cwd: PathBuf,
    strategies: &'static [Strategy],
    memo: HashMap<(PluginKind, String), ResolvedPlugin>,
}

impl<'a> PluginResolver<'a> {
    pub fn new(registry: &'a PluginRegistry, loader: &'a dyn ModuleLoader, cwd: &Path) -> Self {
        Self {
            registry,
            loader,
            cwd: cwd.to_path_buf(),
            strategies: DEFAULT_STRATEGIES,
            memo: HashMap::new(),
        }
    }

    /// Resolve the current value of a plugin option.
    ///
    /// More than one value is an arity error: at most one reporter and one
    /// interface can be active.
    pub fn validate(&mut self, kind: PluginKind, value: &OptionValue) -> Result<ResolvedPlugin> {
        if value.arity() > 1 {
            return Err(Error::Plugin(format!(
                "\"--{0} <{0}>\" can only be specified once",
                kind.option()
            )));
        }
        let name = match value {
            OptionValue::String(name) => name.as_str(),
            OptionValue::List(names) if names.len() == 1 => names[0].as_str(),
            _ => return Err(Error::Plugin(format!("missing {kind} name"))),
        };

        if let Some(resolved) = self.memo.get(&(kind, name.to_string())) {
            return Ok(resolved.clone());
        }

        let resolved = self
            .strategies
            .iter()
            .find_map(|strategy| self.attempt(*strategy, kind, name))
            .ok_or_else(|| Error::Plugin(format!("unknown {kind} '{name}'")))?;

        self.memo.insert((kind, name.to_string()), resolved.clone());
        Ok(resolved)
    }

    fn attempt(&self, strategy: Strategy, kind: PluginKind, name: &str) -> Option<ResolvedPlugin> {
        let path = match strategy {
            Strategy::Registry => match self.registry.get(kind, name)? {
                PluginEntry::Builtin(_) => {
                    tracing::debug!(%kind, name, "builtin plugin");
                    return Some(ResolvedPlugin::Builtin(name.to_string()));
                }
                PluginEntry::Module(path) => path.clone(),
            },
            Strategy::AsGiven => self.loader.resolve(name)?,
            Strategy::CwdRelative => self.cwd.join(name),
        };

        match self.loader.load(&path) {
            Ok(module) if module.kind != ModuleKind::Json => {
                tracing::debug!(
                    %kind,
                    name,
                    ?strategy,
                    path = %module.path.display(),
                    "plugin module"
                );
                Some(ResolvedPlugin::Module {
                    name: name.to_string(),
                    module,
                })
            }
            Ok(_) => {
                tracing::debug!(%kind, name, ?strategy, "JSON module cannot be a plugin");
                None
            }
            Err(e) => {
                tracing::trace!(%kind, name, ?strategy, "no match: {e}");
                None
            }
        }
    }
}

/// Load every `--require` entry, before plugins are validated.
///
/// An entry naming an existing file under `cwd` is loaded from there;
/// otherwise it is resolved as given. JSON modules register the plugins
/// they export; other modules run once as setup.
pub fn handle_requires(
    requires: &[String],
    cwd: &Path,
    loader: &dyn ModuleLoader,
    registry: &mut PluginRegistry,
) -> Result<()> {
    for request in requires {
        let local = cwd.join(request);
        let path = if local.exists() {
            local
        } else {
            loader.resolve(request).ok_or_else(|| Error::Module {
                path: PathBuf::from(request),
                message: "cannot find module".to_string(),
            })?
        };

        let module = loader.load(&path)?;
        match module.kind {
            ModuleKind::Json => {
                let count = registry.register_exports(&module)?;
                tracing::debug!(request, count, "required plugin registry");
            }
            ModuleKind::Script | ModuleKind::Executable => {
                module.run_setup(cwd)?;
                tracing::debug!(request, "ran setup module");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "plugin_tests.rs"]
mod tests;
