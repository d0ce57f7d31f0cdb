// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Layered option resolution.
//!
//! Precedence, highest first: command line, rc file, package field,
//! legacy opts file, built-in defaults. A source named explicitly on the
//! command line must load; a discovered one may silently be empty.
//!
//! Each file source is read at most once per resolver. Later calls to
//! [`ConfigResolver::resolve`] reuse the layers already loaded, so
//! resolving again (as watch mode may) never merges a file twice.

use std::collections::BTreeSet;
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;

use crate::cli;
use crate::discovery::{self, ConfigFs, OsFs, PACKAGE_FILE};
use crate::error::{Error, Result};
use crate::opts_file;
use crate::options::schema::DEFAULT_OPTS_PATH;
use crate::options::{ConfigSource, Layer, OptionValue, Options, SourceRank, merge};
use crate::package::load_package_config;
use crate::rc::{ConfigOrigin, RcLoader};

/// Opts path accepted as "no opts file" for compatibility.
const NULL_OPTS_PATH: &str = "/dev/null";

/// A file source category that is read at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SourceKind {
    RcFile,
    Package,
    OptsFile,
}

impl SourceKind {
    /// The option that names (or disables) this source.
    pub fn option(self) -> &'static str {
        match self {
            SourceKind::RcFile => "config",
            SourceKind::Package => "package",
            SourceKind::OptsFile => "opts",
        }
    }
}

/// Merges every option source into one [`Options`] value.
pub struct ConfigResolver {
    fs: Arc<dyn ConfigFs>,
    rc: RcLoader,
    cwd: PathBuf,
    consumed: BTreeSet<SourceKind>,
    loaded: Vec<Layer>,
}

impl ConfigResolver {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self::with_fs(Arc::new(OsFs), cwd)
    }

    pub fn with_fs(fs: Arc<dyn ConfigFs>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            rc: RcLoader::new(Arc::clone(&fs)),
            fs,
            cwd: cwd.into(),
            consumed: BTreeSet::new(),
            loaded: Vec::new(),
        }
    }

    /// Source categories already read.
    pub fn consumed(&self) -> &BTreeSet<SourceKind> {
        &self.consumed
    }

    /// Resolve process arguments (without the binary name) into options.
    ///
    /// If a terminal flag is present, the parsed arguments are returned as
    /// they are and no file is read.
    pub fn resolve<I, T>(&mut self, args: I) -> Result<Options>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let cli_source = cli::parse_args(args)?;
        if cli_source.has_terminal_flag() {
            tracing::debug!("terminal flag given; skipping config files");
            return Ok(merge(&[cli_source.normalize_lenient()]));
        }
        let cli_layer = cli_source.normalize()?;
        let cli_options = merge(std::slice::from_ref(&cli_layer));

        for kind in [SourceKind::RcFile, SourceKind::Package, SourceKind::OptsFile] {
            if self.consumed.contains(&kind) {
                tracing::trace!(?kind, "already loaded");
                continue;
            }
            if cli_options.is_disabled(kind.option()) {
                tracing::debug!(?kind, "disabled on the command line");
                continue;
            }
            if let Some(layer) = self.load(kind, &cli_options)? {
                self.loaded.push(layer);
            }
            self.consumed.insert(kind);
        }

        let mut layers = Vec::with_capacity(self.loaded.len() + 2);
        layers.push(Layer::defaults());
        layers.extend(self.loaded.iter().cloned());
        layers.push(cli_layer);
        let mut options = merge(&layers);

        for kind in &self.consumed {
            options.insert(kind.option(), OptionValue::Bool(false));
        }

        validate(&options)?;
        Ok(options)
    }

    fn load(&self, kind: SourceKind, cli: &Options) -> Result<Option<Layer>> {
        let explicit = cli.string(kind.option()).map(|p| self.cwd.join(p));
        match kind {
            SourceKind::RcFile => {
                let (path, origin) = match explicit {
                    Some(path) => (path, ConfigOrigin::Explicit),
                    None => match self.rc.find_config(&self.cwd) {
                        Some(path) => (path, ConfigOrigin::Discovered),
                        None => {
                            tracing::debug!("no rc file found");
                            return Ok(None);
                        }
                    },
                };
                let map = self.rc.load_config(&path, origin)?;
                ConfigSource::new(SourceRank::RcFile, path.display().to_string(), map)
                    .normalize()
                    .map(Some)
            }
            SourceKind::Package => {
                let (path, origin) = match explicit {
                    Some(path) => (path, ConfigOrigin::Explicit),
                    None => match discovery::find_up(self.fs.as_ref(), PACKAGE_FILE, &self.cwd) {
                        Some(path) => (path, ConfigOrigin::Discovered),
                        None => {
                            tracing::debug!("no package manifest found");
                            return Ok(None);
                        }
                    },
                };
                let map = load_package_config(self.fs.as_ref(), &path, origin)?;
                ConfigSource::new(SourceRank::Package, path.display().to_string(), map)
                    .normalize()
                    .map(Some)
            }
            SourceKind::OptsFile => self.load_opts(cli.string("opts")),
        }
    }

    fn load_opts(&self, explicit: Option<&str>) -> Result<Option<Layer>> {
        if explicit == Some(NULL_OPTS_PATH) {
            return Ok(None);
        }
        let path = self.cwd.join(explicit.unwrap_or(DEFAULT_OPTS_PATH));
        let text = match self.fs.read_to_string(&path) {
            Ok(text) => text,
            Err(e) if explicit.is_some() => {
                return Err(Error::config(
                    &path,
                    format!("unable to read {}: {e}", path.display()),
                ));
            }
            Err(e) => {
                tracing::debug!(path = %path.display(), "no opts file: {e}");
                return Ok(None);
            }
        };

        let tokens = opts_file::parse(&text);
        tracing::debug!(path = %path.display(), tokens = tokens.len(), "parsed opts file");
        cli::parse_tokens(tokens, SourceRank::OptsFile, &path.display().to_string())?
            .normalize()
            .map(Some)
    }
}

/// Cross-option checks on the merged result.
fn validate(options: &Options) -> Result<()> {
    if options.flag("invert") && !options.contains("grep") && !options.contains("fgrep") {
        return Err(Error::Argument(
            "\"--invert\" requires one of \"--fgrep <str>\" or \"--grep <regexp>\"".to_string(),
        ));
    }
    options.reporter_options()?;
    Ok(())
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
