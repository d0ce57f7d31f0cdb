// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Rc file loading.
//!
//! Each rc format has a [`FormatParser`] that turns file content into a
//! JSON-like mapping. Failures at an explicitly named path are errors;
//! failures at a discovered path are logged and yield an empty mapping.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::discovery::{self, ConfigFs};
use crate::error::{Error, Result};

/// How a config path came to be loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigOrigin {
    /// Named by the user; failures are fatal.
    Explicit,
    /// Found by searching; failures are swallowed.
    Discovered,
}

/// Parser for one rc file format.
pub trait FormatParser: Send + Sync {
    /// Extensions (without the dot) handled by this parser.
    fn extensions(&self) -> &'static [&'static str];

    /// Parse file content into a JSON-like value.
    fn parse(&self, content: &str, path: &Path) -> std::result::Result<Value, String>;
}

pub struct JsonParser;

impl FormatParser for JsonParser {
    fn extensions(&self) -> &'static [&'static str] {
        &["json"]
    }

    fn parse(&self, content: &str, _path: &Path) -> std::result::Result<Value, String> {
        serde_json::from_str(content).map_err(|e| e.to_string())
    }
}

pub struct YamlParser;

impl FormatParser for YamlParser {
    fn extensions(&self) -> &'static [&'static str] {
        &["yaml", "yml"]
    }

    fn parse(&self, content: &str, _path: &Path) -> std::result::Result<Value, String> {
        if content.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_yaml::from_str(content).map_err(|e| e.to_string())
    }
}

pub struct TomlParser;

impl FormatParser for TomlParser {
    fn extensions(&self) -> &'static [&'static str] {
        &["toml"]
    }

    fn parse(&self, content: &str, _path: &Path) -> std::result::Result<Value, String> {
        let table: toml::Table = toml::from_str(content).map_err(|e| e.to_string())?;
        serde_json::to_value(table).map_err(|e| e.to_string())
    }
}

/// Shell rc files are run with `sh -s` from their own directory; stdout
/// must be a JSON object.
pub struct ScriptParser;

impl FormatParser for ScriptParser {
    fn extensions(&self) -> &'static [&'static str] {
        &["sh"]
    }

    fn parse(&self, content: &str, path: &Path) -> std::result::Result<Value, String> {
        let dir = path.parent().unwrap_or(Path::new("."));
        let mut child = Command::new("sh")
            .arg("-s")
            .current_dir(dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| format!("failed to run sh: {e}"))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(content.as_bytes())
                .map_err(|e| format!("failed to write script: {e}"))?;
        }
        let output = child.wait_with_output().map_err(|e| e.to_string())?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!("script exited with {}: {}", output.status, stderr.trim()));
        }
        serde_json::from_slice(&output.stdout).map_err(|e| format!("script output: {e}"))
    }
}

/// Finds and loads rc files.
pub struct RcLoader {
    fs: Arc<dyn ConfigFs>,
    parsers: Vec<Box<dyn FormatParser>>,
}

impl RcLoader {
    /// Loader with the built-in parsers.
    pub fn new(fs: Arc<dyn ConfigFs>) -> Self {
        Self::with_parsers(
            fs,
            vec![
                Box::new(ScriptParser),
                Box::new(YamlParser),
                Box::new(TomlParser),
                Box::new(JsonParser),
            ],
        )
    }

    pub fn with_parsers(fs: Arc<dyn ConfigFs>, parsers: Vec<Box<dyn FormatParser>>) -> Self {
        Self { fs, parsers }
    }

    /// Nearest rc file from `start_dir` upwards.
    pub fn find_config(&self, start_dir: &Path) -> Option<std::path::PathBuf> {
        discovery::find_config(self.fs.as_ref(), start_dir)
    }

    /// Load an rc file as a mapping.
    ///
    /// Files with an unrecognized extension are read as JSON.
    pub fn load_config(&self, path: &Path, origin: ConfigOrigin) -> Result<Map<String, Value>> {
        let content = match self.fs.read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                return soften(
                    Error::config(path, format!("unable to read {}: {e}", path.display())),
                    origin,
                );
            }
        };

        let parser = self.parser_for(path);
        let parsed = parser
            .parse(&content, path)
            .and_then(into_mapping)
            .map_err(|e| Error::config(path, format!("unable to parse {}: {e}", path.display())));

        match parsed {
            Ok(map) => {
                tracing::debug!(path = %path.display(), keys = map.len(), "loaded rc file");
                Ok(map)
            }
            Err(err) => soften(err, origin),
        }
    }

    fn parser_for(&self, path: &Path) -> &dyn FormatParser {
        static FALLBACK: JsonParser = JsonParser;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        self.parsers
            .iter()
            .find(|p| p.extensions().contains(&ext))
            .map(|p| p.as_ref())
            .unwrap_or(&FALLBACK as &dyn FormatParser)
    }
}

/// A config file's top level must be a mapping. An empty document counts
/// as an empty mapping.
pub(crate) fn into_mapping(value: Value) -> std::result::Result<Map<String, Value>, String> {
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => Err(format!("expected a mapping at the top level, found {}", kind_of(&other))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

/// Explicit failures propagate; discovered ones become an empty mapping.
pub(crate) fn soften(err: Error, origin: ConfigOrigin) -> Result<Map<String, Value>> {
    match origin {
        ConfigOrigin::Explicit => Err(err),
        ConfigOrigin::Discovered => {
            tracing::debug!("ignoring config failure: {err}");
            Ok(Map::new())
        }
    }
}

#[cfg(test)]
#[path = "rc_tests.rs"]
mod tests;
