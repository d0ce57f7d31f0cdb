// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Canonical, typed options.
//!
//! Every source (command line, rc file, package field, opts file, defaults)
//! is normalized against the schema into a [`Layer`] keyed by canonical
//! name, then layers are merged by rank into one [`Options`] value.

mod layer;
pub mod schema;

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};
pub use layer::{ConfigSource, Layer, SourceRank, merge};
pub use schema::{OptionKind, OptionSpec, SCHEMA};

/// A typed option value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<String>),
}

impl OptionValue {
    /// Number of distinct values carried (1 for scalars).
    pub fn arity(&self) -> usize {
        match self {
            OptionValue::List(items) => items.len(),
            _ => 1,
        }
    }
}

/// Resolved options, keyed by canonical option name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Options {
    values: BTreeMap<&'static str, OptionValue>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Set a value by canonical name. Unknown names are rejected.
    pub fn set(&mut self, name: &str, value: OptionValue) -> Result<()> {
        let spec = schema::lookup(name)
            .ok_or_else(|| Error::Argument(format!("unknown option '{name}'")))?;
        self.values.insert(spec.name, value);
        Ok(())
    }

    pub(crate) fn insert(&mut self, name: &'static str, value: OptionValue) {
        self.values.insert(name, value);
    }

    pub(crate) fn entry(&mut self, name: &'static str) -> Option<&mut OptionValue> {
        self.values.get_mut(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &OptionValue)> {
        self.values.iter().map(|(k, v)| (*k, v))
    }

    /// Boolean flag; absent or non-boolean counts as false.
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.values.get(name), Some(OptionValue::Bool(true)))
    }

    pub fn string(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(OptionValue::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        match self.values.get(name) {
            Some(OptionValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    /// List values; absent or scalar options yield an empty slice.
    pub fn list(&self, name: &str) -> &[String] {
        match self.values.get(name) {
            Some(OptionValue::List(items)) => items,
            _ => &[],
        }
    }

    /// Whether a source option (`config`, `package`, `opts`) was disabled with `false`.
    pub fn is_disabled(&self, name: &str) -> bool {
        matches!(self.values.get(name), Some(OptionValue::Bool(false)))
    }

    /// Parsed `reporter-options` pairs; a bare key maps to `"true"`.
    pub fn reporter_options(&self) -> Result<BTreeMap<String, String>> {
        let mut parsed = BTreeMap::new();
        for item in self.list("reporter-options") {
            let parts: Vec<&str> = item.split('=').collect();
            match parts.as_slice() {
                [key] => {
                    parsed.insert((*key).to_string(), "true".to_string());
                }
                [key, value] => {
                    parsed.insert((*key).to_string(), (*value).to_string());
                }
                _ => return Err(Error::Argument(format!("invalid reporter option '{item}'"))),
            }
        }
        Ok(parsed)
    }
}

/// Split a raw list value on commas, as `a, b,c` → `[a, b, c]`.
pub fn split_list(raw: &str) -> impl Iterator<Item = String> + '_ {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Append items to a list, keeping the first occurrence of each.
pub fn extend_unique(list: &mut Vec<String>, items: impl IntoIterator<Item = String>) {
    for item in items {
        if !list.contains(&item) {
            list.push(item);
        }
    }
}

fn once_only(spec: &OptionSpec) -> Error {
    Error::Argument(format!(
        "\"--{0} <{0}>\" can only be specified once",
        spec.name
    ))
}

fn type_error(spec: &OptionSpec, origin: &str, expected: &str) -> Error {
    Error::Argument(format!(
        "option '--{}' in {} expects {}",
        spec.name, origin, expected
    ))
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Coerce a raw JSON-like value into the option's kind.
///
/// A single-element sequence is unwrapped for scalar kinds. Longer sequences
/// are an arity error, except for plugin options, which keep the sequence so
/// the plugin resolver reports it.
pub fn coerce(spec: &OptionSpec, value: &Value, origin: &str) -> Result<OptionValue> {
    if spec.kind != OptionKind::List
        && let Value::Array(items) = value
    {
        return match items.as_slice() {
            [single] => coerce(spec, single, origin),
            [] => Err(type_error(spec, origin, "a value")),
            _ if spec.plugin => {
                let names = items
                    .iter()
                    .map(|v| scalar_string(v).ok_or_else(|| type_error(spec, origin, "names")))
                    .collect::<Result<Vec<_>>>()?;
                Ok(OptionValue::List(names))
            }
            _ => Err(once_only(spec)),
        };
    }

    match spec.kind {
        OptionKind::Boolean => match value {
            Value::Bool(b) => Ok(OptionValue::Bool(*b)),
            Value::String(s) if s == "true" => Ok(OptionValue::Bool(true)),
            Value::String(s) if s == "false" => Ok(OptionValue::Bool(false)),
            _ => Err(type_error(spec, origin, "a boolean")),
        },
        OptionKind::Number => match value {
            Value::Number(n) => n
                .as_f64()
                .map(OptionValue::Number)
                .ok_or_else(|| type_error(spec, origin, "a number")),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .map(OptionValue::Number)
                .map_err(|_| type_error(spec, origin, "a number")),
            _ => Err(type_error(spec, origin, "a number")),
        },
        OptionKind::String => match value {
            Value::String(s) => Ok(OptionValue::String(s.clone())),
            Value::Number(n) => Ok(OptionValue::String(n.to_string())),
            _ => Err(type_error(spec, origin, "a string")),
        },
        OptionKind::Path => match value {
            Value::String(s) => Ok(OptionValue::String(s.clone())),
            Value::Bool(false) => Ok(OptionValue::Bool(false)),
            _ => Err(type_error(spec, origin, "a path or false")),
        },
        OptionKind::List => {
            let raw: Vec<String> = match value {
                Value::Array(items) => items
                    .iter()
                    .map(|v| scalar_string(v).ok_or_else(|| type_error(spec, origin, "a list")))
                    .collect::<Result<_>>()?,
                Value::String(_) | Value::Number(_) => scalar_string(value).into_iter().collect(),
                _ => return Err(type_error(spec, origin, "a list")),
            };
            let mut items = Vec::new();
            extend_unique(&mut items, raw.iter().flat_map(|r| split_list(r)));
            Ok(OptionValue::List(items))
        }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
