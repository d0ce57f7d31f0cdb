// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Config sources and rank-ordered merging.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::schema::{self, DefaultValue, SCHEMA};
use super::{OptionValue, Options, coerce, extend_unique};
use crate::error::{Error, Result};

/// Precedence of a source. Higher ranks override lower ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SourceRank {
    Defaults,
    OptsFile,
    Package,
    RcFile,
    Cli,
}

/// One raw, not yet normalized source of option values.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    pub rank: SourceRank,
    /// Human-readable origin for error messages ("command line", a path).
    pub origin: String,
    pub payload: Map<String, Value>,
}

impl ConfigSource {
    pub fn new(rank: SourceRank, origin: impl Into<String>, payload: Map<String, Value>) -> Self {
        Self {
            rank,
            origin: origin.into(),
            payload,
        }
    }

    /// Resolve aliases, reject unknown names, and coerce values to their kinds.
    pub fn normalize(&self) -> Result<Layer> {
        let mut values = BTreeMap::new();
        for (key, raw) in &self.payload {
            if !raw.is_null() {
                self.add(&mut values, key, raw)?;
            }
        }
        Ok(Layer {
            rank: self.rank,
            values,
        })
    }

    /// Like [`normalize`](Self::normalize), but entries that fail are
    /// dropped instead of failing the whole source.
    pub fn normalize_lenient(&self) -> Layer {
        let mut values = BTreeMap::new();
        for (key, raw) in &self.payload {
            if raw.is_null() {
                continue;
            }
            if let Err(e) = self.add(&mut values, key, raw) {
                tracing::debug!(key = %key, "dropped: {e}");
            }
        }
        Layer {
            rank: self.rank,
            values,
        }
    }

    /// Whether a terminal flag is set, judged before any value is coerced.
    /// Keys must already be canonical, as the command-line parser emits them.
    pub fn has_terminal_flag(&self) -> bool {
        schema::terminal_flags()
            .any(|name| self.payload.get(name).and_then(Value::as_bool) == Some(true))
    }

    fn add(
        &self,
        values: &mut BTreeMap<&'static str, OptionValue>,
        key: &str,
        raw: &Value,
    ) -> Result<()> {
        let spec = schema::lookup(key).ok_or_else(|| {
            Error::Argument(format!("unknown option '{}' in {}", key, self.origin))
        })?;
        let value = coerce(spec, raw, &self.origin)?;

        match (values.get_mut(spec.name), value) {
            (None, value) => {
                values.insert(spec.name, value);
            }
            (Some(OptionValue::List(existing)), OptionValue::List(more))
                if spec.kind == schema::OptionKind::List =>
            {
                extend_unique(existing, more);
            }
            (Some(_), _) => {
                return Err(Error::Argument(format!(
                    "option '--{}' is given more than once in {}",
                    spec.name, self.origin
                )));
            }
        }
        Ok(())
    }
}

/// A normalized source: canonical names to typed values.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub rank: SourceRank,
    pub values: BTreeMap<&'static str, OptionValue>,
}

impl Layer {
    /// The built-in defaults from the schema.
    pub fn defaults() -> Self {
        let values = SCHEMA
            .iter()
            .filter_map(|spec| {
                let value = match spec.default? {
                    DefaultValue::Bool(b) => OptionValue::Bool(b),
                    DefaultValue::Number(n) => OptionValue::Number(n),
                    DefaultValue::Str(s) => OptionValue::String(s.to_string()),
                    DefaultValue::List(items) => {
                        OptionValue::List(items.iter().map(|s| s.to_string()).collect())
                    }
                };
                Some((spec.name, value))
            })
            .collect();
        Self {
            rank: SourceRank::Defaults,
            values,
        }
    }
}

/// Merge layers by rank.
///
/// Scalars take the value of the highest-ranked layer that sets them. List
/// options combine across layers, highest rank first, without duplicates;
/// a list default only applies when no other layer set the option.
pub fn merge(layers: &[Layer]) -> Options {
    let mut ordered: Vec<&Layer> = layers.iter().collect();
    ordered.sort_by(|a, b| b.rank.cmp(&a.rank));

    let mut options = Options::new();
    for layer in ordered {
        for (&name, value) in &layer.values {
            let combines = schema::lookup(name).is_some_and(|spec| spec.combines());
            match options.entry(name) {
                None => options.insert(name, value.clone()),
                Some(OptionValue::List(existing))
                    if combines && layer.rank != SourceRank::Defaults =>
                {
                    if let OptionValue::List(more) = value {
                        extend_unique(existing, more.iter().cloned());
                    }
                }
                Some(_) => {}
            }
        }
    }
    options
}

#[cfg(test)]
#[path = "layer_tests.rs"]
mod tests;
