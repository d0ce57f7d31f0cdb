// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Options from the package manifest's `trial` field.

use std::path::Path;

use serde_json::{Map, Value};

use crate::discovery::ConfigFs;
use crate::error::{Error, Result};
use crate::rc::{ConfigOrigin, into_mapping, soften};

/// Root key holding options in `package.json`.
pub const PACKAGE_FIELD: &str = "trial";

/// Load the `trial` field of a manifest. A manifest without the field
/// yields an empty mapping.
pub fn load_package_config(
    fs: &dyn ConfigFs,
    path: &Path,
    origin: ConfigOrigin,
) -> Result<Map<String, Value>> {
    let content = match fs.read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            let err = Error::config(path, format!("unable to read {}: {e}", path.display()));
            return soften(err, origin);
        }
    };

    let field = serde_json::from_str::<Value>(&content)
        .map_err(|e| e.to_string())
        .and_then(|manifest| match manifest {
            Value::Object(mut root) => Ok(root.remove(PACKAGE_FIELD).unwrap_or(Value::Null)),
            _ => Err("manifest is not an object".to_string()),
        })
        .and_then(into_mapping);

    match field {
        Ok(map) => {
            tracing::debug!(path = %path.display(), keys = map.len(), "loaded package field");
            Ok(map)
        }
        Err(e) => soften(
            Error::config(path, format!("unable to parse {}: {e}", path.display())),
            origin,
        ),
    }
}

#[cfg(test)]
#[path = "package_tests.rs"]
mod tests;
