//! Variable and record files.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};

/// Data file format, picked by extension. Anything that is not `.json` is
/// read as YAML, which also accepts plain JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
            _ => Format::Yaml,
        }
    }
}

/// Reads a data file into a JSON value.
pub fn load_value(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value: Value = match Format::from_path(path) {
        Format::Json => serde_json::from_str(&text)
            .with_context(|| format!("invalid JSON in {}", path.display()))?,
        Format::Yaml => serde_yaml::from_str(&text)
            .with_context(|| format!("invalid YAML in {}", path.display()))?,
    };
    Ok(value)
}

/// Reads a variables file, which must hold a mapping.
pub fn load_variables(path: &Path) -> Result<Map<String, Value>> {
    match load_value(path)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        _ => bail!("{} does not contain a mapping of variables", path.display()),
    }
}
