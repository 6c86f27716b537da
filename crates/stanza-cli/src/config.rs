//! Render configuration loaded from a file and overridden by flags.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use stanza::RecursionDepth;

use crate::cli::RenderArgs;
use crate::data;

/// Settings for a render run.
///
/// ```yaml
/// recursion_depth: 20
/// strip_unresolved: true
/// remove_markers: true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    pub recursion_depth: Option<i64>,
    pub strip_unresolved: bool,
    pub remove_markers: Option<bool>,
}

impl RenderConfig {
    /// Reads a YAML or JSON config file, chosen by extension.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: RenderConfig = match data::Format::from_path(path) {
            data::Format::Json => serde_json::from_str(&text)
                .with_context(|| format!("invalid JSON config {}", path.display()))?,
            data::Format::Yaml => serde_yaml::from_str(&text)
                .with_context(|| format!("invalid YAML config {}", path.display()))?,
        };
        Ok(config)
    }

    /// Resolves the effective settings: flags override the file.
    pub fn resolve(args: &RenderArgs) -> Result<Settings> {
        let file = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        let recursion_depth = match (args.depth, file.recursion_depth) {
            (Some(depth), _) => depth,
            (None, Some(depth)) => RecursionDepth::new(depth).context("invalid recursion_depth")?,
            (None, None) => RecursionDepth::default(),
        };

        Ok(Settings {
            recursion_depth,
            strip_unresolved: args.strip || file.strip_unresolved,
            remove_markers: !args.keep_markers && file.remove_markers.unwrap_or(true),
        })
    }
}

/// Effective settings after merging file and flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub recursion_depth: RecursionDepth,
    pub strip_unresolved: bool,
    pub remove_markers: bool,
}
