//! Configuration file parsing.
//!
//! Parses a `prodcomp.toml` file into an intermediate `RawConfig` structure that
//! preserves the optional nature of all fields before defaults are applied.

use std::{fs, path::Path};

use serde::Deserialize;

use crate::ConfigError;

/// Raw configuration as parsed directly from a TOML file.
///
/// All fields are optional; defaults are filled in during resolution.
/// This mirrors the TOML schema exactly.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// General settings section.
    pub settings: Option<RawSettings>,
    /// Shard definitions, in declaration order.
    pub shard: Option<Vec<RawShard>>,
}

/// Raw general settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSettings {
    /// Number of products per result page.
    pub page_size: Option<usize>,
    /// Stemming language.
    pub stemmer: Option<String>,
    /// Shard receiving writes that name no target.
    pub default_shard: Option<String>,
}

/// Raw shard definition from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct RawShard {
    /// Shard name, used to target writes.
    pub name: String,
    /// Path to the shard's index directory.
    pub path: String,
}

/// Parses a configuration file from disk.
pub fn parse_config_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    parse_config_str(&contents, path)
}

/// Parses configuration from a TOML string.
///
/// The `path` parameter is used for error reporting.
pub fn parse_config_str(contents: &str, path: &Path) -> Result<RawConfig, ConfigError> {
    toml::from_str(contents).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })
}
