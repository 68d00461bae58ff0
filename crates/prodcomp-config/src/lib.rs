//! Configuration system for prodcomp.
//!
//! prodcomp uses a TOML configuration file named `prodcomp.toml`, found by walking up the
//! directory tree from the current working directory. The file names the shards that make up
//! a product repository and the settings shared by all of them.

#![warn(missing_docs)]

mod discovery;
mod error;
mod parse;
mod resolve;
#[cfg(test)]
mod test_support;
mod validate;

use std::path::{Path, PathBuf};

pub use discovery::{CONFIG_FILENAME, discover_config_file};
pub use error::ConfigError;
pub use parse::{RawConfig, RawSettings, RawShard, parse_config_file, parse_config_str};
pub use resolve::resolve_shard_path;
use serde::{Deserialize, Serialize};
use validate::validate_config;

/// Shard name used when a repository is built from a single path.
pub const DEFAULT_SHARD_NAME: &str = "default";

/// Default number of products per result page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Fully resolved prodcomp configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// General settings.
    pub settings: Settings,
    /// Shards in declaration order. Search results are merged in this order.
    pub shards: Vec<ShardConfig>,
    /// Directory containing the config file, if loaded from one.
    pub config_root: Option<PathBuf>,
}

impl Config {
    /// Loads configuration from the nearest `prodcomp.toml` above `cwd`.
    ///
    /// Returns `Ok(None)` when no configuration file exists.
    pub fn discover(cwd: &Path) -> Result<Option<Self>, ConfigError> {
        discover_config_file(cwd)
            .map(|path| Self::load_file(&path))
            .transpose()
    }

    /// Loads and validates configuration from a specific file.
    ///
    /// Relative shard paths are resolved against the file's directory.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = parse_config_file(path)?;
        let config_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let config = Self::from_raw(raw, config_dir)?;
        config.validate()?;
        Ok(config)
    }

    /// Builds a configuration from parsed TOML, applying defaults.
    pub fn from_raw(raw: RawConfig, config_dir: &Path) -> Result<Self, ConfigError> {
        let raw_settings = raw.settings.unwrap_or_default();
        let defaults = Settings::default();
        let settings = Settings {
            page_size: raw_settings.page_size.unwrap_or(defaults.page_size),
            stemmer: raw_settings.stemmer.unwrap_or(defaults.stemmer),
            default_shard: raw_settings.default_shard,
        };

        let shards = raw
            .shard
            .unwrap_or_default()
            .into_iter()
            .map(|shard| {
                Ok(ShardConfig {
                    path: resolve_shard_path(&shard.path, config_dir)?,
                    name: shard.name,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(Self {
            settings,
            shards,
            config_root: Some(config_dir.to_path_buf()),
        })
    }

    /// Builds a configuration from one or more shard paths with default settings.
    ///
    /// A single path produces a shard named [`DEFAULT_SHARD_NAME`]. Several paths
    /// produce shards named after their final path component.
    pub fn for_paths(paths: &[PathBuf]) -> Result<Self, ConfigError> {
        let shards = match paths {
            [single] => vec![ShardConfig {
                name: DEFAULT_SHARD_NAME.to_string(),
                path: single.clone(),
            }],
            _ => paths
                .iter()
                .map(|path| ShardConfig {
                    name: path
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                    path: path.clone(),
                })
                .collect(),
        };

        let config = Self {
            shards,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates the structural rules of this configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_config(self)
    }

    /// Name of the shard receiving writes that name no target.
    ///
    /// This is the configured `default_shard`, or the first shard otherwise.
    pub fn default_shard_name(&self) -> Option<&str> {
        self.settings
            .default_shard
            .as_deref()
            .or_else(|| self.shards.first().map(|s| s.name.as_str()))
    }

    /// Serializes the effective settings to TOML format.
    pub fn settings_to_toml(&self) -> String {
        let serializable = SerializableSettings {
            settings: self.settings.clone(),
        };
        toml::to_string_pretty(&serializable).unwrap_or_default()
    }
}

/// General settings for prodcomp.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Products per result page.
    pub page_size: usize,
    /// Stemming language used at both index and query time.
    pub stemmer: String,
    /// Shard receiving writes that name no target.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_shard: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            stemmer: String::from("english"),
            default_shard: None,
        }
    }
}

/// Internal struct for TOML serialization of settings.
#[derive(Serialize)]
struct SerializableSettings {
    /// General settings.
    settings: Settings,
}

/// A named shard pointing to an index directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardConfig {
    /// Name of the shard (used to target writes).
    pub name: String,
    /// Resolved path to the shard's index directory.
    pub path: PathBuf,
}
