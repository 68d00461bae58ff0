//! Error types for prodcomp configuration.

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use toml::de;

/// Errors that can occur when loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to parse TOML configuration.
    #[error("failed to parse config file {path}: {source}")]
    ParseToml {
        /// Path to the file that could not be parsed.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: de::Error,
    },

    /// No shards are defined.
    #[error("no shards are defined in configuration")]
    NoShards,

    /// Two shards share the same name.
    #[error("shard '{name}' is defined more than once")]
    DuplicateShard {
        /// The repeated shard name.
        name: String,
    },

    /// A shard was given an empty name.
    #[error("shard at {path} has an empty name")]
    EmptyShardName {
        /// Path of the unnamed shard.
        path: PathBuf,
    },

    /// The configured default shard is not among the defined shards.
    #[error("default shard '{name}' is not defined")]
    UnknownDefaultShard {
        /// Name of the missing default shard.
        name: String,
    },

    /// The page size must be a positive integer.
    #[error("page_size must be a positive integer, got {0}")]
    InvalidPageSize(usize),

    /// Failed to determine home directory.
    #[error("could not determine home directory")]
    NoHomeDirectory,
}
