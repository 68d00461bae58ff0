//! Configuration validation.
//!
//! Checks the structural rules a repository relies on: at least one shard,
//! unique non-empty shard names, a positive page size, and a default shard
//! that actually exists.

use std::collections::HashSet;

use crate::{Config, ConfigError};

/// Validates the configuration, returning the first error found.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.settings.page_size == 0 {
        return Err(ConfigError::InvalidPageSize(config.settings.page_size));
    }

    if config.shards.is_empty() {
        return Err(ConfigError::NoShards);
    }

    let mut seen = HashSet::new();
    for shard in &config.shards {
        if shard.name.trim().is_empty() {
            return Err(ConfigError::EmptyShardName {
                path: shard.path.clone(),
            });
        }
        if !seen.insert(shard.name.as_str()) {
            return Err(ConfigError::DuplicateShard {
                name: shard.name.clone(),
            });
        }
    }

    if let Some(name) = &config.settings.default_shard
        && !seen.contains(name.as_str())
    {
        return Err(ConfigError::UnknownDefaultShard { name: name.clone() });
    }

    Ok(())
}
