//! Path resolution for shard definitions.
//!
//! Resolves relative and tilde-prefixed shard paths to absolute paths. Shard
//! directories are created on first open, so resolution does not require the
//! path to exist.

use std::path::{Path, PathBuf};

use directories::BaseDirs;

use crate::ConfigError;

/// Resolves a shard path.
///
/// Handles three cases:
/// - Tilde paths (`~/db`) - expanded to home directory
/// - Relative paths (`./db`, `../shared`) - resolved relative to `config_dir`
/// - Absolute paths - returned as-is
pub fn resolve_shard_path(path: &str, config_dir: &Path) -> Result<PathBuf, ConfigError> {
    let expanded = expand_tilde(path)?;

    if expanded.is_absolute() {
        Ok(expanded)
    } else {
        Ok(config_dir.join(expanded))
    }
}

/// Expands a tilde prefix to the home directory.
fn expand_tilde(path: &str) -> Result<PathBuf, ConfigError> {
    if path == "~" {
        return home_dir();
    }

    if let Some(rest) = path.strip_prefix("~/") {
        let home = home_dir()?;
        return Ok(home.join(rest));
    }

    Ok(PathBuf::from(path))
}

/// Returns the home directory.
fn home_dir() -> Result<PathBuf, ConfigError> {
    BaseDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .ok_or(ConfigError::NoHomeDirectory)
}
