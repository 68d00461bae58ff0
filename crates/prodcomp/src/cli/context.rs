//! Shared context for running CLI commands.

use std::{
    env,
    path::{Path, PathBuf},
    process::ExitCode,
};

use prodcomp_config::{CONFIG_FILENAME, Config, discover_config_file};
use prodcomp_index::{ProductRepository, parse_language};
use tracing::debug;

use super::{args::RepositoryArgs, output::report_index_error};

/// Where the effective configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// A configuration file, given or discovered.
    File(PathBuf),
    /// Shard paths passed on the command line.
    ShardPaths,
}

/// Command execution context built once per CLI invocation.
pub struct CommandContext {
    /// Loaded and validated configuration.
    pub config: Config,
    /// Origin of `config`.
    pub source: ConfigSource,
}

impl CommandContext {
    /// Resolves the configuration selected by the repository flags.
    ///
    /// `--shard-path` builds an ad hoc configuration. Otherwise the file given
    /// by `--config` is loaded, or `prodcomp.toml` is discovered upwards from
    /// the current directory.
    pub fn load(args: &RepositoryArgs) -> Result<Self, ExitCode> {
        let cwd = current_dir_or_failure()?;

        let (config, source) = if !args.shard_paths.is_empty() {
            let config = Config::for_paths(&args.shard_paths).map_err(|e| {
                eprintln!("error: invalid shard paths: {e}");
                ExitCode::FAILURE
            })?;
            (config, ConfigSource::ShardPaths)
        } else {
            let path = match &args.config {
                Some(path) => cwd.join(path),
                None => discover_or_failure(&cwd)?,
            };
            (load_config_or_failure(&path)?, ConfigSource::File(path))
        };

        if let Err(e) = parse_language(&config.settings.stemmer) {
            eprintln!("error: {e}");
            return Err(ExitCode::FAILURE);
        }

        debug!(?source, shards = config.shards.len(), "loaded configuration");
        Ok(Self { config, source })
    }

    /// Opens the product repository described by the configuration.
    pub fn repository(&self) -> Result<ProductRepository, ExitCode> {
        ProductRepository::open(&self.config).map_err(|e| {
            report_index_error("failed to open repository", &e);
            ExitCode::FAILURE
        })
    }
}

/// Returns the current working directory or exits with a consistent error.
fn current_dir_or_failure() -> Result<PathBuf, ExitCode> {
    env::current_dir().map_err(|e| {
        eprintln!("error: could not determine current directory: {e}");
        ExitCode::FAILURE
    })
}

/// Finds the nearest configuration file or exits with a hint.
fn discover_or_failure(cwd: &Path) -> Result<PathBuf, ExitCode> {
    discover_config_file(cwd).ok_or_else(|| {
        eprintln!("error: no {CONFIG_FILENAME} found in this or any parent directory");
        eprintln!("Pass --config FILE or one or more --shard-path DIR.");
        ExitCode::FAILURE
    })
}

/// Loads configuration from a file or exits with an error.
fn load_config_or_failure(path: &Path) -> Result<Config, ExitCode> {
    Config::load_file(path).map_err(|e| {
        eprintln!("error: failed to load configuration: {e}");
        ExitCode::FAILURE
    })
}
