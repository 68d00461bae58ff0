//! Implementation of `prodcomp check`.

use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

use crate::cli::{
    context::{CommandContext, ConfigSource},
    output::{dim, subheader, warning},
};

/// Shows effective settings and shards, flagging shard directories not yet created.
///
/// Loading the context already validated the configuration, so reaching this
/// point means it is usable.
pub fn run(ctx: &CommandContext) -> ExitCode {
    let config = &ctx.config;

    if let ConfigSource::File(path) = &ctx.source {
        println!("{}", subheader("Config file:"));
        println!("   {}", path.display());
        println!();
    }

    print!("{}", config.settings_to_toml());
    println!();

    println!("{}", subheader("Shards:"));
    let default = config.default_shard_name().unwrap_or_default();
    for shard in &config.shards {
        let marker = if shard.name == default { " (default)" } else { "" };
        let shown = display_path(&shard.path, config.config_root.as_deref());
        let line = format!(
            "   {}{} {}",
            shard.name,
            marker,
            dim(&format!("-> {}", shown.display()))
        );
        if shard.path.exists() {
            println!("{line}");
        } else {
            println!("{line} {}", warning("[not created yet]"));
        }
    }
    println!();

    println!("No issues found.");
    ExitCode::SUCCESS
}

/// Shows a shard path relative to the config directory when it lies beneath it.
fn display_path(path: &Path, config_root: Option<&Path>) -> PathBuf {
    config_root
        .and_then(|root| path.strip_prefix(root).ok())
        .filter(|rel| !rel.as_os_str().is_empty())
        .map_or_else(|| path.to_path_buf(), Path::to_path_buf)
}
