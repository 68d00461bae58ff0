//! Implementation of `prodcomp status`.

use std::process::ExitCode;

use comfy_table::{Cell, CellAlignment, Table, presets::UTF8_FULL_CONDENSED};

use crate::cli::{
    context::{CommandContext, ConfigSource},
    output::{dim, subheader},
};

/// Shows the configuration source, settings and each shard's document count.
pub fn run(ctx: &CommandContext) -> ExitCode {
    let repo = match ctx.repository() {
        Ok(repo) => repo,
        Err(code) => return code,
    };

    match &ctx.source {
        ConfigSource::File(path) => println!("{} {}", subheader("Config:"), path.display()),
        ConfigSource::ShardPaths => {
            println!("{} {}", subheader("Config:"), dim("(command-line shard paths)"));
        }
    }
    println!(
        "{} {}   {} {}",
        subheader("Page size:"),
        repo.page_size(),
        subheader("Stemmer:"),
        ctx.config.settings.stemmer
    );
    println!();

    let default = repo.default_shard().name();
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["Shard", "Default", "Documents", "Path"]);
    for shard in repo.shards() {
        let path = shard
            .location()
            .map_or_else(|| "(memory)".to_string(), |p| p.display().to_string());
        table.add_row(vec![
            Cell::new(shard.name()),
            Cell::new(if shard.name() == default { "*" } else { "" }),
            Cell::new(shard.num_docs()).set_alignment(CellAlignment::Right),
            Cell::new(path),
        ]);
    }
    println!("{table}");

    ExitCode::SUCCESS
}
