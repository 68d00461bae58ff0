//! Command-line interface for the `prodcomp` product search tool.

use std::process::ExitCode;

use clap::Parser;
use prodcomp::cli::{CommandContext, args::Cli, commands, logging};

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let ctx = match CommandContext::load(&cli.repository) {
        Ok(ctx) => ctx,
        Err(code) => return code,
    };

    commands::run(cli.command, &ctx)
}
