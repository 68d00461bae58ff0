//! Command implementations and dispatch.

pub mod add;
pub mod check;
pub mod search;
pub mod status;

use std::process::ExitCode;

use super::{args::Commands, context::CommandContext};

/// Dispatches to the selected subcommand.
pub fn run(command: Commands, ctx: &CommandContext) -> ExitCode {
    match command {
        Commands::Add(cmd) => add::run(ctx, &cmd),
        Commands::Search(cmd) => search::run(ctx, &cmd),
        Commands::Status => status::run(ctx),
        Commands::Check => check::run(ctx),
    }
}
