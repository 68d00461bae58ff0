//! Clap argument definitions for the `prodcomp` CLI.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

/// Top-level CLI options.
#[derive(Parser)]
#[command(name = "prodcomp")]
#[command(about = "Product catalog search over one or more index shards")]
pub struct Cli {
    /// Where the repository comes from.
    #[command(flatten)]
    pub repository: RepositoryArgs,

    /// Increase log verbosity (-v for info, -vv for debug)
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Flags selecting the shards a command works on.
#[derive(Args, Debug, Clone, Default)]
pub struct RepositoryArgs {
    /// Configuration file to use instead of discovering prodcomp.toml
    #[arg(long, global = true, conflicts_with = "shard_paths")]
    pub config: Option<PathBuf>,

    /// Shard index directory (repeat for several shards)
    #[arg(long = "shard-path", global = true)]
    pub shard_paths: Vec<PathBuf>,
}

/// Supported `prodcomp` subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Add products from a JSON file
    Add(AddCommand),

    /// Search products by keywords
    Search(SearchCommand),

    /// Show shards and their document counts
    Status,

    /// Validate configuration and show effective settings
    Check,
}

/// Arguments for `prodcomp add`.
#[derive(Args, Debug, Clone)]
pub struct AddCommand {
    /// JSON file holding one product object or an array of them
    pub file: PathBuf,

    /// Shard to write to instead of the default shard
    #[arg(long)]
    pub shard: Option<String>,
}

/// Arguments for `prodcomp search`.
#[derive(Args, Debug, Clone)]
pub struct SearchCommand {
    /// Words every product must contain
    #[arg(required = true)]
    pub words: Vec<String>,

    /// Zero-based result page
    #[arg(long, default_value = "0")]
    pub page: usize,

    /// Order results by ascending price
    #[arg(long)]
    pub sort_price: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

impl SearchCommand {
    /// The words joined into one query string.
    pub fn query(&self) -> String {
        self.words.join(" ")
    }
}
