//! Implementation of `prodcomp add`.

use std::{fs, path::Path, process::ExitCode};

use prodcomp_index::Product;
use serde_json::Value;
use tracing::info;

use crate::cli::{args::AddCommand, context::CommandContext, output::report_index_error};

/// Reads products from a JSON file holding one object or an array of objects.
pub fn read_products(path: &Path) -> Result<Vec<Product>, String> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    parse_products(&text).map_err(|e| format!("{}: {e}", path.display()))
}

/// Parses one product object or an array of them.
fn parse_products(text: &str) -> serde_json::Result<Vec<Product>> {
    match serde_json::from_str(text)? {
        Value::Array(items) => items.into_iter().map(serde_json::from_value).collect(),
        single => Ok(vec![serde_json::from_value(single)?]),
    }
}

/// Adds the products in a file to the default or named shard.
pub fn run(ctx: &CommandContext, cmd: &AddCommand) -> ExitCode {
    let products = match read_products(&cmd.file) {
        Ok(products) => products,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let repo = match ctx.repository() {
        Ok(repo) => repo,
        Err(code) => return code,
    };

    let target = cmd
        .shard
        .clone()
        .unwrap_or_else(|| repo.default_shard().name().to_string());

    for (i, product) in products.iter().enumerate() {
        if let Err(e) = repo.add_product_to(product, &target) {
            report_index_error(&format!("product {} ({})", i + 1, product.url()), &e);
            if i > 0 {
                eprintln!("{i} earlier product(s) were written");
            }
            return ExitCode::FAILURE;
        }
    }

    info!(count = products.len(), shard = %target, "added products");
    println!("Added {} product(s) to shard {target}", products.len());
    ExitCode::SUCCESS
}
