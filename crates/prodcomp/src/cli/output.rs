//! Rendering and JSON serialization for CLI output.

use comfy_table::{Cell, CellAlignment, Table, presets::UTF8_FULL_CONDENSED};
use prodcomp_index::{IndexError, Product, SearchResult};
use serde::Serialize;

/// ANSI escape codes for terminal styling.
mod colors {
    /// Bold text.
    pub const BOLD: &str = "\x1b[1m";
    /// Dimmed text.
    pub const DIM: &str = "\x1b[2m";
    /// Yellow text.
    pub const YELLOW: &str = "\x1b[33m";
    /// Reset all styles.
    pub const RESET: &str = "\x1b[0m";
}

/// Formats text as a subheader (bold).
pub fn subheader(text: &str) -> String {
    format!("{}{}{}", colors::BOLD, text, colors::RESET)
}

/// Formats text as dimmed/less important.
pub fn dim(text: &str) -> String {
    format!("{}{}{}", colors::DIM, text, colors::RESET)
}

/// Formats text as a warning (yellow).
pub fn warning(text: &str) -> String {
    format!("{}{}{}", colors::YELLOW, text, colors::RESET)
}

/// Prints an index error, adding a hint when shard storage itself failed.
pub fn report_index_error(context: &str, err: &IndexError) {
    eprintln!("error: {context}: {err}");
    if let Some(hint) = storage_hint(err) {
        eprintln!("{hint}");
    }
}

/// Follow-up advice for storage failures; `None` for input errors.
fn storage_hint(err: &IndexError) -> Option<&'static str> {
    err.is_storage().then_some(
        "The shard index could not be read or written. Check the shard directory with `prodcomp check`.",
    )
}

/// JSON output for `prodcomp search`.
#[derive(Serialize)]
struct JsonSearchOutput<'a> {
    /// The query as typed.
    query: &'a str,
    /// Requested page.
    page: usize,
    /// Page count and products.
    #[serde(flatten)]
    result: &'a SearchResult,
}

/// Serializes a search result as pretty JSON.
pub fn search_json(query: &str, page: usize, result: &SearchResult) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonSearchOutput {
        query,
        page,
        result,
    })
}

/// Renders products as a table.
pub fn product_table(products: &[Product]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["Title", "Price", "URL"]);
    for product in products {
        table.add_row(vec![
            Cell::new(product.title()),
            Cell::new(product.price()).set_alignment(CellAlignment::Right),
            Cell::new(product.url()),
        ]);
    }
    table
}

/// Footer line naming the current page, counted from one.
pub fn page_footer(page: usize, result: &SearchResult) -> String {
    format!(
        "Page {} of {} ({} shown)",
        page + 1,
        result.page_count,
        result.products.len()
    )
}
