//! Implementation of `prodcomp search`.

use std::process::ExitCode;

use prodcomp_index::SearchParams;

use crate::cli::{
    args::SearchCommand,
    context::CommandContext,
    output::{dim, page_footer, product_table, report_index_error, search_json},
};

/// Searches every shard and prints one page of products.
pub fn run(ctx: &CommandContext, cmd: &SearchCommand) -> ExitCode {
    let repo = match ctx.repository() {
        Ok(repo) => repo,
        Err(code) => return code,
    };

    let query = cmd.query();
    let params = SearchParams {
        page: cmd.page,
        sort_by_price: cmd.sort_price,
    };

    let result = match repo.search_with(&query, &params) {
        Ok(result) => result,
        Err(e) => {
            report_index_error("search failed", &e);
            return ExitCode::FAILURE;
        }
    };

    if cmd.json {
        return match search_json(&query, cmd.page, &result) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("error: failed to serialize results: {e}");
                ExitCode::FAILURE
            }
        };
    }

    if result.products.is_empty() {
        println!("{}", dim("No matching products."));
        return ExitCode::SUCCESS;
    }

    println!("{}", product_table(&result.products));
    println!("{}", dim(&page_footer(cmd.page, &result)));
    ExitCode::SUCCESS
}
