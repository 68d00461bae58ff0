//! Merging per-shard matches into one paginated result.
//!
//! The aggregator treats the matches of all shards as one logical sequence,
//! orders it, and cuts out the requested page.
//!
//! # Ordering
//!
//! - Default: shard order, then identity key within a shard.
//! - By price: ascending sort value, ties broken by identity key, then shard order.
//!
//! # Page count
//!
//! With `total` matches and page size `n`:
//! - `total >= n`: `total / n`, rounded down
//! - `0 < total < n`: 1
//! - `total == 0`: 0
//!
//! A page that contains no products reports a page count of 0, even when earlier
//! pages exist.

use std::cmp::Ordering;

use serde::Serialize;

use crate::{
    codec,
    error::IndexError,
    product::Product,
    query::ShardMatches,
    shard::ShardHit,
};

/// Parameters for one search call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchParams {
    /// Zero-based page index.
    pub page: usize,
    /// Order results by ascending price.
    pub sort_by_price: bool,
}

impl SearchParams {
    /// Parameters for the given page.
    pub fn page(page: usize) -> Self {
        Self {
            page,
            ..Self::default()
        }
    }

    /// Returns these parameters with price ordering enabled.
    pub fn sorted_by_price(mut self) -> Self {
        self.sort_by_price = true;
        self
    }
}

/// One page of search results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    /// Number of result pages for the query.
    pub page_count: usize,
    /// Products on the requested page.
    pub products: Vec<Product>,
}

impl SearchResult {
    /// A result with no pages and no products.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Orders and paginates merged shard matches.
#[derive(Debug, Clone, Copy)]
pub struct ResultAggregator {
    /// Products per page; always positive.
    page_size: usize,
}

impl ResultAggregator {
    /// Creates an aggregator with the given page size.
    pub fn new(page_size: usize) -> Result<Self, IndexError> {
        if page_size == 0 {
            return Err(IndexError::InvalidRepository(
                "page size must be a positive integer".to_string(),
            ));
        }
        Ok(Self { page_size })
    }

    /// Products per page.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Page count for a total number of matches.
    pub fn page_count(&self, total: usize) -> usize {
        match total {
            0 => 0,
            t if t >= self.page_size => t / self.page_size,
            _ => 1,
        }
    }

    /// Merges per-shard matches and returns the requested page.
    pub fn aggregate(
        &self,
        matches: &[ShardMatches<'_>],
        params: &SearchParams,
    ) -> Result<SearchResult, IndexError> {
        let total: usize = matches.iter().map(ShardMatches::len).sum();

        let Some(start) = params.page.checked_mul(self.page_size) else {
            return Ok(SearchResult::empty());
        };
        if start >= total {
            return Ok(SearchResult::empty());
        }

        let mut merged: Vec<(usize, &ShardHit)> = matches
            .iter()
            .enumerate()
            .flat_map(|(shard_idx, m)| m.hits.iter().map(move |hit| (shard_idx, hit)))
            .collect();

        if params.sort_by_price {
            merged.sort_by(|a, b| by_price(*a, *b));
        }

        // Only the page window is loaded from the document store
        let mut products = Vec::with_capacity(self.page_size);
        for (shard_idx, hit) in merged.into_iter().skip(start).take(self.page_size) {
            let stored = matches[shard_idx].snapshot.load_hit(hit)?;
            products.push(codec::decode(&stored.payload)?);
        }

        Ok(SearchResult {
            page_count: self.page_count(total),
            products,
        })
    }
}

/// Ascending price, then identity key, then shard position.
fn by_price(a: (usize, &ShardHit), b: (usize, &ShardHit)) -> Ordering {
    a.1.sort_value
        .cmp(&b.1.sort_value)
        .then_with(|| a.1.key.cmp(&b.1.key))
        .then_with(|| a.0.cmp(&b.0))
}
