//! Tantivy-based product search index for prodcomp.
//!
//! This crate provides the indexing and query engine behind a product catalog:
//! - Text normalization shared by indexing and querying
//! - Shards: independent Tantivy indexes with replace-by-URL writes
//! - Conjunctive keyword queries evaluated across shards in parallel
//! - Merged, paginated results with optional price ordering
//!
//! # Example
//!
//! ```no_run
//! use std::path::PathBuf;
//!
//! use prodcomp_index::{Product, ProductRepository, RepositoryOptions, SearchParams};
//!
//! let paths = [PathBuf::from("./catalog")];
//! let repo = ProductRepository::open_paths(&paths, RepositoryOptions::default()).unwrap();
//!
//! let lamp = Product::builder()
//!     .title("Desk lamp")
//!     .url("https://shop.example/lamp")
//!     .image_url("https://shop.example/lamp.jpg")
//!     .description("Adjustable LED desk lamp")
//!     .price("24.99")
//!     .build()
//!     .unwrap();
//! repo.add_product(&lamp).unwrap();
//!
//! let page = repo
//!     .search_with("lamp", &SearchParams::default().sorted_by_price())
//!     .unwrap();
//! assert_eq!(page.products.len(), 1);
//! ```

#![warn(missing_docs)]

mod aggregate;
mod analyzer;
pub mod codec;
mod document;
mod error;
mod product;
mod query;
mod repository;
mod schema;
mod shard;
mod writer;

pub use aggregate::{ResultAggregator, SearchParams, SearchResult};
pub use analyzer::{TermSet, TextNormalizer, parse_language};
pub use document::{IDENTITY_PREFIX, IdentityKey, IndexedDocument, MAX_URL_LEN, SortValue};
pub use error::IndexError;
pub use product::{Product, ProductBuilder, parse_price};
pub use query::{ParsedQuery, QueryEngine, ShardMatches};
pub use repository::{ProductRepository, RepositoryOptions};
pub use schema::ProductSchema;
pub use shard::{Shard, ShardHit, ShardSnapshot, StoredDocument};
pub use writer::IndexWriter;
