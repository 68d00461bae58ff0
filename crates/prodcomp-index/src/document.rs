//! Document types for indexing.
//!
//! An [`IndexedDocument`] is the derived, storage-ready form of a product: its
//! identity key, its normalized term set, its sort value and its payload.

use std::{cmp::Ordering, fmt};

use tantivy::tokenizer::MAX_TOKEN_LEN;

use crate::analyzer::TermSet;

/// Prefix reserving identity keys from content terms.
pub const IDENTITY_PREFIX: &str = "U";

/// Longest URL, in bytes, whose identity key still fits in one index token.
///
/// Longer keys would be dropped by the indexer, leaving a document that can
/// neither be replaced nor fetched by key.
pub const MAX_URL_LEN: usize = MAX_TOKEN_LEN - IDENTITY_PREFIX.len();

/// Unique key of a product within one shard, derived from its URL.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IdentityKey(String);

impl IdentityKey {
    /// Builds the identity key for a product URL.
    pub fn from_url(url: &str) -> Self {
        Self(format!("{IDENTITY_PREFIX}{url}"))
    }

    /// Wraps a key read back from the index.
    pub(crate) fn from_stored(key: String) -> Self {
        Self(key)
    }

    /// The key as stored in the index.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Order-preserving price encoding used for ascending sorts.
#[derive(Debug, Clone, Copy)]
pub struct SortValue(f64);

impl SortValue {
    /// Creates a sort value from a numeric price.
    ///
    /// Negative zero is stored as zero so the two compare equal.
    pub fn new(value: f64) -> Self {
        if value == 0.0 { Self(0.0) } else { Self(value) }
    }

    /// The numeric value.
    pub fn get(self) -> f64 {
        self.0
    }
}

impl PartialEq for SortValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortValue {}

impl PartialOrd for SortValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SortValue {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// A product ready for storage in a shard.
#[derive(Debug, Clone)]
pub struct IndexedDocument {
    /// Identity key derived from the product URL.
    pub key: IdentityKey,
    /// Normalized terms from title and description.
    pub terms: TermSet,
    /// Sort value derived from the price.
    pub sort_value: SortValue,
    /// Serialized product returned on retrieval.
    pub payload: String,
}
