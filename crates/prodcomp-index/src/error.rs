//! Error types for the prodcomp-index crate.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors that can occur when writing to or searching a product repository.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Failed to open or create a shard index.
    #[error("failed to open index at {path}: {message}")]
    OpenIndex {
        /// Path to the index directory.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Failed to write to a shard index.
    #[error("failed to write to index: {0}")]
    Write(String),

    /// Failed to commit changes to a shard index.
    #[error("failed to commit index: {0}")]
    Commit(String),

    /// Failed to read from a shard index.
    #[error("failed to read index: {0}")]
    Read(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A product field is missing or malformed.
    #[error("invalid product {field}: {reason}")]
    InvalidProduct {
        /// Name of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// A write named a shard that is not part of the repository.
    #[error("unknown shard: {0}")]
    UnknownShard(String),

    /// The repository cannot be constructed from the given shards and options.
    #[error("invalid repository: {0}")]
    InvalidRepository(String),

    /// Invalid stemmer language.
    #[error("unsupported stemmer language: {0}")]
    InvalidLanguage(String),

    /// A stored product payload could not be encoded or decoded.
    #[error("invalid product payload: {0}")]
    Payload(String),
}

impl IndexError {
    /// Returns true for failures of the underlying index storage.
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            Self::OpenIndex { .. } | Self::Write(_) | Self::Commit(_) | Self::Read(_) | Self::Io(_)
        )
    }

    /// Creates an `OpenIndex` error from a path and Tantivy error.
    pub(crate) fn open_index(path: PathBuf, source: &tantivy::TantivyError) -> Self {
        Self::OpenIndex {
            path,
            message: source.to_string(),
        }
    }

    /// Creates a `Write` error from a Tantivy error.
    pub(crate) fn write(source: &tantivy::TantivyError) -> Self {
        Self::Write(source.to_string())
    }

    /// Creates a `Commit` error from a Tantivy error.
    pub(crate) fn commit(source: &tantivy::TantivyError) -> Self {
        Self::Commit(source.to_string())
    }

    /// Creates a `Read` error from a Tantivy error.
    pub(crate) fn read(source: &tantivy::TantivyError) -> Self {
        Self::Read(source.to_string())
    }

    /// Creates an `InvalidProduct` error for a field.
    pub(crate) fn invalid_product(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidProduct {
            field,
            reason: reason.into(),
        }
    }
}
