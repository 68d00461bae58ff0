//! Index writer turning products into shard documents.

use crate::{
    analyzer::{TermSet, TextNormalizer},
    codec,
    document::{IdentityKey, IndexedDocument, SortValue},
    error::IndexError,
    product::Product,
    shard::Shard,
};

/// Builds indexed documents from products and stores them in shards.
///
/// The writer must share its [`TextNormalizer`] configuration with the query
/// engine reading the same shards.
#[derive(Clone, Default)]
pub struct IndexWriter {
    /// Normalizer producing each document's terms.
    normalizer: TextNormalizer,
}

impl IndexWriter {
    /// Creates a writer using the given normalizer.
    pub fn new(normalizer: TextNormalizer) -> Self {
        Self { normalizer }
    }

    /// Derives the storage-ready document for a product.
    ///
    /// Terms are the union of the normalized title and description. Fails with
    /// [`IndexError::InvalidProduct`] if the price is not a decimal number.
    pub fn build_document(&self, product: &Product) -> Result<IndexedDocument, IndexError> {
        let sort_value = SortValue::new(product.price_value()?);

        let mut terms: TermSet = self.normalizer.normalize(product.title());
        terms.extend(self.normalizer.normalize(product.description()));

        Ok(IndexedDocument {
            key: IdentityKey::from_url(product.url()),
            terms,
            sort_value,
            payload: codec::encode(product)?,
        })
    }

    /// Writes a product to a shard, replacing any product with the same URL.
    pub fn write(&self, shard: &Shard, product: &Product) -> Result<(), IndexError> {
        let doc = self.build_document(product)?;
        shard.upsert(&doc)
    }
}
