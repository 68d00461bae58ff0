//! Index schema definition for product shards.
//!
//! Defines the Tantivy schema shared by every shard:
//! - `id`: Identity key (raw string, stored, fast)
//! - `terms`: Normalized terms, one raw token per value (indexed only)
//! - `price`: Sort value (f64, stored, fast)
//! - `payload`: Serialized product (stored only)

use tantivy::{
    TantivyDocument,
    schema::{FAST, Field, STORED, STRING, Schema},
};

use crate::document::IndexedDocument;

/// Handles to all fields in the shard schema.
#[derive(Debug, Clone)]
pub struct ProductSchema {
    /// The underlying Tantivy schema.
    schema: Schema,
    /// Identity key, `U{url}`.
    pub id: Field,
    /// Normalized term postings.
    pub terms: Field,
    /// Price used for ordering.
    pub price: Field,
    /// JSON payload of the full product.
    pub payload: Field,
}

impl ProductSchema {
    /// Name of the identity key field.
    pub const ID: &'static str = "id";
    /// Name of the sort value field.
    pub const PRICE: &'static str = "price";

    /// Creates the schema with all fields configured.
    pub fn new() -> Self {
        let mut builder = Schema::builder();

        // Single-token key so delete_term can retract a document exactly;
        // the fast column lets matches read keys without loading stored docs
        let id = builder.add_text_field(Self::ID, STRING | STORED | FAST);

        // Terms are normalized before indexing, so the raw tokenizer keeps them intact
        let terms = builder.add_text_field("terms", STRING);

        let price = builder.add_f64_field(Self::PRICE, STORED | FAST);
        let payload = builder.add_text_field("payload", STORED);

        let schema = builder.build();

        Self {
            schema,
            id,
            terms,
            price,
            payload,
        }
    }

    /// Returns a reference to the underlying Tantivy schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Converts an indexed document into a Tantivy document.
    pub(crate) fn to_tantivy(&self, doc: &IndexedDocument) -> TantivyDocument {
        let mut tantivy_doc = TantivyDocument::new();
        tantivy_doc.add_text(self.id, doc.key.as_str());
        for term in &doc.terms {
            tantivy_doc.add_text(self.terms, term);
        }
        tantivy_doc.add_f64(self.price, doc.sort_value.get());
        tantivy_doc.add_text(self.payload, &doc.payload);
        tantivy_doc
    }
}

impl Default for ProductSchema {
    fn default() -> Self {
        Self::new()
    }
}
