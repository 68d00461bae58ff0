//! A single, physically independent product index.
//!
//! A [`Shard`] wraps one Tantivy index holding identity-keyed documents, their
//! term postings and their sort values. Writes are serialized through the
//! shard's writer lock; reads go through [`ShardSnapshot`]s, each pinned to one
//! committed state of the index.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::atomic::{AtomicBool, Ordering},
};

use parking_lot::Mutex;
use tantivy::{
    DocAddress, DocId, Index, IndexReader, IndexWriter as TantivyIndexWriter, ReloadPolicy,
    Searcher as TantivySearcher, TantivyDocument, Term,
    collector::{Count, DocSetCollector, TopDocs},
    columnar::{Column, StrColumn},
    directory::MmapDirectory,
    fastfield::FastFieldReaders,
    query::{BooleanQuery, Occur, Query, TermQuery},
    schema::{IndexRecordOption, Value},
};
use tracing::{debug, info, warn};

use crate::{
    analyzer::TermSet,
    document::{IdentityKey, IndexedDocument, SortValue},
    error::IndexError,
    schema::ProductSchema,
};

/// Heap size for each shard's writer (20 MB).
const WRITER_HEAP_SIZE: usize = 20_000_000;

/// A matching document's key, sort value and location in its snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardHit {
    /// Identity key of the matching document.
    pub key: IdentityKey,
    /// Sort value of the matching document.
    pub sort_value: SortValue,
    /// Address of the document; valid only within the snapshot that produced it.
    address: DocAddress,
}

/// A stored document as returned by [`ShardSnapshot::fetch`].
#[derive(Debug, Clone)]
pub struct StoredDocument {
    /// Sort value of the document.
    pub sort_value: SortValue,
    /// Serialized product.
    pub payload: String,
}

/// One independent index store within a repository.
pub struct Shard {
    /// Name used to target writes at this shard.
    name: String,
    /// Index directory, or `None` for an in-memory shard.
    location: Option<PathBuf>,
    /// Reader reloaded after every commit.
    reader: IndexReader,
    /// The single writer for this shard.
    writer: Mutex<TantivyIndexWriter>,
    /// Set when a commit landed but the reader could not be reloaded.
    reload_pending: AtomicBool,
    /// Schema with field handles.
    schema: ProductSchema,
}

impl Shard {
    /// Opens or creates a shard index at the given path.
    pub fn open(name: &str, path: &Path) -> Result<Self, IndexError> {
        let schema = ProductSchema::new();

        fs::create_dir_all(path)?;

        let dir = MmapDirectory::open(path).map_err(|e| {
            let err: tantivy::TantivyError = e.into();
            IndexError::open_index(path.to_path_buf(), &err)
        })?;

        let index = Index::open_or_create(dir, schema.schema().clone())
            .map_err(|e| IndexError::open_index(path.to_path_buf(), &e))?;

        let shard = Self::from_index(name, Some(path.to_path_buf()), index, schema)?;
        info!(shard = name, path = %path.display(), docs = shard.num_docs(), "opened shard");
        Ok(shard)
    }

    /// Creates an empty shard held entirely in memory.
    pub fn in_memory(name: &str) -> Result<Self, IndexError> {
        let schema = ProductSchema::new();
        let index = Index::create_in_ram(schema.schema().clone());
        Self::from_index(name, None, index, schema)
    }

    /// Wraps an index with a reader and the shard's single writer.
    fn from_index(
        name: &str,
        location: Option<PathBuf>,
        index: Index,
        schema: ProductSchema,
    ) -> Result<Self, IndexError> {
        let open_err = |e: &tantivy::TantivyError| {
            IndexError::open_index(location.clone().unwrap_or_default(), e)
        };

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e| open_err(&e))?;

        let writer = index
            .writer_with_num_threads(1, WRITER_HEAP_SIZE)
            .map_err(|e| open_err(&e))?;

        Ok(Self {
            name: name.to_string(),
            location,
            reader,
            writer: Mutex::new(writer),
            reload_pending: AtomicBool::new(false),
            schema,
        })
    }

    /// The shard's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The shard's index directory, if it is stored on disk.
    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    /// Replaces the document stored under `doc.key`.
    ///
    /// Postings of any previous document with the same key are retracted and the
    /// new document is added in a single commit, so readers observe either the old
    /// document or the new one. If any step before the commit fails the staged
    /// changes are rolled back and the previous document stays in place.
    ///
    /// Once the commit lands the write is reported as successful. A failure to
    /// reload the reader afterwards is logged and retried by the next
    /// [`Shard::snapshot`].
    pub fn upsert(&self, doc: &IndexedDocument) -> Result<(), IndexError> {
        let mut writer = self.writer.lock();

        writer.delete_term(Term::from_field_text(self.schema.id, doc.key.as_str()));

        let staged = writer
            .add_document(self.schema.to_tantivy(doc))
            .map_err(|e| IndexError::write(&e))
            .and_then(|_| writer.commit().map_err(|e| IndexError::commit(&e)));

        if let Err(err) = staged {
            if let Err(rollback_err) = writer.rollback() {
                warn!(shard = %self.name, error = %rollback_err, "rollback failed");
            }
            return Err(err);
        }

        drop(writer);
        debug!(shard = %self.name, key = %doc.key, terms = doc.terms.len(), "upserted document");
        self.reload();
        Ok(())
    }

    /// Reloads the reader, leaving a retry flag set if that fails.
    fn reload(&self) {
        match self.reader.reload() {
            Ok(()) => self.reload_pending.store(false, Ordering::Release),
            Err(e) => {
                self.reload_pending.store(true, Ordering::Release);
                warn!(shard = %self.name, error = %e, "reader reload failed after commit");
            }
        }
    }

    /// Takes a read snapshot of the shard's last committed state.
    pub fn snapshot(&self) -> ShardSnapshot<'_> {
        if self.reload_pending.load(Ordering::Acquire) {
            self.reload();
        }
        ShardSnapshot {
            shard: self,
            searcher: self.reader.searcher(),
        }
    }

    /// Returns the identity keys of documents containing every required term.
    pub fn matching_keys(&self, required: &TermSet) -> Result<Vec<IdentityKey>, IndexError> {
        let hits = self.snapshot().matches(required)?;
        Ok(hits.into_iter().map(|hit| hit.key).collect())
    }

    /// Looks up the document stored under `key`.
    pub fn fetch(&self, key: &IdentityKey) -> Result<Option<StoredDocument>, IndexError> {
        self.snapshot().fetch(key)
    }

    /// Counts documents containing every required term.
    pub fn estimated_count(&self, required: &TermSet) -> Result<usize, IndexError> {
        self.snapshot().estimated_count(required)
    }

    /// Returns the number of documents in the shard.
    pub fn num_docs(&self) -> u64 {
        self.snapshot().searcher.num_docs()
    }
}

/// A point-in-time read view of one shard.
pub struct ShardSnapshot<'a> {
    /// Shard this snapshot was taken from.
    shard: &'a Shard,
    /// Tantivy searcher pinned to one committed segment set.
    searcher: TantivySearcher,
}

impl<'a> ShardSnapshot<'a> {
    /// The shard this snapshot reads from.
    pub fn shard(&self) -> &'a Shard {
        self.shard
    }

    /// Returns every document containing all required terms, ordered by key.
    ///
    /// Keys and sort values come from fast fields; stored documents are not
    /// touched. An empty requirement matches nothing.
    pub fn matches(&self, required: &TermSet) -> Result<Vec<ShardHit>, IndexError> {
        let Some(query) = self.conjunction(required) else {
            return Ok(Vec::new());
        };

        let addresses = self
            .searcher
            .search(&*query, &DocSetCollector)
            .map_err(|e| IndexError::read(&e))?;

        let columns = self
            .searcher
            .segment_readers()
            .iter()
            .map(|segment| SegmentColumns::open(segment.fast_fields()))
            .collect::<Result<Vec<_>, _>>()?;

        let mut key = String::new();
        let mut hits = Vec::with_capacity(addresses.len());
        for address in addresses {
            let segment = &columns[address.segment_ord as usize];
            segment.read_key(address.doc_id, &mut key)?;
            hits.push(ShardHit {
                key: IdentityKey::from_stored(key.clone()),
                sort_value: SortValue::new(segment.prices.first(address.doc_id).unwrap_or(0.0)),
                address,
            });
        }
        hits.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(hits)
    }

    /// Loads the stored document behind a hit taken from this snapshot.
    pub fn load_hit(&self, hit: &ShardHit) -> Result<StoredDocument, IndexError> {
        let doc = self.load(hit.address)?;
        self.stored_document(&doc, &hit.key)
    }

    /// Counts documents containing all required terms.
    pub fn estimated_count(&self, required: &TermSet) -> Result<usize, IndexError> {
        let Some(query) = self.conjunction(required) else {
            return Ok(0);
        };
        self.searcher
            .search(&*query, &Count)
            .map_err(|e| IndexError::read(&e))
    }

    /// Looks up the document stored under `key`.
    pub fn fetch(&self, key: &IdentityKey) -> Result<Option<StoredDocument>, IndexError> {
        let schema = &self.shard.schema;
        let query = TermQuery::new(
            Term::from_field_text(schema.id, key.as_str()),
            IndexRecordOption::Basic,
        );

        let top_docs = self
            .searcher
            .search(&query, &TopDocs::with_limit(1))
            .map_err(|e| IndexError::read(&e))?;

        let Some((_, address)) = top_docs.first() else {
            return Ok(None);
        };

        let doc = self.load(*address)?;
        self.stored_document(&doc, key).map(Some)
    }

    /// Builds the conjunctive term query, or `None` when no terms are required.
    fn conjunction(&self, required: &TermSet) -> Option<Box<dyn Query>> {
        if required.is_empty() {
            return None;
        }

        let clauses: Vec<(Occur, Box<dyn Query>)> = required
            .iter()
            .map(|term| {
                let query: Box<dyn Query> = Box::new(TermQuery::new(
                    Term::from_field_text(self.shard.schema.terms, term),
                    IndexRecordOption::Basic,
                ));
                (Occur::Must, query)
            })
            .collect();

        Some(Box::new(BooleanQuery::new(clauses)))
    }

    /// Extracts payload and sort value from a loaded document.
    fn stored_document(
        &self,
        doc: &TantivyDocument,
        key: &IdentityKey,
    ) -> Result<StoredDocument, IndexError> {
        let payload = doc
            .get_first(self.shard.schema.payload)
            .and_then(|v| v.as_str())
            .ok_or_else(|| IndexError::Read(format!("document {key} has no payload")))?
            .to_string();

        Ok(StoredDocument {
            sort_value: self.sort_value(doc),
            payload,
        })
    }

    /// Loads a stored document.
    fn load(&self, address: DocAddress) -> Result<TantivyDocument, IndexError> {
        self.searcher.doc(address).map_err(|e| IndexError::read(&e))
    }

    /// Reads a document's sort value.
    fn sort_value(&self, doc: &TantivyDocument) -> SortValue {
        let price = doc
            .get_first(self.shard.schema.price)
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0);
        SortValue::new(price)
    }
}

/// Fast-field columns of one segment.
struct SegmentColumns {
    /// Identity keys.
    ids: StrColumn,
    /// Sort values.
    prices: Column<f64>,
}

impl SegmentColumns {
    /// Opens the identity and price columns of a segment.
    fn open(fast_fields: &FastFieldReaders) -> Result<Self, IndexError> {
        let ids = fast_fields
            .str(ProductSchema::ID)
            .map_err(|e| IndexError::read(&e))?
            .ok_or_else(|| IndexError::Read("identity fast field missing".to_string()))?;
        let prices = fast_fields
            .f64(ProductSchema::PRICE)
            .map_err(|e| IndexError::read(&e))?;
        Ok(Self { ids, prices })
    }

    /// Reads the identity key of a document into `out`.
    fn read_key(&self, doc: DocId, out: &mut String) -> Result<(), IndexError> {
        out.clear();
        let ord = self
            .ids
            .term_ords(doc)
            .next()
            .ok_or_else(|| IndexError::Read("document has no identity key".to_string()))?;
        if !self.ids.ord_to_str(ord, out)? {
            return Err(IndexError::Read(format!("identity ordinal {ord} out of range")));
        }
        Ok(())
    }
}

#[cfg(test)]
impl Shard {
    /// Commits a document that has an identity key and terms but no payload.
    pub(crate) fn commit_without_payload(&self, url: &str, words: &[&str]) {
        let mut doc = TantivyDocument::new();
        doc.add_text(self.schema.id, IdentityKey::from_url(url).as_str());
        for word in words {
            doc.add_text(self.schema.terms, word);
        }
        let mut writer = self.writer.lock();
        writer.add_document(doc).unwrap();
        writer.commit().unwrap();
        drop(writer);
        self.reload();
    }
}

#[cfg(test)]
mod test {
    use std::thread;

    use tempfile::TempDir;

    use super::*;

    fn terms(words: &[&str]) -> TermSet {
        words.iter().map(|w| (*w).to_string()).collect()
    }

    fn doc(url: &str, words: &[&str], price: f64) -> IndexedDocument {
        IndexedDocument {
            key: IdentityKey::from_url(url),
            terms: terms(words),
            sort_value: SortValue::new(price),
            payload: format!("payload of {url}"),
        }
    }

    fn keys(hits: &[IdentityKey]) -> Vec<&str> {
        hits.iter().map(IdentityKey::as_str).collect()
    }

    #[test]
    fn creates_index_in_empty_directory() {
        let temp = TempDir::new().unwrap();
        let shard = Shard::open("main", temp.path()).unwrap();

        assert!(temp.path().join("meta.json").exists());
        assert_eq!(shard.name(), "main");
        assert_eq!(shard.location(), Some(temp.path()));
        assert_eq!(shard.num_docs(), 0);
    }

    #[test]
    fn upsert_then_match_and_fetch() {
        let shard = Shard::in_memory("main").unwrap();
        shard.upsert(&doc("a", &["head", "text"], 10.0)).unwrap();

        let found = shard.matching_keys(&terms(&["head"])).unwrap();
        assert_eq!(keys(&found), vec!["Ua"]);

        let stored = shard.fetch(&IdentityKey::from_url("a")).unwrap().unwrap();
        assert_eq!(stored.payload, "payload of a");
        assert_eq!(stored.sort_value, SortValue::new(10.0));
    }

    #[test]
    fn match_requires_every_term() {
        let shard = Shard::in_memory("main").unwrap();
        shard.upsert(&doc("a", &["head", "text"], 1.0)).unwrap();

        assert_eq!(
            shard.matching_keys(&terms(&["head", "text"])).unwrap().len(),
            1
        );
        assert!(
            shard
                .matching_keys(&terms(&["head", "text", "worm"]))
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn empty_requirement_matches_nothing() {
        let shard = Shard::in_memory("main").unwrap();
        shard.upsert(&doc("a", &["head"], 1.0)).unwrap();

        assert!(shard.matching_keys(&TermSet::new()).unwrap().is_empty());
        assert_eq!(shard.estimated_count(&TermSet::new()).unwrap(), 0);
    }

    #[test]
    fn upsert_replaces_and_retracts_old_postings() {
        let shard = Shard::in_memory("main").unwrap();
        shard.upsert(&doc("a", &["old", "shared"], 1.0)).unwrap();
        shard.upsert(&doc("a", &["new", "shared"], 2.0)).unwrap();

        assert_eq!(shard.num_docs(), 1);
        assert!(shard.matching_keys(&terms(&["old"])).unwrap().is_empty());
        assert_eq!(shard.matching_keys(&terms(&["new"])).unwrap().len(), 1);
        assert_eq!(shard.estimated_count(&terms(&["shared"])).unwrap(), 1);

        let stored = shard.fetch(&IdentityKey::from_url("a")).unwrap().unwrap();
        assert_eq!(stored.sort_value, SortValue::new(2.0));
    }

    #[test]
    fn matches_are_ordered_by_key() {
        let shard = Shard::in_memory("main").unwrap();
        for url in ["c", "a", "b"] {
            shard.upsert(&doc(url, &["lamp"], 1.0)).unwrap();
        }

        let found = shard.matching_keys(&terms(&["lamp"])).unwrap();
        assert_eq!(keys(&found), vec!["Ua", "Ub", "Uc"]);
    }

    #[test]
    fn fetch_missing_key_returns_none() {
        let shard = Shard::in_memory("main").unwrap();
        assert!(shard.fetch(&IdentityKey::from_url("nope")).unwrap().is_none());
    }

    #[test]
    fn snapshot_is_isolated_from_later_writes() {
        let shard = Shard::in_memory("main").unwrap();
        shard.upsert(&doc("a", &["lamp"], 1.0)).unwrap();

        let snapshot = shard.snapshot();
        shard.upsert(&doc("b", &["lamp"], 2.0)).unwrap();

        assert_eq!(snapshot.estimated_count(&terms(&["lamp"])).unwrap(), 1);
        assert_eq!(shard.estimated_count(&terms(&["lamp"])).unwrap(), 2);
    }

    #[test]
    fn reopens_existing_index() {
        let temp = TempDir::new().unwrap();
        {
            let shard = Shard::open("main", temp.path()).unwrap();
            shard.upsert(&doc("a", &["lamp"], 3.5)).unwrap();
        }

        let shard = Shard::open("main", temp.path()).unwrap();
        assert_eq!(shard.num_docs(), 1);
        assert_eq!(shard.matching_keys(&terms(&["lamp"])).unwrap().len(), 1);
    }

    #[test]
    fn matches_read_keys_and_prices_from_fast_fields() {
        let shard = Shard::in_memory("main").unwrap();
        shard.upsert(&doc("b", &["lamp"], 7.5)).unwrap();
        shard.upsert(&doc("a", &["lamp"], -2.0)).unwrap();
        shard.upsert(&doc("c", &["rug"], 1.0)).unwrap();

        let snapshot = shard.snapshot();
        let hits = snapshot.matches(&terms(&["lamp"])).unwrap();
        let found: Vec<_> = hits
            .iter()
            .map(|hit| (hit.key.as_str(), hit.sort_value.get()))
            .collect();
        assert_eq!(found, vec![("Ua", -2.0), ("Ub", 7.5)]);

        let stored = snapshot.load_hit(&hits[1]).unwrap();
        assert_eq!(stored.payload, "payload of b");
    }

    #[test]
    fn load_hit_without_payload_is_a_read_error() {
        let shard = Shard::in_memory("main").unwrap();
        shard.commit_without_payload("a", &["lamp"]);

        let snapshot = shard.snapshot();
        let hits = snapshot.matches(&terms(&["lamp"])).unwrap();
        assert_eq!(hits.len(), 1);
        assert!(matches!(
            snapshot.load_hit(&hits[0]),
            Err(IndexError::Read(_))
        ));
    }

    #[test]
    fn pending_reload_is_retried_by_next_snapshot() {
        let shard = Shard::in_memory("main").unwrap();
        {
            let mut writer = shard.writer.lock();
            writer
                .add_document(shard.schema.to_tantivy(&doc("a", &["lamp"], 1.0)))
                .unwrap();
            writer.commit().unwrap();
        }
        // Commit landed but the reader was never reloaded
        assert_eq!(shard.reader.searcher().num_docs(), 0);
        shard.reload_pending.store(true, Ordering::Release);

        assert_eq!(shard.num_docs(), 1);
        assert!(!shard.reload_pending.load(Ordering::Acquire));
    }

    #[test]
    fn concurrent_upserts_of_one_key_leave_one_document() {
        let shard = Shard::in_memory("main").unwrap();

        thread::scope(|scope| {
            for i in 0..4 {
                let shard = &shard;
                scope.spawn(move || {
                    shard.upsert(&doc("same", &["lamp"], f64::from(i))).unwrap();
                });
            }
        });

        assert_eq!(shard.num_docs(), 1);
        assert_eq!(shard.estimated_count(&terms(&["lamp"])).unwrap(), 1);
    }
}
