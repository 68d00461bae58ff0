//! Conjunctive keyword queries over one or more shards.
//!
//! A raw query string is split on whitespace and every token is normalized with
//! the same [`TextNormalizer`] used at index time. The resulting term set is a
//! conjunction: a document matches only if it contains every term.

use rayon::prelude::*;
use tracing::debug;

use crate::{
    analyzer::{TermSet, TextNormalizer},
    error::IndexError,
    shard::{Shard, ShardHit, ShardSnapshot},
};

/// A parsed query: the set of terms every match must contain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuery {
    /// Required normalized terms.
    terms: TermSet,
}

impl ParsedQuery {
    /// The required terms.
    pub fn terms(&self) -> &TermSet {
        &self.terms
    }

    /// Returns true when the query requires no terms and so matches nothing.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Matches found in one shard, with the snapshot they were read from.
pub struct ShardMatches<'a> {
    /// Snapshot used for the lookup; later fetches use the same state.
    pub snapshot: ShardSnapshot<'a>,
    /// Matching documents ordered by identity key.
    pub hits: Vec<ShardHit>,
}

impl ShardMatches<'_> {
    /// Number of matches in this shard.
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    /// Returns true when the shard had no matches.
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

/// Parses query strings and evaluates them against shards.
#[derive(Clone, Default)]
pub struct QueryEngine {
    /// Normalizer shared with the index writer.
    normalizer: TextNormalizer,
}

impl QueryEngine {
    /// Creates a query engine using the given normalizer.
    pub fn new(normalizer: TextNormalizer) -> Self {
        Self { normalizer }
    }

    /// Parses a raw query into its conjunctive term requirement.
    ///
    /// Never fails: an empty or punctuation-only query yields an empty requirement.
    pub fn parse(&self, raw: &str) -> ParsedQuery {
        let terms = raw
            .split_whitespace()
            .flat_map(|token| self.normalizer.normalize(token))
            .collect();
        ParsedQuery { terms }
    }

    /// Evaluates a query against every shard, in shard order.
    ///
    /// Shards are queried in parallel; the result keeps the order of `shards`.
    /// Matches are not deduplicated across shards.
    pub fn evaluate<'a>(
        &self,
        query: &ParsedQuery,
        shards: &'a [Shard],
    ) -> Result<Vec<ShardMatches<'a>>, IndexError> {
        let matches = shards
            .par_iter()
            .map(|shard| -> Result<ShardMatches<'a>, IndexError> {
                let snapshot = shard.snapshot();
                let hits = snapshot.matches(&query.terms)?;
                Ok(ShardMatches { snapshot, hits })
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            terms = ?query.terms,
            shards = shards.len(),
            matches = matches.iter().map(ShardMatches::len).sum::<usize>(),
            "evaluated query"
        );
        Ok(matches)
    }

    /// Sums the per-shard match counts for a query.
    pub fn estimated_count(
        &self,
        query: &ParsedQuery,
        shards: &[Shard],
    ) -> Result<usize, IndexError> {
        shards
            .par_iter()
            .map(|shard| shard.estimated_count(&query.terms))
            .try_reduce(|| 0, |a, b| Ok(a + b))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{IndexWriter, Product};

    fn product(url: &str, text: &str) -> Product {
        Product::builder()
            .title(text)
            .url(url)
            .image_url("img")
            .description("")
            .price("1.00")
            .build()
            .unwrap()
    }

    fn terms(words: &[&str]) -> TermSet {
        words.iter().map(|w| (*w).to_string()).collect()
    }

    #[test]
    fn parse_normalizes_each_token() {
        let engine = QueryEngine::default();
        let query = engine.parse("  Heading   TEXTS worms ");
        assert_eq!(query.terms(), &terms(&["head", "text", "worm"]));
    }

    #[test]
    fn parse_empty_query() {
        let engine = QueryEngine::default();
        assert!(engine.parse("").is_empty());
        assert!(engine.parse("   ").is_empty());
        assert!(engine.parse("!! --").is_empty());
    }

    #[test]
    fn evaluate_keeps_shard_order_without_dedup() {
        let engine = QueryEngine::default();
        let writer = IndexWriter::default();
        let shards = vec![
            Shard::in_memory("first").unwrap(),
            Shard::in_memory("second").unwrap(),
            Shard::in_memory("third").unwrap(),
        ];
        writer.write(&shards[0], &product("u", "lamp")).unwrap();
        writer.write(&shards[2], &product("u", "lamp")).unwrap();

        let matches = engine.evaluate(&engine.parse("lamp"), &shards).unwrap();
        let names: Vec<_> = matches.iter().map(|m| m.snapshot.shard().name()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
        let counts: Vec<_> = matches.iter().map(ShardMatches::len).collect();
        assert_eq!(counts, vec![1, 0, 1]);

        assert_eq!(engine.estimated_count(&engine.parse("lamp"), &shards).unwrap(), 2);
    }

    #[test]
    fn partial_term_matches_do_not_qualify() {
        let engine = QueryEngine::default();
        let writer = IndexWriter::default();
        let shards = vec![Shard::in_memory("main").unwrap()];
        writer.write(&shards[0], &product("u", "heading text")).unwrap();

        let full = engine.evaluate(&engine.parse("heading text"), &shards).unwrap();
        assert_eq!(full[0].len(), 1);

        let extra = engine
            .evaluate(&engine.parse("heading text worm"), &shards)
            .unwrap();
        assert!(extra[0].is_empty());
    }
}
