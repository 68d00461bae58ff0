//! The product repository facade.
//!
//! A [`ProductRepository`] owns a fixed, ordered set of shards. Writes go to one
//! shard (named, or the default); searches read every shard and merge the
//! matches as if they came from a single index.

use std::path::PathBuf;

use prodcomp_config::{Config, DEFAULT_PAGE_SIZE, Settings};
use tracing::{debug, info};

use crate::{
    aggregate::{ResultAggregator, SearchParams, SearchResult},
    analyzer::TextNormalizer,
    error::IndexError,
    product::Product,
    query::QueryEngine,
    shard::Shard,
    writer::IndexWriter,
};

/// Construction options for a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryOptions {
    /// Products per result page.
    pub page_size: usize,
    /// Stemming language for index and query terms.
    pub stemmer: String,
    /// Shard receiving untargeted writes; the first shard when `None`.
    pub default_shard: Option<String>,
}

impl Default for RepositoryOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            stemmer: "english".to_string(),
            default_shard: None,
        }
    }
}

impl From<&Settings> for RepositoryOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            page_size: settings.page_size,
            stemmer: settings.stemmer.clone(),
            default_shard: settings.default_shard.clone(),
        }
    }
}

/// A federated product catalog over one or more shards.
pub struct ProductRepository {
    /// Shards in merge order.
    shards: Vec<Shard>,
    /// Index into `shards` of the default write target.
    default_shard: usize,
    /// Builds and writes documents.
    writer: IndexWriter,
    /// Parses and evaluates queries.
    engine: QueryEngine,
    /// Orders and paginates matches.
    aggregator: ResultAggregator,
}

impl ProductRepository {
    /// Opens every shard named by a configuration.
    pub fn open(config: &Config) -> Result<Self, IndexError> {
        config
            .validate()
            .map_err(|e| IndexError::InvalidRepository(e.to_string()))?;

        let shards = config
            .shards
            .iter()
            .map(|sc| Shard::open(&sc.name, &sc.path))
            .collect::<Result<Vec<_>, _>>()?;

        Self::with_shards(shards, RepositoryOptions::from(&config.settings))
    }

    /// Opens a repository over one or more shard directories.
    ///
    /// A single path yields a shard named `default`; several paths yield shards
    /// named after their final path component.
    pub fn open_paths(paths: &[PathBuf], options: RepositoryOptions) -> Result<Self, IndexError> {
        let mut config =
            Config::for_paths(paths).map_err(|e| IndexError::InvalidRepository(e.to_string()))?;
        config.settings.page_size = options.page_size;
        config.settings.stemmer = options.stemmer;
        config.settings.default_shard = options.default_shard;
        Self::open(&config)
    }

    /// Builds a repository from already opened shards.
    pub fn with_shards(shards: Vec<Shard>, options: RepositoryOptions) -> Result<Self, IndexError> {
        if shards.is_empty() {
            return Err(IndexError::InvalidRepository(
                "at least one shard is required".to_string(),
            ));
        }
        for (i, shard) in shards.iter().enumerate() {
            if shards[..i].iter().any(|s| s.name() == shard.name()) {
                return Err(IndexError::InvalidRepository(format!(
                    "duplicate shard name '{}'",
                    shard.name()
                )));
            }
        }

        let default_shard = match &options.default_shard {
            Some(name) => shards
                .iter()
                .position(|s| s.name() == name)
                .ok_or_else(|| IndexError::UnknownShard(name.clone()))?,
            None => 0,
        };

        let normalizer = TextNormalizer::from_name(&options.stemmer)?;
        let aggregator = ResultAggregator::new(options.page_size)?;

        info!(
            shards = shards.len(),
            default = shards[default_shard].name(),
            page_size = options.page_size,
            "repository ready"
        );

        Ok(Self {
            shards,
            default_shard,
            writer: IndexWriter::new(normalizer.clone()),
            engine: QueryEngine::new(normalizer),
            aggregator,
        })
    }

    /// Adds or replaces a product in the default shard.
    pub fn add_product(&self, product: &Product) -> Result<(), IndexError> {
        self.writer.write(self.default_shard(), product)
    }

    /// Adds or replaces a product in the named shard.
    pub fn add_product_to(&self, product: &Product, shard: &str) -> Result<(), IndexError> {
        let target = self
            .shard(shard)
            .ok_or_else(|| IndexError::UnknownShard(shard.to_string()))?;
        self.writer.write(target, product)
    }

    /// Adds each product to the default shard, returning how many were written.
    ///
    /// Products are committed one at a time; on failure the earlier products
    /// stay written.
    pub fn add_products<'p>(
        &self,
        products: impl IntoIterator<Item = &'p Product>,
    ) -> Result<usize, IndexError> {
        let mut written = 0;
        for product in products {
            self.add_product(product)?;
            written += 1;
        }
        debug!(written, shard = self.default_shard().name(), "added products");
        Ok(written)
    }

    /// Returns the first page of matches in default order.
    pub fn search(&self, query: &str) -> Result<SearchResult, IndexError> {
        self.search_with(query, &SearchParams::default())
    }

    /// Returns one page of matches for a query.
    pub fn search_with(
        &self,
        query: &str,
        params: &SearchParams,
    ) -> Result<SearchResult, IndexError> {
        let parsed = self.engine.parse(query);
        if parsed.is_empty() {
            debug!(query, "query has no terms");
            return Ok(SearchResult::empty());
        }

        let matches = self.engine.evaluate(&parsed, &self.shards)?;
        let result = self.aggregator.aggregate(&matches, params)?;
        debug!(
            query,
            page = params.page,
            sort_by_price = params.sort_by_price,
            page_count = result.page_count,
            returned = result.products.len(),
            "search complete"
        );
        Ok(result)
    }

    /// Counts matches for a query across all shards.
    pub fn count(&self, query: &str) -> Result<usize, IndexError> {
        let parsed = self.engine.parse(query);
        self.engine.estimated_count(&parsed, &self.shards)
    }

    /// Shards in merge order.
    pub fn shards(&self) -> &[Shard] {
        &self.shards
    }

    /// Looks up a shard by name.
    pub fn shard(&self, name: &str) -> Option<&Shard> {
        self.shards.iter().find(|s| s.name() == name)
    }

    /// The shard receiving untargeted writes.
    pub fn default_shard(&self) -> &Shard {
        &self.shards[self.default_shard]
    }

    /// Products per result page.
    pub fn page_size(&self) -> usize {
        self.aggregator.page_size()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn shards(names: &[&str]) -> Vec<Shard> {
        names.iter().map(|n| Shard::in_memory(n).unwrap()).collect()
    }

    fn product(url: &str) -> Product {
        Product::builder()
            .title("desk lamp")
            .url(url)
            .image_url("img")
            .description("")
            .price("5")
            .build()
            .unwrap()
    }

    #[test]
    fn repository_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ProductRepository>();
    }

    #[test]
    fn requires_a_shard() {
        let err = ProductRepository::with_shards(Vec::new(), RepositoryOptions::default())
            .err()
            .unwrap();
        assert!(matches!(err, IndexError::InvalidRepository(_)));
    }

    #[test]
    fn rejects_duplicate_shard_names() {
        let err = ProductRepository::with_shards(shards(&["a", "a"]), RepositoryOptions::default())
            .err()
            .unwrap();
        assert!(matches!(err, IndexError::InvalidRepository(_)));
    }

    #[test]
    fn rejects_zero_page_size() {
        let options = RepositoryOptions {
            page_size: 0,
            ..RepositoryOptions::default()
        };
        assert!(ProductRepository::with_shards(shards(&["a"]), options).is_err());
    }

    #[test]
    fn rejects_unknown_stemmer() {
        let options = RepositoryOptions {
            stemmer: "klingon".to_string(),
            ..RepositoryOptions::default()
        };
        let err = ProductRepository::with_shards(shards(&["a"]), options)
            .err()
            .unwrap();
        assert!(matches!(err, IndexError::InvalidLanguage(_)));
    }

    #[test]
    fn default_shard_is_first_unless_named() {
        let repo =
            ProductRepository::with_shards(shards(&["a", "b"]), RepositoryOptions::default())
                .unwrap();
        assert_eq!(repo.default_shard().name(), "a");

        let options = RepositoryOptions {
            default_shard: Some("b".to_string()),
            ..RepositoryOptions::default()
        };
        let repo = ProductRepository::with_shards(shards(&["a", "b"]), options).unwrap();
        assert_eq!(repo.default_shard().name(), "b");
        repo.add_product(&product("u")).unwrap();
        assert_eq!(repo.shard("b").unwrap().num_docs(), 1);
        assert_eq!(repo.shard("a").unwrap().num_docs(), 0);
    }

    #[test]
    fn unknown_default_shard_is_rejected() {
        let options = RepositoryOptions {
            default_shard: Some("missing".to_string()),
            ..RepositoryOptions::default()
        };
        let err = ProductRepository::with_shards(shards(&["a"]), options)
            .err()
            .unwrap();
        assert!(matches!(err, IndexError::UnknownShard(_)));
    }

    #[test]
    fn count_sums_over_shards() {
        let repo =
            ProductRepository::with_shards(shards(&["a", "b"]), RepositoryOptions::default())
                .unwrap();
        repo.add_product_to(&product("u"), "a").unwrap();
        repo.add_product_to(&product("u"), "b").unwrap();
        repo.add_product_to(&product("v"), "b").unwrap();

        assert_eq!(repo.count("lamp").unwrap(), 3);
        assert_eq!(repo.count("").unwrap(), 0);
    }
}
