//! Recommendation orchestrator
//!
//! ```text
//! query ─> result cache ──hit──────────────────────────────────────────> results
//!               │miss
//!               v
//!          tokenize ─(no tokens)─> InvalidQuery
//!               │
//!               v
//!          load catalog ─> embed query ─> filter ─> score ─> rank/top-K ─> cache put ─> results
//! ```

use crate::config::{CacheBackend, Config, ProviderKind};
use crate::source::{CatalogSource, CsvCatalogSource};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use storerank_core::{CandidateFilter, RankedStore, RuleTable, SegmentingTokenizer, Tokenizer};
use storerank_embedding::{
    EmbeddingModel, EmbeddingProvider, HashingModel, HttpModel, HttpModelConfig, ProviderStats,
};
use storerank_similarity::{rank, Explanation, ScoredCandidate, SimilarityScorer, DEFAULT_TOP_K};
use storerank_storage::{cache_key, FileStore, KeyValueStore, LmdbStore, MemoryStore, ResultCache};
use tracing::{debug, info, warn};

/// Outcome of one `recommend` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Up to `top_k` stores, best first
    pub results: Vec<RankedStore>,
    /// Served from the result cache without touching the catalog
    pub cached: bool,
    /// Catalog rows dropped as malformed while loading for this request
    pub skipped_records: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanations: Option<Vec<Explanation>>,
}

pub struct Recommender {
    catalog: Arc<dyn CatalogSource>,
    tokenizer: Arc<dyn Tokenizer>,
    filter: Arc<dyn CandidateFilter>,
    provider: Arc<EmbeddingProvider>,
    cache: ResultCache,
    scorer: SimilarityScorer,
    top_k: usize,
    max_attempts: u32,
}

impl Recommender {
    pub fn new(
        catalog: Arc<dyn CatalogSource>,
        tokenizer: Arc<dyn Tokenizer>,
        filter: Arc<dyn CandidateFilter>,
        provider: Arc<EmbeddingProvider>,
        cache: ResultCache,
    ) -> Self {
        Self {
            catalog,
            tokenizer,
            filter,
            provider,
            cache,
            scorer: SimilarityScorer::default(),
            top_k: DEFAULT_TOP_K,
            max_attempts: 1,
        }
    }

    /// Wire every component from configuration.
    pub fn from_config(cfg: &Config) -> Result<Self> {
        let embedding = &cfg.embedding;
        let model: Arc<dyn EmbeddingModel> = match embedding.provider {
            ProviderKind::Hashing => Arc::new(HashingModel::new(embedding.dimensions)),
            ProviderKind::Http => {
                let http = HttpModel::new(&HttpModelConfig {
                    api_base: embedding.api_base.clone(),
                    path: embedding.path.clone(),
                    model: embedding.model.clone(),
                    api_key: embedding.api_key.clone(),
                    dimensions: embedding.dimensions,
                    timeout_ms: embedding.timeout_ms,
                })
                .map_err(|e| Error::Config {
                    message: e.to_string(),
                })?;
                Arc::new(http)
            }
        };
        let provider =
            Arc::new(EmbeddingProvider::new(model).with_batch_size(embedding.batch_size));

        let store: Arc<dyn KeyValueStore> = match cfg.cache.backend {
            CacheBackend::Files => Arc::new(FileStore::new(&cfg.cache.dir)),
            CacheBackend::Lmdb => {
                Arc::new(LmdbStore::new(&cfg.cache.dir).map_err(|e| Error::Storage {
                    message: format!("{:#}", e),
                })?)
            }
            CacheBackend::Memory => Arc::new(MemoryStore::new()),
        };

        let rules = match &cfg.filter.rules_path {
            Some(path) => RuleTable::from_path(path),
            None => RuleTable::builtin(),
        }
        .map_err(|e| Error::Config {
            message: format!("filter rules: {}", e),
        })?;

        let tokenizer = SegmentingTokenizer::new(
            cfg.tokenizer.stopwords.iter().cloned(),
            cfg.tokenizer.min_chars,
        );
        let catalog = CsvCatalogSource::new(&cfg.catalog.path, cfg.catalog.columns.clone());

        info!(
            catalog = %catalog.describe(),
            model = provider.model().model_id(),
            cache = store.name(),
            rules = rules.len(),
            "Recommender ready"
        );

        Ok(Self::new(
            Arc::new(catalog),
            Arc::new(tokenizer),
            Arc::new(rules),
            provider,
            ResultCache::new(store),
        )
        .with_scorer(
            SimilarityScorer::new(cfg.scoring.threshold).with_parallel(cfg.scoring.parallel),
        )
        .with_top_k(cfg.scoring.top_k)
        .with_max_attempts(embedding.max_attempts))
    }

    pub fn with_scorer(mut self, scorer: SimilarityScorer) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    /// Total embedding attempts per request, clamped to `1..=MAX_EMBEDDING_ATTEMPTS`
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.clamp(1, crate::config::MAX_EMBEDDING_ATTEMPTS);
        self
    }

    pub fn embedding_stats(&self) -> ProviderStats {
        self.provider.stats()
    }

    pub fn catalog_source(&self) -> &dyn CatalogSource {
        self.catalog.as_ref()
    }

    /// Ranked stores for `text`, from the result cache when possible.
    pub fn recommend(&self, text: &str) -> Result<Recommendation> {
        let key = cache_key(text);
        if let Some(results) = self.cache.get(&key) {
            info!(key = %key, results = results.len(), "Served recommendation from cache");
            return Ok(Recommendation {
                results,
                cached: true,
                skipped_records: 0,
                explanations: None,
            });
        }
        self.compute(text, &key, false)
    }

    /// Always recomputes and attaches per-store token matches. The plain
    /// ranking is still written to the result cache.
    pub fn recommend_explained(&self, text: &str) -> Result<Recommendation> {
        self.compute(text, &cache_key(text), true)
    }

    fn compute(&self, text: &str, key: &str, explain: bool) -> Result<Recommendation> {
        let started = Instant::now();

        let tokens = self.tokenizer.nouns(text);
        if tokens.is_empty() {
            debug!(key, "Query normalized to no tokens");
            return Err(Error::InvalidQuery);
        }
        debug!(key, tokens = ?tokens, "Normalized query");

        let catalog = self
            .catalog
            .load()
            .map_err(|source| Error::CatalogUnavailable { source })?;

        let query = self.with_retry(|| self.provider.embed(&tokens))?;

        let filtered = self.filter.filter(text, catalog.candidates());
        debug!(
            catalog = catalog.len(),
            filtered = filtered.len(),
            "Filtered candidates"
        );

        let scored = self.with_retry(|| self.scorer.score_all(&query, &filtered, &self.provider))?;
        let ranked: Vec<ScoredCandidate<'_>> = rank(scored, self.top_k);
        let results: Vec<RankedStore> = ranked.iter().map(ScoredCandidate::to_ranked).collect();

        let explanations = if explain {
            let explained = ranked
                .iter()
                .map(|s| self.scorer.explain(&query, s.candidate, &self.provider))
                .collect::<storerank_embedding::Result<Vec<_>>>()
                .map_err(|source| Error::EmbeddingProvider {
                    attempts: 1,
                    source,
                })?;
            Some(explained)
        } else {
            None
        };

        if let Err(e) = self.cache.put(key, &results) {
            warn!(key, error = %e, "Failed to write result cache");
        }

        info!(
            key,
            candidates = filtered.len(),
            results = results.len(),
            skipped = catalog.rejected().len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Computed recommendation"
        );

        Ok(Recommendation {
            results,
            cached: false,
            skipped_records: catalog.rejected().len(),
            explanations,
        })
    }

    /// Run an embedding step up to `max_attempts` times.
    fn with_retry<T, F>(&self, mut op: F) -> Result<T>
    where
        F: FnMut() -> storerank_embedding::Result<T>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match op() {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.max_attempts => {
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %e,
                        "Embedding failed, retrying"
                    );
                }
                Err(source) => {
                    return Err(Error::EmbeddingProvider {
                        attempts: attempt,
                        source,
                    })
                }
            }
        }
    }
}
