//! # storerank
//!
//! Ranks a catalog of retail stores against a free-text query.
//!
//! A query first goes through a content-addressed result cache. On a miss it
//! is tokenized, keyword rules narrow the catalog, and every remaining store
//! is scored by how often its reviews mention tokens whose embeddings match
//! a query token. The top 10 are returned and cached.
//!
//! ## Quick Start
//!
//! ### From the command line
//!
//! ```bash
//! storerank --config storerank.toml recommend "강남역 근처 주차 되는 리저브"
//! storerank --config storerank.toml serve
//! storerank stopwords --input reviews.txt
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use storerank::prelude::*;
//!
//! let mut cfg = Config::default();
//! cfg.catalog.path = "data/stores.csv".into();
//!
//! let recommender = Recommender::from_config(&cfg).unwrap();
//! let recommendation = recommender.recommend("해운대 바다 뷰").unwrap();
//! for store in &recommendation.results {
//!     println!("{}\t{}", store.identifier, store.score);
//! }
//! ```
//!
//! ## Crate Structure
//!
//! - `storerank-core` - catalog, frequency tables, filter rules, tokenizer
//! - `storerank-embedding` - embedding models and the token embedding cache
//! - `storerank-similarity` - threshold scoring, ranking, explanations
//! - `storerank-storage` - result cache over file, LMDB or memory stores
//! - `storerank-engine` - configuration and the recommendation pipeline
//! - `storerank-api` - REST surface

// Re-export core types
pub use storerank_core::{
    generate_stopwords, Candidate, CandidateFilter, Catalog, CatalogColumns, FrequencyTable,
    RankedStore, RejectedRecord, RuleTable, SegmentingTokenizer, Tokenizer, Vector,
};

// Re-export embedding
pub use storerank_embedding::{
    EmbeddingCache, EmbeddingModel, EmbeddingProvider, HashingModel, HttpModel,
};

// Re-export scoring
pub use storerank_similarity::{Explanation, SimilarityScorer};

// Re-export storage
pub use storerank_storage::{
    cache_key, FileStore, KeyValueStore, LmdbStore, MemoryStore, ResultCache,
};

// Re-export engine
pub use storerank_engine::{
    config, CatalogSource, Config, Error, Recommendation, Recommender, Result,
};

// Re-export API
pub use storerank_api::RestApi;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Candidate, CandidateFilter, Catalog, Config, EmbeddingModel, EmbeddingProvider, Error,
        FrequencyTable, HashingModel, RankedStore, Recommendation, Recommender, Result,
        ResultCache, RuleTable, Tokenizer,
    };
}
