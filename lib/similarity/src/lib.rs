//! # storerank Similarity
//!
//! Scores store candidates against a query and ranks them.
//!
//! ## How scoring works
//!
//! For every `(token, frequency)` in a candidate's frequency table the
//! token's embedding is compared with every query-token embedding. If the
//! best cosine similarity reaches the threshold (0.98 by default) the
//! candidate earns `frequency` points. At such a high threshold this is a
//! near-exact-match accumulator weighted by how often the store's reviews
//! mention the token.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use storerank_core::{Candidate, FrequencyTable};
//! use storerank_embedding::{EmbeddingProvider, HashingModel};
//! use storerank_similarity::{top_k, SimilarityScorer, DEFAULT_TOP_K};
//!
//! let provider = EmbeddingProvider::new(Arc::new(HashingModel::new(64)));
//! let query = provider.embed(&["커피".to_string()]).unwrap();
//!
//! let a = Candidate::new("a", "{'주차': 4}".parse::<FrequencyTable>().unwrap()).with_position(0);
//! let b = Candidate::new("b", "{'커피': 3}".parse::<FrequencyTable>().unwrap()).with_position(1);
//!
//! let scorer = SimilarityScorer::default();
//! let scored = scorer.score_all(&query, &[&a, &b], &provider).unwrap();
//! let ranked = top_k(scored, DEFAULT_TOP_K);
//! assert_eq!(ranked[0].identifier, "b");
//! assert_eq!(ranked[0].score, 3.0);
//! ```

pub mod explain;
pub mod rank;
pub mod scorer;

pub use explain::{Explanation, TokenMatch};
pub use rank::{rank, top_k, ScoredCandidate, DEFAULT_TOP_K};
pub use scorer::{SimilarityScorer, DEFAULT_THRESHOLD};
