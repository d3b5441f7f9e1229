//! # storerank Embedding
//!
//! Token embeddings for the storerank recommender.
//!
//! An [`EmbeddingModel`] turns a batch of tokens into fixed-width vectors.
//! [`EmbeddingProvider`] puts a process-wide [`EmbeddingCache`] in front of
//! it so each distinct token is embedded at most once per process.
//!
//! Two models ship with the crate:
//!
//! - [`HashingModel`] - deterministic feature hashing, no weights or network
//! - [`HttpModel`] - any OpenAI-compatible `/embeddings` server
//!
//! ```rust
//! use std::sync::Arc;
//! use storerank_embedding::{EmbeddingProvider, HashingModel};
//!
//! let provider = EmbeddingProvider::new(Arc::new(HashingModel::new(64)));
//! let vectors = provider.embed(&["커피".to_string(), "커피".to_string()]).unwrap();
//! assert_eq!(vectors[0].dim(), 64);
//! assert_eq!(provider.stats().model_calls, 1);
//! ```

pub mod cache;
pub mod error;
pub mod hashing;
pub mod http;
pub mod model;
pub mod provider;

pub use cache::EmbeddingCache;
pub use error::{Error, Result};
pub use hashing::{HashingModel, DEFAULT_HASHING_DIM};
pub use http::{HttpModel, HttpModelConfig};
pub use model::EmbeddingModel;
pub use provider::{EmbeddingProvider, ProviderStats, DEFAULT_BATCH_SIZE};
