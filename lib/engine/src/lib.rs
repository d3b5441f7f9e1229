//! # storerank Engine
//!
//! The recommendation pipeline: configuration, catalog sources and the
//! [`Recommender`] that sequences result cache, tokenizer, embeddings,
//! filter and scorer.
//!
//! ```rust,no_run
//! use std::path::Path;
//! use storerank_engine::{config, Recommender};
//!
//! let cfg = config::load(Path::new("storerank.toml"))?;
//! let recommender = Recommender::from_config(&cfg)?;
//! for store in recommender.recommend("강남역 근처 주차 되는 리저브")?.results {
//!     println!("{} {}", store.identifier, store.score);
//! }
//! # Ok::<(), storerank_engine::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod recommender;
pub mod source;

pub use config::Config;
pub use error::{Error, Result};
pub use recommender::{Recommendation, Recommender};
pub use source::{CatalogSource, CsvCatalogSource, StaticCatalogSource};
