//! # storerank Core
//!
//! Core library for the storerank recommender.
//!
//! This crate provides the data model and the leaf components:
//!
//! - [`Vector`] - Dense embedding vector with SIMD cosine similarity
//! - [`Candidate`] - One store record with attribute flags and a [`FrequencyTable`]
//! - [`Catalog`] - CSV catalog loader with per-row rejection of malformed records
//! - [`RuleTable`] - Declarative keyword -> attribute filter, see [`CandidateFilter`]
//! - [`Tokenizer`] - Query normalization seam, with [`SegmentingTokenizer`] as fallback
//!
//! ## Example
//!
//! ```rust
//! use storerank_core::{Candidate, Catalog, CandidateFilter, FrequencyTable, RuleTable};
//!
//! let catalog = Catalog::from_candidates(vec![
//!     Candidate::new("강남R점", "{'커피': 3}".parse::<FrequencyTable>().unwrap())
//!         .with_address("서울특별시 강남구")
//!         .with_store_type("리저브"),
//!     Candidate::new("해운대점", FrequencyTable::new())
//!         .with_address("부산광역시 해운대구")
//!         .with_store_type("일반"),
//! ]);
//!
//! let rules = RuleTable::builtin().unwrap();
//! let hits = rules.filter("리저브 매장", catalog.candidates());
//! assert_eq!(hits.len(), 1);
//! ```

pub mod candidate;
pub mod catalog;
pub mod error;
pub mod filter;
pub mod frequency;
pub mod tokenize;
pub mod vector;

/// SIMD-optimized vector kernels
///
/// - AVX2/FMA on x86_64
/// - NEON on ARM64/Apple Silicon
/// - two-accumulator scalar loop elsewhere
pub mod simd;

pub use candidate::{Candidate, RankedStore};
pub use catalog::{Catalog, CatalogColumns, RejectedRecord};
pub use error::{Error, Result};
pub use filter::{CandidateFilter, Condition, FilterRule, RuleTable};
pub use frequency::FrequencyTable;
pub use tokenize::{generate_stopwords, SegmentingTokenizer, Tokenizer};
pub use vector::Vector;
