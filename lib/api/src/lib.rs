//! # storerank API
//!
//! HTTP surface over the recommender:
//!
//! - `POST /recommend` with `{"query": "...", "explain": false}`
//! - `GET /healthz`
//!
//! Empty queries answer `400`, an unreadable catalog or failing embedding
//! model answers `503`.

pub mod rest;

pub use rest::{routes, RestApi};
