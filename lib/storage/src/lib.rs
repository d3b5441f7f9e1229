//! # storerank Storage
//!
//! Persistence for computed recommendations.
//!
//! [`ResultCache`] maps the MD5 of a raw query to its ranked list. Entries
//! never expire. The bytes live in any [`KeyValueStore`]:
//!
//! - [`FileStore`] - one `<key>.json` file per entry, written atomically
//! - [`LmdbStore`] - a single LMDB environment
//! - [`MemoryStore`] - process-local map, for tests and ephemeral runs

pub mod file_store;
pub mod lmdb_storage;
pub mod memory;
pub mod result_cache;
pub mod store;

pub use file_store::FileStore;
pub use lmdb_storage::LmdbStore;
pub use memory::MemoryStore;
pub use result_cache::{cache_key, ResultCache};
pub use store::KeyValueStore;
