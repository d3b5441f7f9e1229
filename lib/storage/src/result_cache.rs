//! Content-addressed cache of ranked recommendation lists

use crate::store::KeyValueStore;
use anyhow::Result;
use md5::{Digest, Md5};
use std::sync::Arc;
use storerank_core::RankedStore;
use tracing::{debug, warn};

/// Cache key for a raw query: lowercase hex MD5 of its UTF-8 bytes.
/// No normalization; case and whitespace matter.
pub fn cache_key(text: &str) -> String {
    format!("{:x}", Md5::digest(text.as_bytes()))
}

#[derive(Clone)]
pub struct ResultCache {
    store: Arc<dyn KeyValueStore>,
}

impl ResultCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn backend(&self) -> &'static str {
        self.store.name()
    }

    /// Cached results for `key`.
    ///
    /// A missing entry, an unreadable backend and an entry that does not
    /// decode all come back as `None`; the latter two are logged.
    pub fn get(&self, key: &str) -> Option<Vec<RankedStore>> {
        let bytes = match self.store.get(key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!(key, "Result cache miss");
                return None;
            }
            Err(e) => {
                warn!(
                    key,
                    backend = self.store.name(),
                    error = %e,
                    "Result cache read failed, recomputing"
                );
                return None;
            }
        };

        match serde_json::from_slice::<Vec<RankedStore>>(&bytes) {
            Ok(results) => {
                debug!(key, results = results.len(), "Result cache hit");
                Some(results)
            }
            Err(e) => {
                warn!(key, error = %e, "Corrupt result cache entry, recomputing");
                None
            }
        }
    }

    pub fn put(&self, key: &str, results: &[RankedStore]) -> Result<()> {
        let bytes = serde_json::to_vec(results)?;
        self.store.put(key, &bytes)?;
        debug!(key, results = results.len(), backend = self.store.name(), "Result cache write");
        Ok(())
    }

    /// [`ResultCache::get`] keyed by raw query text
    pub fn lookup(&self, text: &str) -> Option<Vec<RankedStore>> {
        self.get(&cache_key(text))
    }
}
