use ahash::AHashMap;
use parking_lot::RwLock;
use std::sync::Arc;
use storerank_core::Vector;

/// Process-wide token -> embedding map.
///
/// Append-only: once a token has a vector, later inserts for the same token
/// are ignored, so concurrent readers never observe a value change.
#[derive(Debug, Default)]
pub struct EmbeddingCache {
    entries: RwLock<AHashMap<String, Arc<Vector>>>,
}

impl EmbeddingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, token: &str) -> Option<Arc<Vector>> {
        self.entries.read().get(token).cloned()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.entries.read().contains_key(token)
    }

    /// Insert unless present. Returns the vector that ends up cached.
    pub fn insert(&self, token: String, vector: Vector) -> Arc<Vector> {
        let mut entries = self.entries.write();
        entries
            .entry(token)
            .or_insert_with(|| Arc::new(vector))
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
