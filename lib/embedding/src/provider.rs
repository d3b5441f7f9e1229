use crate::cache::EmbeddingCache;
use crate::model::EmbeddingModel;
use crate::{Error, Result};
use ahash::AHashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use storerank_core::Vector;
use tracing::debug;

pub const DEFAULT_BATCH_SIZE: usize = 64;

/// Counters describing how much work reached the model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProviderStats {
    pub model_calls: u64,
    pub tokens_embedded: u64,
}

/// Cache-fronted access to an [`EmbeddingModel`].
///
/// Only tokens absent from the cache are sent to the model, deduplicated
/// and split into chunks of at most `batch_size`. A failed chunk leaves
/// the cache holding whatever earlier chunks produced and nothing else.
pub struct EmbeddingProvider {
    model: Arc<dyn EmbeddingModel>,
    cache: Arc<EmbeddingCache>,
    batch_size: usize,
    model_calls: AtomicU64,
    tokens_embedded: AtomicU64,
}

impl EmbeddingProvider {
    pub fn new(model: Arc<dyn EmbeddingModel>) -> Self {
        Self::with_cache(model, Arc::new(EmbeddingCache::new()))
    }

    pub fn with_cache(model: Arc<dyn EmbeddingModel>, cache: Arc<EmbeddingCache>) -> Self {
        Self {
            model,
            cache,
            batch_size: DEFAULT_BATCH_SIZE,
            model_calls: AtomicU64::new(0),
            tokens_embedded: AtomicU64::new(0),
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn model(&self) -> &dyn EmbeddingModel {
        self.model.as_ref()
    }

    pub fn cache(&self) -> &Arc<EmbeddingCache> {
        &self.cache
    }

    pub fn dimension(&self) -> usize {
        self.model.dimension()
    }

    pub fn stats(&self) -> ProviderStats {
        ProviderStats {
            model_calls: self.model_calls.load(Ordering::Relaxed),
            tokens_embedded: self.tokens_embedded.load(Ordering::Relaxed),
        }
    }

    /// Cached vector for `token`, if any. Never calls the model.
    pub fn lookup(&self, token: &str) -> Option<Arc<Vector>> {
        self.cache.get(token)
    }

    /// Embed `tokens`, returning one vector per input in input order.
    pub fn embed(&self, tokens: &[String]) -> Result<Vec<Arc<Vector>>> {
        self.prefetch(tokens.iter().map(String::as_str))?;
        tokens
            .iter()
            .map(|token| {
                self.cache.get(token).ok_or_else(|| Error::Model {
                    message: format!("no embedding cached for token {:?}", token),
                })
            })
            .collect()
    }

    /// Make sure every token in `tokens` is cached. Returns the number of
    /// tokens that had to be sent to the model.
    pub fn prefetch<'a, I>(&self, tokens: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut seen = AHashSet::new();
        let misses: Vec<String> = tokens
            .into_iter()
            .filter(|token| seen.insert(*token))
            .filter(|token| !self.cache.contains(token))
            .map(str::to_string)
            .collect();

        if misses.is_empty() {
            return Ok(0);
        }

        let expected_dim = self.model.dimension();
        for chunk in misses.chunks(self.batch_size) {
            debug!(
                model = self.model.model_id(),
                batch = chunk.len(),
                "Embedding cache misses"
            );
            self.model_calls.fetch_add(1, Ordering::Relaxed);
            let vectors = self.model.embed_batch(chunk)?;
            if vectors.len() != chunk.len() {
                return Err(Error::InvalidResponse {
                    message: format!(
                        "model returned {} vectors for {} tokens",
                        vectors.len(),
                        chunk.len()
                    ),
                });
            }
            if let Some(bad) = vectors.iter().find(|v| v.dim() != expected_dim) {
                return Err(Error::InvalidResponse {
                    message: format!(
                        "model returned a {}-dimensional vector, expected {}",
                        bad.dim(),
                        expected_dim
                    ),
                });
            }
            for (token, vector) in chunk.iter().zip(vectors) {
                self.cache.insert(token.clone(), vector);
            }
            self.tokens_embedded
                .fetch_add(chunk.len() as u64, Ordering::Relaxed);
        }

        Ok(misses.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashing::HashingModel;
    use parking_lot::Mutex;

    struct RecordingModel {
        inner: HashingModel,
        batches: Mutex<Vec<Vec<String>>>,
        fail: bool,
    }

    impl RecordingModel {
        fn new(fail: bool) -> Self {
            Self {
                inner: HashingModel::new(16),
                batches: Mutex::new(Vec::new()),
                fail,
            }
        }
    }

    impl EmbeddingModel for RecordingModel {
        fn model_id(&self) -> &str {
            "recording"
        }

        fn dimension(&self) -> usize {
            self.inner.dimension()
        }

        fn embed_batch(&self, tokens: &[String]) -> Result<Vec<Vector>> {
            self.batches.lock().push(tokens.to_vec());
            if self.fail {
                return Err(Error::Model {
                    message: "out of memory".to_string(),
                });
            }
            self.inner.embed_batch(tokens)
        }
    }

    fn tokens(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_only_misses_reach_the_model() {
        let model = Arc::new(RecordingModel::new(false));
        let provider = EmbeddingProvider::new(model.clone());

        provider.embed(&tokens(&["커피", "디저트"])).unwrap();
        let out = provider.embed(&tokens(&["커피", "케이크", "커피"])).unwrap();

        assert_eq!(out.len(), 3);
        assert!(Arc::ptr_eq(&out[0], &out[2]));
        let batches = model.batches.lock();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[1], tokens(&["케이크"]));
        assert_eq!(provider.stats().tokens_embedded, 3);
    }

    #[test]
    fn test_fully_cached_call_skips_model() {
        let model = Arc::new(RecordingModel::new(false));
        let provider = EmbeddingProvider::new(model.clone());
        provider.embed(&tokens(&["라떼"])).unwrap();
        provider.embed(&tokens(&["라떼", "라떼"])).unwrap();
        assert_eq!(provider.stats().model_calls, 1);
    }

    #[test]
    fn test_batches_are_chunked() {
        let model = Arc::new(RecordingModel::new(false));
        let provider = EmbeddingProvider::new(model.clone()).with_batch_size(2);
        let n = provider
            .prefetch(["a", "b", "c", "d", "e"].iter().copied())
            .unwrap();
        assert_eq!(n, 5);
        let sizes: Vec<usize> = model.batches.lock().iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![2, 2, 1]);
    }

    #[test]
    fn test_failure_caches_nothing() {
        let model = Arc::new(RecordingModel::new(true));
        let provider = EmbeddingProvider::new(model);
        assert!(provider.embed(&tokens(&["커피"])).is_err());
        assert!(provider.cache().is_empty());
        assert!(provider.lookup("커피").is_none());
    }

    #[test]
    fn test_empty_input() {
        let model = Arc::new(RecordingModel::new(false));
        let provider = EmbeddingProvider::new(model.clone());
        assert!(provider.embed(&[]).unwrap().is_empty());
        assert_eq!(provider.stats().model_calls, 0);
    }
}
