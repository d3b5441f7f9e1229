use crate::Result;
use storerank_core::Vector;

/// A frozen text-embedding model.
///
/// `embed_batch` returns exactly one vector per input token, in input
/// order, each of length [`EmbeddingModel::dimension`]. Unknown tokens
/// still produce a vector; only transport or resource failures are errors.
pub trait EmbeddingModel: Send + Sync {
    fn model_id(&self) -> &str;

    fn dimension(&self) -> usize;

    fn embed_batch(&self, tokens: &[String]) -> Result<Vec<Vector>>;
}
