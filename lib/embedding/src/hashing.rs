//! Feature-hashing embedding model.
//!
//! Needs no weights and no network, so it backs offline runs, tests and
//! benchmarks. Every character trigram of the token and the whole token are
//! hashed into buckets; identical tokens always map to identical vectors,
//! and tokens sharing sub-words land close to each other.

use crate::model::EmbeddingModel;
use crate::Result;
use md5::{Digest, Md5};
use storerank_core::Vector;

/// Default width, matching BERT-base hidden size
pub const DEFAULT_HASHING_DIM: usize = 768;

const WHOLE_TOKEN_WEIGHT: f32 = 2.0;

#[derive(Debug, Clone)]
pub struct HashingModel {
    dim: usize,
    id: String,
}

impl Default for HashingModel {
    fn default() -> Self {
        Self::new(DEFAULT_HASHING_DIM)
    }
}

impl HashingModel {
    pub fn new(dim: usize) -> Self {
        let dim = dim.max(1);
        Self {
            dim,
            id: format!("hashing-{}", dim),
        }
    }

    /// Embed one token. Pure function of `(token, dim)`.
    pub fn embed_token(&self, token: &str) -> Vector {
        let mut components = vec![0.0f32; self.dim];
        let lowered = token.to_lowercase();

        for gram in trigrams(&lowered) {
            components[self.bucket(&gram)] += 1.0;
        }
        components[self.bucket(&lowered)] += WHOLE_TOKEN_WEIGHT;

        let mut vector = Vector::new(components);
        vector.normalize();
        vector
    }

    fn bucket(&self, feature: &str) -> usize {
        // md5 keeps bucket assignment stable across processes and releases
        let digest = Md5::digest(feature.as_bytes());
        let mut word = [0u8; 8];
        word.copy_from_slice(&digest[..8]);
        (u64::from_le_bytes(word) % self.dim as u64) as usize
    }
}

impl EmbeddingModel for HashingModel {
    fn model_id(&self) -> &str {
        &self.id
    }

    fn dimension(&self) -> usize {
        self.dim
    }

    fn embed_batch(&self, tokens: &[String]) -> Result<Vec<Vector>> {
        Ok(tokens.iter().map(|t| self.embed_token(t)).collect())
    }
}

fn trigrams(s: &str) -> Vec<String> {
    let padded: Vec<char> = format!(" {} ", s).chars().collect();
    if padded.len() < 3 {
        return Vec::new();
    }
    padded.windows(3).map(|w| w.iter().collect()).collect()
}
