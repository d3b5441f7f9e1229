//! Threshold similarity scoring
//!
//! A candidate's score is the sum of the frequencies of those of its tokens
//! whose best cosine similarity against any query token reaches the
//! threshold. Tokens below the threshold contribute nothing.

use crate::explain::{Explanation, TokenMatch};
use crate::rank::ScoredCandidate;
use rayon::prelude::*;
use std::sync::Arc;
use storerank_core::{Candidate, Vector};
use storerank_embedding::{EmbeddingProvider, Result};
use tracing::trace;

/// Cosine similarity a candidate token needs to count as a match
pub const DEFAULT_THRESHOLD: f32 = 0.98;

/// Scores candidates against a query's token embeddings
#[derive(Debug, Clone, Copy)]
pub struct SimilarityScorer {
    threshold: f32,
    parallel: bool,
}

impl Default for SimilarityScorer {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl SimilarityScorer {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            parallel: true,
        }
    }

    /// Score candidates on the rayon pool (default) or sequentially
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Best similarity of `token_vector` against the query, if it reaches
    /// the threshold.
    #[inline]
    fn best_match(&self, query: &[Arc<Vector>], token_vector: &Vector) -> Option<f32> {
        token_vector
            .max_cosine(query.iter().map(|v| v.as_ref()))
            .filter(|sim| *sim >= self.threshold)
    }

    /// Score one candidate. Candidate tokens missing from the provider's
    /// cache are embedded on the way.
    pub fn score(
        &self,
        query: &[Arc<Vector>],
        candidate: &Candidate,
        provider: &EmbeddingProvider,
    ) -> Result<f64> {
        provider.prefetch(candidate.frequency.tokens())?;
        Ok(self.score_cached(query, candidate, provider))
    }

    /// Score one candidate from vectors already in the provider's cache.
    /// Tokens without a cached vector contribute zero.
    pub fn score_cached(
        &self,
        query: &[Arc<Vector>],
        candidate: &Candidate,
        provider: &EmbeddingProvider,
    ) -> f64 {
        let mut score = 0.0f64;
        for (token, freq) in candidate.frequency.iter() {
            let Some(vector) = provider.lookup(token) else {
                continue;
            };
            if self.best_match(query, &vector).is_some() {
                score += f64::from(freq);
            }
        }
        trace!(candidate = %candidate.id, score, "Scored candidate");
        score
    }

    /// Score every candidate, returning them in input order.
    ///
    /// All distinct candidate tokens are embedded up front in as few model
    /// calls as the provider's batch size allows; per-candidate scoring is
    /// then pure lookups and runs in parallel when enabled.
    pub fn score_all<'a>(
        &self,
        query: &[Arc<Vector>],
        candidates: &[&'a Candidate],
        provider: &EmbeddingProvider,
    ) -> Result<Vec<ScoredCandidate<'a>>> {
        provider.prefetch(candidates.iter().flat_map(|c| c.frequency.tokens()))?;

        let score_one = |candidate: &&'a Candidate| ScoredCandidate {
            candidate: *candidate,
            score: self.score_cached(query, candidate, provider),
        };

        let scored: Vec<ScoredCandidate<'a>> = if self.parallel {
            candidates.par_iter().map(score_one).collect()
        } else {
            candidates.iter().map(score_one).collect()
        };
        Ok(scored)
    }

    /// Per-token breakdown of a candidate's score.
    pub fn explain(
        &self,
        query: &[Arc<Vector>],
        candidate: &Candidate,
        provider: &EmbeddingProvider,
    ) -> Result<Explanation> {
        provider.prefetch(candidate.frequency.tokens())?;

        let mut matches = Vec::new();
        let mut score = 0.0f64;
        for (token, freq) in candidate.frequency.iter() {
            let Some(vector) = provider.lookup(token) else {
                continue;
            };
            if let Some(similarity) = self.best_match(query, &vector) {
                score += f64::from(freq);
                matches.push(TokenMatch {
                    token: token.to_string(),
                    frequency: freq,
                    similarity,
                });
            }
        }

        Ok(Explanation {
            identifier: candidate.id.clone(),
            score,
            matches,
        })
    }
}
