use std::cmp::Ordering;
use storerank_core::{Candidate, RankedStore};

/// Number of results a recommendation returns
pub const DEFAULT_TOP_K: usize = 10;

/// A candidate paired with its score. Lives only for one ranking pass.
#[derive(Debug, Clone, Copy)]
pub struct ScoredCandidate<'a> {
    pub candidate: &'a Candidate,
    pub score: f64,
}

impl ScoredCandidate<'_> {
    pub fn to_ranked(&self) -> RankedStore {
        RankedStore::new(self.candidate.id.clone(), self.score)
    }
}

/// Descending by score; equal scores keep catalog order.
fn by_score_then_position(a: &ScoredCandidate<'_>, b: &ScoredCandidate<'_>) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.candidate.position.cmp(&b.candidate.position))
}

/// Sort and keep the best `top_k`.
pub fn rank(mut scored: Vec<ScoredCandidate<'_>>, top_k: usize) -> Vec<ScoredCandidate<'_>> {
    scored.sort_by(by_score_then_position);
    scored.truncate(top_k);
    scored
}

/// [`rank`], reduced to the identifier/score pairs that get returned and cached.
pub fn top_k(scored: Vec<ScoredCandidate<'_>>, top_k: usize) -> Vec<RankedStore> {
    rank(scored, top_k)
        .iter()
        .map(ScoredCandidate::to_ranked)
        .collect()
}
