//! Explain mode output: why a store got its score.

use serde::{Deserialize, Serialize};

/// One candidate token that reached the similarity threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenMatch {
    pub token: String,
    pub frequency: u32,
    /// Best cosine similarity against any query token
    pub similarity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub identifier: String,
    pub score: f64,
    pub matches: Vec<TokenMatch>,
}

impl Explanation {
    /// Matched tokens, highest frequency first
    pub fn top_matches(&self, n: usize) -> Vec<&TokenMatch> {
        let mut matches: Vec<&TokenMatch> = self.matches.iter().collect();
        matches.sort_by(|a, b| b.frequency.cmp(&a.frequency).then_with(|| a.token.cmp(&b.token)));
        matches.truncate(n);
        matches
    }
}
