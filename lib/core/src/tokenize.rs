//! Query normalization.
//!
//! The production deployment plugs a morphological analyzer in through
//! [`Tokenizer`]. [`SegmentingTokenizer`] is the built-in fallback: Unicode
//! word segmentation, stopword removal and a minimum length, which is
//! enough for space-separated queries and for tests.

use ahash::{AHashMap, AHashSet};
use unicode_segmentation::UnicodeSegmentation;

/// Turns raw query text into an ordered list of noun tokens
pub trait Tokenizer: Send + Sync {
    fn nouns(&self, text: &str) -> Vec<String>;
}

#[derive(Debug, Clone)]
pub struct SegmentingTokenizer {
    stopwords: AHashSet<String>,
    min_chars: usize,
}

impl Default for SegmentingTokenizer {
    fn default() -> Self {
        Self::new(Vec::<String>::new(), 1)
    }
}

impl SegmentingTokenizer {
    pub fn new<I, S>(stopwords: I, min_chars: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            stopwords: stopwords.into_iter().map(Into::into).collect(),
            min_chars: min_chars.max(1),
        }
    }

    pub fn is_stopword(&self, token: &str) -> bool {
        self.stopwords.contains(token)
    }
}

impl Tokenizer for SegmentingTokenizer {
    fn nouns(&self, text: &str) -> Vec<String> {
        text.unicode_words()
            .filter(|w| w.chars().any(char::is_alphabetic))
            .filter(|w| w.chars().count() >= self.min_chars)
            .filter(|w| !self.stopwords.contains(*w))
            .map(str::to_string)
            .collect()
    }
}

/// Corpus-derived stopwords: the 1% most frequent plus the 1% least
/// frequent distinct nouns.
///
/// `k = floor(distinct * 0.01)`. Frequent nouns come first, most frequent
/// leading; rare nouns follow, rarest leading. Equal counts keep
/// first-appearance order in the frequent half and reverse it in the rare
/// half. A noun is listed once even if it lands in both halves.
pub fn generate_stopwords<D, T>(documents: D) -> Vec<String>
where
    D: IntoIterator<Item = T>,
    T: IntoIterator<Item = String>,
{
    let mut counts: AHashMap<String, (usize, usize)> = AHashMap::new();
    let mut next_seen = 0usize;
    for doc in documents {
        for noun in doc {
            let entry = counts.entry(noun).or_insert_with(|| {
                next_seen += 1;
                (0, next_seen)
            });
            entry.0 += 1;
        }
    }

    let mut ranked: Vec<(String, usize, usize)> = counts
        .into_iter()
        .map(|(noun, (count, seen))| (noun, count, seen))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    let k = ranked.len() / 100;
    let mut out: Vec<String> = Vec::with_capacity(k * 2);
    let mut listed = AHashSet::new();
    let frequent = ranked.iter().take(k);
    let rare = ranked.iter().rev().take(k);
    for (noun, _, _) in frequent.chain(rare) {
        if listed.insert(noun.as_str()) {
            out.push(noun.clone());
        }
    }
    out
}
