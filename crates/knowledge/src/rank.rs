//! Chunk ranking.
//!
//! Ranking is pluggable through [`ChunkRanker`]. The default,
//! [`KeywordOverlapRanker`], is a purely lexical heuristic: it counts how many
//! words of a chunk also occur in the question. It has no notion of synonyms,
//! stemming or meaning, so a chunk that paraphrases the question can lose to
//! one that merely repeats a common question word.

use std::cmp::Reverse;
use std::collections::HashSet;

/// Orders the chunks of one article by relevance to a question.
pub trait ChunkRanker: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Return `chunks` best-first. Implementations must keep every chunk.
    fn rank<'a>(&self, chunks: Vec<&'a str>, question: &str) -> Vec<&'a str>;
}

/// Ranks chunks by the number of their words that appear in the question.
///
/// Every occurrence counts, so a question word repeated three times in a chunk
/// scores three. Ties keep their original order.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordOverlapRanker;

impl KeywordOverlapRanker {
    /// Score one chunk against a prepared term set.
    pub fn score(chunk: &str, terms: &HashSet<String>) -> usize {
        chunk
            .split_whitespace()
            .filter_map(normalize_token)
            .filter(|token| terms.contains(token))
            .count()
    }
}

impl ChunkRanker for KeywordOverlapRanker {
    fn name(&self) -> &str {
        "keyword-overlap"
    }

    fn rank<'a>(&self, chunks: Vec<&'a str>, question: &str) -> Vec<&'a str> {
        let terms = question_terms(question);

        let mut scored: Vec<(usize, &'a str)> = chunks
            .into_iter()
            .map(|chunk| (Self::score(chunk, &terms), chunk))
            .collect();

        // sort_by_key is stable
        scored.sort_by_key(|(score, _)| Reverse(*score));

        scored.into_iter().map(|(_, chunk)| chunk).collect()
    }
}

/// Distinct normalized words of a question.
pub fn question_terms(question: &str) -> HashSet<String> {
    question.split_whitespace().filter_map(normalize_token).collect()
}

/// Lowercase a word and strip non-alphanumeric characters from both ends.
///
/// Returns `None` for words that are pure punctuation.
pub fn normalize_token(word: &str) -> Option<String> {
    let trimmed = word.trim_matches(|c: char| !c.is_alphanumeric());
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}
