//! Knowledge base type definitions.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::chunker::word_count;

/// A full article as fetched for answering: immutable for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub id: i64,
    pub title: String,
    pub content: String,
}

impl ArticleRecord {
    pub fn new(id: i64, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            content: content.into(),
        }
    }
}

/// One ranked row returned by full-text search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: i64,
    pub title: String,

    /// First 280 characters of the article content
    pub excerpt: String,

    pub publish_date: NaiveDate,
    pub author_id: i64,
    pub author_name: String,
    pub author_bio: String,
    pub category_id: i64,
    pub category_name: String,

    /// Comma-separated tag names, alphabetically ordered
    pub tags: String,

    /// Relevance score, higher is better; 0 for substring-fallback hits
    pub rank: f64,
}

/// Parameters of a search request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub query: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default = "default_search_limit")]
    pub limit: u32,
}

/// Default number of search results.
pub const DEFAULT_SEARCH_LIMIT: u32 = 5;

/// Upper bound applied to any requested limit.
pub const MAX_SEARCH_LIMIT: u32 = 50;

fn default_search_limit() -> u32 {
    DEFAULT_SEARCH_LIMIT
}

impl SearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            category: None,
            limit: DEFAULT_SEARCH_LIMIT,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Limit clamped into `1..=MAX_SEARCH_LIMIT`.
    pub fn effective_limit(&self) -> u32 {
        self.limit.clamp(1, MAX_SEARCH_LIMIT)
    }
}

/// The distilled per-article block that goes into the prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    /// Article the block was built from
    pub article_id: i64,
    pub title: String,
    pub body: String,
}

impl Context {
    pub fn new(article_id: i64, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            article_id,
            title: title.into(),
            body: body.into(),
        }
    }

    /// Whitespace-separated words in the body.
    pub fn word_count(&self) -> usize {
        word_count(&self.body)
    }
}

/// Result of answering a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    /// Provider text, trimmed
    pub text: String,

    /// Articles whose context made it into the prompt, in prompt order
    pub used_article_ids: Vec<i64>,

    /// Total words of context sent
    pub context_words: usize,

    /// Whether the summarization pass ran
    pub summarized: bool,
}

/// Row counts after seeding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub authors: u64,
    pub categories: u64,
    pub tags: u64,
    pub articles: u64,
    pub article_tags: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_limit_is_clamped() {
        assert_eq!(SearchQuery::new("q").effective_limit(), 5);
        assert_eq!(SearchQuery::new("q").with_limit(0).effective_limit(), 1);
        assert_eq!(SearchQuery::new("q").with_limit(500).effective_limit(), 50);
    }

    #[test]
    fn test_search_query_defaults_from_json() {
        let q: SearchQuery = serde_json::from_str(r#"{"query":"joins"}"#).unwrap();
        assert_eq!(q.limit, DEFAULT_SEARCH_LIMIT);
        assert!(q.category.is_none());
    }

    #[test]
    fn test_context_word_count() {
        let ctx = Context::new(1, "T", "one  two\nthree");
        assert_eq!(ctx.word_count(), 3);
    }
}
