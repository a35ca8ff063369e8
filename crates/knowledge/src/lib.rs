//! Knowledge base for the assistant: article storage, search and
//! budget-aware answer generation.
//!
//! The answer pipeline never retrieves on its own. Callers pass the exact
//! articles the user selected; the generator distills, budgets and, when
//! needed, summarizes them before asking the completion provider.

pub mod answer;
pub mod budget;
pub mod chunker;
pub mod context;
pub mod rank;
pub mod store;
pub mod summarize;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use answer::{AnswerGenerator, PreparedContext};
pub use budget::{trim_to_budget, TrimOutcome};
pub use chunker::{chunk_words, word_count, Chunks};
pub use context::{assemble_contexts, CHUNK_SEPARATOR};
pub use rank::{ChunkRanker, KeywordOverlapRanker};
pub use store::ArticleStore;
pub use summarize::Summarizer;
pub use types::{
    Answer, ArticleRecord, Context, SearchQuery, SearchResult, StoreStats, DEFAULT_SEARCH_LIMIT,
    MAX_SEARCH_LIMIT,
};
