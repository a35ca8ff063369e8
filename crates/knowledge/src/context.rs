//! Per-article context assembly.

use crate::chunker::chunk_words;
use crate::rank::ChunkRanker;
use crate::types::{ArticleRecord, Context};
use kba_core::ContextSettings;

/// Separator placed between the chunks chosen from one article.
pub const CHUNK_SEPARATOR: &str = " ... ";

/// Build one context per usable article, preserving article order.
///
/// Articles with a blank title or blank content are skipped. Each remaining
/// article is chunked, ranked against the question, and the best
/// `settings.top_chunks` chunks are joined with [`CHUNK_SEPARATOR`].
pub fn assemble_contexts(
    articles: &[ArticleRecord],
    question: &str,
    settings: &ContextSettings,
    ranker: &dyn ChunkRanker,
) -> Vec<Context> {
    let mut contexts = Vec::with_capacity(articles.len());

    for article in articles {
        let title = article.title.trim();
        let content = article.content.trim();

        if title.is_empty() || content.is_empty() {
            tracing::debug!("Skipping article {} with empty title or content", article.id);
            continue;
        }

        let chunks: Vec<&str> = chunk_words(content, settings.chunk_words).collect();
        let ranked = ranker.rank(chunks, question);

        let body = ranked
            .into_iter()
            .take(settings.top_chunks)
            .collect::<Vec<_>>()
            .join(CHUNK_SEPARATOR);

        contexts.push(Context::new(article.id, title, body));
    }

    tracing::debug!(
        "Assembled {} contexts from {} articles using {}",
        contexts.len(),
        articles.len(),
        ranker.name()
    );

    contexts
}
