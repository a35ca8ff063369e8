//! Per-article summarization through the completion provider.

use std::sync::Arc;

use crate::budget::TrimOutcome;
use crate::chunker::{truncate_words, word_count};
use crate::types::Context;
use kba_core::{AppError, AppResult};
use kba_llm::{LlmClient, LlmRequest};
use kba_prompt::{build_summary_prompt, BuiltPrompt, PromptDefinition};

/// Shrinks contexts to roughly `target_words` words each.
pub struct Summarizer {
    client: Arc<dyn LlmClient>,
    definition: PromptDefinition,
    model: String,
    temperature: f32,
    target_words: usize,
}

impl Summarizer {
    pub fn new(
        client: Arc<dyn LlmClient>,
        definition: PromptDefinition,
        model: impl Into<String>,
        temperature: f32,
        target_words: usize,
    ) -> Self {
        Self {
            client,
            definition,
            model: model.into(),
            temperature,
            target_words,
        }
    }

    /// Summarize contexts in order while their summaries fit `budget` words.
    ///
    /// A context is only sent to the provider when its capped summary is
    /// guaranteed to fit the remaining budget; the first one that cannot fit
    /// ends the pass and it and every later context are dropped. Contexts
    /// already within the target are passed through without a provider call.
    /// Any provider failure aborts the whole pass.
    pub async fn summarize_within_budget(
        &self,
        question: &str,
        contexts: Vec<Context>,
        budget: usize,
    ) -> AppResult<TrimOutcome> {
        let mut kept = Vec::with_capacity(contexts.len());
        let mut total_words = 0usize;
        let mut remaining = contexts.into_iter();

        while let Some(context) = remaining.next() {
            let projected = context.word_count().min(self.target_words);
            if total_words + projected > budget {
                let mut dropped = vec![context];
                dropped.extend(remaining);
                tracing::debug!(
                    "Word budget of {} reached after {} summaries; dropping {} contexts",
                    budget,
                    kept.len(),
                    dropped.len()
                );
                return Ok(TrimOutcome {
                    kept,
                    dropped,
                    total_words,
                });
            }

            let summary = self.summarize(question, context).await?;
            total_words += summary.word_count();
            kept.push(summary);
        }

        Ok(TrimOutcome {
            kept,
            dropped: Vec::new(),
            total_words,
        })
    }

    /// Summarize a single context.
    pub async fn summarize(&self, question: &str, context: Context) -> AppResult<Context> {
        let words = context.word_count();
        if words <= self.target_words {
            return Ok(context);
        }

        tracing::debug!(
            "Summarizing article {} ({} words) to ~{} words",
            context.article_id,
            words,
            self.target_words
        );

        let prompt = build_summary_prompt(
            &self.definition,
            question,
            &context.title,
            &context.body,
            self.target_words,
        )?;

        let response = self
            .client
            .complete(&completion_request(&prompt, &self.model, self.temperature))
            .await?;

        let summary = response.content.trim();
        if summary.is_empty() {
            return Err(AppError::Llm(format!(
                "Empty summary returned for article '{}'",
                context.title
            )));
        }

        let body = if word_count(summary) > self.target_words {
            truncate_words(summary, self.target_words)
        } else {
            summary.to_string()
        };

        Ok(Context { body, ..context })
    }
}

/// Turn a built prompt into a provider request.
pub(crate) fn completion_request(
    prompt: &BuiltPrompt,
    model: &str,
    temperature: f32,
) -> LlmRequest {
    let mut request = LlmRequest::new(model);
    if let Some(system) = &prompt.system {
        request = request.with_system(system.as_str());
    }
    request.with_user(prompt.user.as_str()).with_temperature(temperature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::support::StubClient;
    use kba_llm::Role;
    use kba_prompt::{load_prompt, SUMMARIZE_PROMPT_ID};

    fn summarizer(client: Arc<StubClient>, target: usize) -> Summarizer {
        let definition = load_prompt(None, SUMMARIZE_PROMPT_ID).unwrap();
        Summarizer::new(client, definition, "gpt-3.5-turbo", 0.2, target)
    }

    fn long_context(id: i64, words: usize) -> Context {
        Context::new(id, format!("Article {}", id), vec!["word"; words].join(" "))
    }

    #[tokio::test]
    async fn test_short_context_skips_provider() {
        let client = Arc::new(StubClient::replying("unused"));
        let s = summarizer(client.clone(), 150);

        let ctx = Context::new(1, "Short", "only a few words");
        let out = s.summarize("q", ctx.clone()).await.unwrap();

        assert_eq!(out, ctx);
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_long_context_is_replaced_by_summary() {
        let client = Arc::new(StubClient::replying("  a compact summary  "));
        let s = summarizer(client.clone(), 150);

        let out = s.summarize("What is async IO?", long_context(4, 1000)).await.unwrap();

        assert_eq!(out.article_id, 4);
        assert_eq!(out.title, "Article 4");
        assert_eq!(out.body, "a compact summary");

        let requests = client.requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.model, "gpt-3.5-turbo");
        assert_eq!(request.temperature, Some(0.2));
        assert_eq!(request.messages[0].role, Role::System);
        assert_eq!(request.messages[0].content, "You are a helpful technical summarizer.");
        let user = request.last_user_content().unwrap();
        assert!(user.contains("Write ~150 words"));
        assert!(user.contains("User question: What is async IO?"));
        assert!(user.contains("Article titled: Article 4"));
    }

    #[tokio::test]
    async fn test_overlong_summary_is_capped() {
        let reply = vec!["s"; 400].join(" ");
        let client = Arc::new(StubClient::replying(&reply));
        let s = summarizer(client, 150);

        let out = s.summarize("q", long_context(1, 1000)).await.unwrap();
        assert_eq!(out.word_count(), 150);
    }

    #[tokio::test]
    async fn test_summaries_keep_input_order() {
        let client = Arc::new(StubClient::replying("short"));
        let s = summarizer(client.clone(), 10);

        let contexts = vec![
            long_context(3, 50),
            Context::new(1, "Tiny", "tiny"),
            long_context(2, 20),
        ];
        let out = s.summarize_within_budget("q", contexts, 100).await.unwrap();

        let ids: Vec<i64> = out.kept.iter().map(|c| c.article_id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
        assert_eq!(out.kept[1].body, "tiny");
        assert!(out.dropped.is_empty());
        assert_eq!(out.total_words, 3);
        assert_eq!(client.call_count(), 2);
    }

    #[tokio::test]
    async fn test_stops_before_a_summary_that_cannot_fit() {
        let reply = vec!["s"; 10].join(" ");
        let client = Arc::new(StubClient::replying(&reply));
        let s = summarizer(client.clone(), 10);

        let contexts = (1..=6).map(|id| long_context(id, 200)).collect();
        let out = s.summarize_within_budget("q", contexts, 25).await.unwrap();

        let ids: Vec<i64> = out.kept.iter().map(|c| c.article_id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(out.total_words, 20);
        assert_eq!(out.dropped.len(), 4);
        assert_eq!(out.dropped[0].article_id, 3);
        assert_eq!(client.call_count(), 2);
    }

    #[tokio::test]
    async fn test_target_above_budget_makes_no_calls() {
        let client = Arc::new(StubClient::replying("unused"));
        let s = summarizer(client.clone(), 150);

        let out = s
            .summarize_within_budget("q", vec![long_context(1, 1000)], 100)
            .await
            .unwrap();

        assert!(out.kept.is_empty());
        assert_eq!(out.dropped.len(), 1);
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_provider_failure_aborts() {
        let client = Arc::new(StubClient::failing("rate limited"));
        let s = summarizer(client, 10);

        let err = s
            .summarize_within_budget("q", vec![long_context(1, 50), long_context(2, 50)], 100)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Llm(_)));
    }

    #[tokio::test]
    async fn test_empty_summary_is_an_error() {
        let client = Arc::new(StubClient::replying("   "));
        let s = summarizer(client, 10);

        let err = s.summarize("q", long_context(1, 50)).await.unwrap_err();
        assert!(matches!(err, AppError::Llm(_)));
    }
}
