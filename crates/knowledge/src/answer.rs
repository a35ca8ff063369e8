//! Answer generation: context budgeting followed by one completion call.
//!
//! Given a question and the articles the user picked, the generator
//!
//! 1. distills each article into its best-ranked chunks,
//! 2. keeps the longest prefix of those contexts that fits the word budget,
//! 3. summarizes the contexts when even the first one cannot fit,
//! 4. renders the answering prompt and asks the provider.
//!
//! Only the provider calls suspend; everything else is pure computation.

use std::path::PathBuf;
use std::sync::Arc;

use crate::budget::trim_to_budget;
use crate::context::assemble_contexts;
use crate::rank::{ChunkRanker, KeywordOverlapRanker};
use crate::summarize::{completion_request, Summarizer};
use crate::types::{Answer, ArticleRecord, Context};
use kba_core::{AppConfig, AppError, AppResult, ContextSettings};
use kba_llm::LlmClient;
use kba_prompt::{build_answer_prompt, load_prompt, ANSWER_PROMPT_ID, SUMMARIZE_PROMPT_ID};

/// Contexts selected for one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedContext {
    pub contexts: Vec<Context>,
    pub total_words: usize,
    pub summarized: bool,
}

impl PreparedContext {
    /// Article ids in prompt order.
    pub fn article_ids(&self) -> Vec<i64> {
        self.contexts.iter().map(|c| c.article_id).collect()
    }
}

/// Produces grounded answers from a fixed set of articles.
pub struct AnswerGenerator {
    client: Arc<dyn LlmClient>,
    ranker: Arc<dyn ChunkRanker>,
    settings: ContextSettings,
    model: String,
    temperature: f32,
    prompts_dir: Option<PathBuf>,
}

impl AnswerGenerator {
    pub fn new(
        client: Arc<dyn LlmClient>,
        settings: ContextSettings,
        model: impl Into<String>,
        temperature: f32,
    ) -> Self {
        Self {
            client,
            ranker: Arc::new(KeywordOverlapRanker),
            settings,
            model: model.into(),
            temperature,
            prompts_dir: None,
        }
    }

    /// Generator wired from application configuration.
    pub fn from_config(config: &AppConfig, client: Arc<dyn LlmClient>) -> Self {
        Self::new(client, config.context, config.llm.model.clone(), config.llm.temperature)
            .with_prompts_dir(config.prompts_dir.clone())
    }

    pub fn with_ranker(mut self, ranker: Arc<dyn ChunkRanker>) -> Self {
        self.ranker = ranker;
        self
    }

    pub fn with_prompts_dir(mut self, prompts_dir: Option<PathBuf>) -> Self {
        self.prompts_dir = prompts_dir;
        self
    }

    /// Select and, if needed, summarize the contexts for `question`.
    pub async fn prepare_context(
        &self,
        question: &str,
        articles: &[ArticleRecord],
    ) -> AppResult<PreparedContext> {
        let contexts = assemble_contexts(articles, question, &self.settings, self.ranker.as_ref());
        let outcome = trim_to_budget(contexts, self.settings.word_budget);

        if !outcome.overflowed_at_start() {
            if let Some(index) = outcome.stopped_at() {
                tracing::debug!(
                    "Word budget of {} reached at context {}; dropping {} contexts",
                    self.settings.word_budget,
                    index,
                    outcome.dropped.len()
                );
            }
            return Ok(PreparedContext {
                contexts: outcome.kept,
                total_words: outcome.total_words,
                summarized: false,
            });
        }

        tracing::debug!(
            "First context exceeds the word budget of {}; summarizing {} contexts",
            self.settings.word_budget,
            outcome.dropped.len()
        );

        let definition = load_prompt(self.prompts_dir.as_deref(), SUMMARIZE_PROMPT_ID)?;
        let summarizer = Summarizer::new(
            self.client.clone(),
            definition,
            self.model.clone(),
            self.temperature,
            self.settings.summary_target,
        );

        let outcome = summarizer
            .summarize_within_budget(question, outcome.dropped, self.settings.word_budget)
            .await?;

        Ok(PreparedContext {
            contexts: outcome.kept,
            total_words: outcome.total_words,
            summarized: true,
        })
    }

    /// Answer `question` using only the given articles.
    pub async fn generate(&self, question: &str, articles: &[ArticleRecord]) -> AppResult<Answer> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AppError::Validation("question is required".to_string()));
        }
        if articles.is_empty() {
            return Err(AppError::Validation(
                "at least one article is required".to_string(),
            ));
        }

        let definition = load_prompt(self.prompts_dir.as_deref(), ANSWER_PROMPT_ID)?;
        let prepared = self.prepare_context(question, articles).await?;

        tracing::info!(
            "Using {} context articles (~{} words) for question {:?}",
            prepared.contexts.len(),
            prepared.total_words,
            question
        );

        if prepared.contexts.is_empty() {
            tracing::warn!("No usable context for question {:?}", question);
        }

        let prompt = build_answer_prompt(
            &definition,
            question,
            prepared
                .contexts
                .iter()
                .map(|c| (c.title.as_str(), c.body.as_str())),
        )?;

        let response = self
            .client
            .complete(&completion_request(&prompt, &self.model, self.temperature))
            .await?;

        Ok(Answer {
            text: response.content.trim().to_string(),
            used_article_ids: prepared.article_ids(),
            context_words: prepared.total_words,
            summarized: prepared.summarized,
        })
    }
}
