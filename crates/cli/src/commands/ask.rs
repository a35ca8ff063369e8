//! Ask command handler.
//!
//! Answers a question from the articles named by `--ids`, the same way the
//! `/api/ask` endpoint does.

use clap::Args;
use kba_core::{config::AppConfig, AppError, AppResult};
use kba_knowledge::{AnswerGenerator, ArticleStore};
use kba_llm::create_client;

/// Answer a question from selected articles
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// Article ids to answer from, comma-separated
    #[arg(long, value_delimiter = ',', required = true, num_args = 1..)]
    pub ids: Vec<i64>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::debug!("Ask command options: {:?}", self);

        if self.question.trim().is_empty() {
            return Err(AppError::Validation("question is required".to_string()));
        }

        // Credential problems surface before the database is touched
        let client = create_client(&config.llm)?;

        let store = ArticleStore::open(&config.database)?;
        let articles = store.fetch_contexts(&self.ids)?;
        if articles.is_empty() {
            return Err(AppError::NotFound(format!(
                "None of the requested articles exist: {:?}",
                self.ids
            )));
        }

        let generator = AnswerGenerator::from_config(config, client);
        let answer = generator.generate(&self.question, &articles).await?;

        if self.json {
            let output = serde_json::json!({
                "answer": answer.text,
                "used_article_ids": answer.used_article_ids,
                "context_words": answer.context_words,
                "summarized": answer.summarized,
                "model": config.llm.model,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", answer.text);
            eprintln!(
                "\n[articles: {:?}, ~{} words of context{}]",
                answer.used_article_ids,
                answer.context_words,
                if answer.summarized { ", summarized" } else { "" }
            );
        }

        Ok(())
    }
}
