//! Shared application state handed to every handler.

use std::sync::Arc;

use kba_core::{AppConfig, AppError, AppResult};
use kba_knowledge::{AnswerGenerator, ArticleStore};
use kba_llm::{create_client, LlmClient};

/// Immutable per-process state. Requests share nothing mutable.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: ArticleStore,
    llm: Result<Arc<dyn LlmClient>, String>,
}

impl AppState {
    /// Build state from configuration.
    ///
    /// A provider that cannot be created (usually a missing credential) does
    /// not stop the server; `/api/ask` reports the configuration error
    /// instead, before touching the database.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let store = ArticleStore::open(&config.database)?;

        let llm = create_client(&config.llm).map_err(|e| {
            tracing::warn!("Completion provider unavailable: {}", e);
            match e {
                AppError::Config(message) => message,
                other => other.to_string(),
            }
        });

        Ok(Self {
            config: Arc::new(config),
            store,
            llm,
        })
    }

    /// Replace the completion provider.
    pub fn with_client(mut self, client: Arc<dyn LlmClient>) -> Self {
        self.llm = Ok(client);
        self
    }

    /// Answer generator for one request, or the configuration error explaining
    /// why none is available.
    pub fn answer_generator(&self) -> AppResult<AnswerGenerator> {
        match &self.llm {
            Ok(client) => Ok(AnswerGenerator::from_config(&self.config, client.clone())),
            Err(reason) => Err(AppError::Config(reason.clone())),
        }
    }
}
