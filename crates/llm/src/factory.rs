//! LLM provider factory.
//!
//! Creates a completion client from settings. Secrets are checked here,
//! before any HTTP client exists, so a missing credential never costs a
//! network round-trip.

use crate::client::LlmClient;
use crate::providers::OpenAiClient;
use crate::types::ProviderType;
use kba_core::{AppError, AppResult, LlmSettings};
use std::sync::Arc;

/// Create an LLM client for the configured provider.
///
/// # Errors
/// Returns [`AppError::Config`] if:
/// - Provider is unknown
/// - The credential is missing
/// - Client initialization fails
pub fn create_client(settings: &LlmSettings) -> AppResult<Arc<dyn LlmClient>> {
    match ProviderType::parse(&settings.provider) {
        Some(ProviderType::OpenAI) => {
            let client = OpenAiClient::from_settings(settings)?;
            Ok(Arc::new(client))
        }
        None => Err(AppError::Config(format!(
            "Unknown provider: {}",
            settings.provider
        ))),
    }
}
