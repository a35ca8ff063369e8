//! OpenAI chat-completions provider.
//!
//! API: POST {endpoint}/v1/chat/completions (non-streaming).

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use crate::types::ProviderType;
use kba_core::{AppError, AppResult, LlmSettings};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Longest provider error body echoed back in an error message.
const ERROR_SNIPPET_CHARS: usize = 300;

/// OpenAI API request format.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessageIn<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessageIn<'a> {
    role: &'a str,
    content: &'a str,
}

/// OpenAI API response format.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageOut,
}

#[derive(Debug, Deserialize)]
struct ChatMessageOut {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

/// OpenAI chat-completions client.
pub struct OpenAiClient {
    /// Fully resolved chat-completions URL
    url_chat: String,

    /// Bearer credential
    api_key: String,

    /// HTTP client
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("url_chat", &self.url_chat)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl OpenAiClient {
    /// Create a client from provider settings.
    ///
    /// Fails with [`AppError::Config`] when the credential is missing or the
    /// endpoint is not an http(s) URL. No request is sent here.
    pub fn from_settings(settings: &LlmSettings) -> AppResult<Self> {
        let api_key = settings.require_api_key()?.to_string();

        let endpoint = settings.endpoint.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(AppError::Config(format!(
                "Invalid OpenAI endpoint: {:?}",
                settings.endpoint
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        let url_chat = format!("{}/v1/chat/completions", endpoint.trim_end_matches('/'));

        tracing::debug!(
            url = %url_chat,
            timeout_secs = settings.timeout_secs,
            "OpenAI client initialized"
        );

        Ok(Self {
            url_chat,
            api_key,
            client,
        })
    }

    /// Convert LlmRequest to OpenAI format.
    fn to_openai_request<'a>(&self, request: &'a LlmRequest) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &request.model,
            messages: request
                .messages
                .iter()
                .map(|m| ChatMessageIn {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }

    /// Convert OpenAI response to LlmResponse.
    fn convert_response(
        &self,
        requested_model: &str,
        response: ChatCompletionResponse,
    ) -> LlmResponse {
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        let usage = response
            .usage
            .map(|u| LlmUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        LlmResponse {
            content,
            model: response.model.unwrap_or_else(|| requested_model.to_string()),
            usage,
        }
    }
}

#[async_trait::async_trait]
impl LlmClient for OpenAiClient {
    fn provider_name(&self) -> &str {
        ProviderType::OpenAI.as_str()
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        let started = Instant::now();
        let body = self.to_openai_request(request);

        tracing::debug!(
            model = %request.model,
            messages = request.messages.len(),
            "POST {}",
            self.url_chat
        );

        let response = self
            .client
            .post(&self.url_chat)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to send request to OpenAI: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Llm(format!(
                "OpenAI API error ({}): {}",
                status,
                snippet(&error_text)
            )));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse OpenAI response: {}", e)))?;

        let converted = self.convert_response(&request.model, parsed);

        tracing::info!(
            model = %converted.model,
            total_tokens = converted.usage.total_tokens,
            latency_ms = started.elapsed().as_millis() as u64,
            "Received completion from OpenAI"
        );

        Ok(converted)
    }
}

/// Trim a provider error body to something loggable.
fn snippet(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= ERROR_SNIPPET_CHARS {
        trimmed.to_string()
    } else {
        let cut: String = trimmed.chars().take(ERROR_SNIPPET_CHARS).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_with_key() -> LlmSettings {
        LlmSettings {
            api_key: Some("sk-test".to_string()),
            ..LlmSettings::default()
        }
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let err = OpenAiClient::from_settings(&LlmSettings::default()).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let mut settings = settings_with_key();
        settings.endpoint = "api.openai.com".to_string();
        assert!(OpenAiClient::from_settings(&settings).is_err());
    }

    #[test]
    fn test_chat_url_trims_trailing_slash() {
        let mut settings = settings_with_key();
        settings.endpoint = "http://localhost:8080/".to_string();
        let client = OpenAiClient::from_settings(&settings).unwrap();
        assert_eq!(client.url_chat, "http://localhost:8080/v1/chat/completions");
    }

    #[test]
    fn test_request_conversion() {
        let client = OpenAiClient::from_settings(&settings_with_key()).unwrap();
        let request = LlmRequest::new("gpt-3.5-turbo")
            .with_system("You are a helpful technical summarizer.")
            .with_user("Summarize this")
            .with_temperature(0.2);

        let body = serde_json::to_value(client.to_openai_request(&request)).unwrap();
        assert_eq!(body["model"], "gpt-3.5-turbo");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "Summarize this");
        assert!((body["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
        assert!(body.get("max_tokens").is_none());
    }

    #[test]
    fn test_response_conversion_handles_null_content() {
        let client = OpenAiClient::from_settings(&settings_with_key()).unwrap();
        let parsed: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#,
        )
        .unwrap();

        let converted = client.convert_response("gpt-3.5-turbo", parsed);
        assert_eq!(converted.content, "");
        assert_eq!(converted.model, "gpt-3.5-turbo");
    }

    #[test]
    fn test_response_conversion_reads_usage() {
        let client = OpenAiClient::from_settings(&settings_with_key()).unwrap();
        let parsed: ChatCompletionResponse = serde_json::from_str(
            r#"{"model":"gpt-3.5-turbo-0125","choices":[{"message":{"content":"Async IO is..."}}],
                "usage":{"prompt_tokens":12,"completion_tokens":4,"total_tokens":16}}"#,
        )
        .unwrap();

        let converted = client.convert_response("gpt-3.5-turbo", parsed);
        assert_eq!(converted.content, "Async IO is...");
        assert_eq!(converted.model, "gpt-3.5-turbo-0125");
        assert_eq!(converted.usage.total_tokens, 16);
    }

    #[test]
    fn test_snippet_truncates_long_bodies() {
        let long = "x".repeat(1000);
        let s = snippet(&long);
        assert!(s.ends_with("..."));
        assert_eq!(s.chars().count(), ERROR_SNIPPET_CHARS + 3);
    }
}
