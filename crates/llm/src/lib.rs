//! Completion provider integration for the Knowledge Base Assistant.
//!
//! A provider-agnostic abstraction over chat-completion LLMs. The rest of
//! the workspace only sees [`LlmClient`]; the factory decides which
//! implementation backs it.
//!
//! # Example
//! ```no_run
//! use kba_core::LlmSettings;
//! use kba_llm::{create_client, LlmRequest};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = LlmSettings { api_key: Some("sk-...".into()), ..Default::default() };
//! let client = create_client(&settings)?;
//! let request = LlmRequest::new(&settings.model).with_user("Hello, world!");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::OpenAiClient;
pub use types::{ChatMessage, ProviderType, Role};
