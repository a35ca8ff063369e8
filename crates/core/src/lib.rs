//! Knowledge Base Assistant core library.
//!
//! Foundational pieces shared by every crate in the workspace:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Configuration management

pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::{AppConfig, ContextSettings, LlmSettings, ServerSettings};
pub use error::{AppError, AppResult};
