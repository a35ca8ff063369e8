//! Prompt system for the Knowledge Base Assistant.
//!
//! This crate provides:
//! - YAML prompt definitions (compiled-in, with optional on-disk overrides)
//! - Handlebars template rendering
//! - Builders for the answering and summarization prompts

pub mod builder;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::{
    build_answer_prompt, build_summary_prompt, render_context_sections, SECTION_SEPARATOR,
};
pub use loader::{list_prompts, load_prompt, ANSWER_PROMPT_ID, SUMMARIZE_PROMPT_ID};
pub use types::{BuiltPrompt, BuiltPromptMetadata, PromptDefinition};
