//! Prompt builder for the answering and summarization calls.

use crate::types::{BuiltPrompt, PromptDefinition};
use handlebars::Handlebars;
use kba_core::{AppError, AppResult};
use serde_json::{json, Value};

/// Separator placed between article sections in the answer context.
pub const SECTION_SEPARATOR: &str = "\n\n---\n\n";

/// Render `(title, body)` pairs as `"# {title}\n\n{body}"` blocks joined by [`SECTION_SEPARATOR`].
pub fn render_context_sections<'a, I>(sections: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    sections
        .into_iter()
        .map(|(title, body)| format!("# {}\n\n{}", title, body))
        .collect::<Vec<_>>()
        .join(SECTION_SEPARATOR)
}

/// Build the final answering prompt.
///
/// Deterministic: identical inputs always render the same text.
pub fn build_answer_prompt<'a, I>(
    definition: &PromptDefinition,
    question: &str,
    sections: I,
) -> AppResult<BuiltPrompt>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    tracing::debug!("Building prompt: {}", definition.id);

    let variables = json!({
        "context": render_context_sections(sections),
        "question": question,
    });

    build(definition, &variables)
}

/// Build the per-article summarization prompt.
pub fn build_summary_prompt(
    definition: &PromptDefinition,
    question: &str,
    title: &str,
    body: &str,
    target_words: usize,
) -> AppResult<BuiltPrompt> {
    tracing::debug!("Building prompt: {} for '{}'", definition.id, title);

    let variables = json!({
        "question": question,
        "title": title,
        "body": body,
        "target": target_words,
    });

    build(definition, &variables)
}

fn build(definition: &PromptDefinition, variables: &Value) -> AppResult<BuiltPrompt> {
    let user = render_template(&definition.template, variables)?;

    let resolved = variables
        .as_object()
        .map(|m| m.keys().cloned().collect())
        .unwrap_or_default();

    Ok(BuiltPrompt::new(
        definition.system.clone(),
        user,
        definition.id.clone(),
        resolved,
    ))
}

/// Render a Handlebars template with variables.
fn render_template(template: &str, variables: &Value) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Plain text, not HTML
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    handlebars
        .render("prompt", variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))
}
