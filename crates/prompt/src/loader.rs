//! Prompt loader for built-in and on-disk YAML prompt definitions.

use crate::types::PromptDefinition;
use kba_core::{AppError, AppResult};
use std::path::Path;

/// Prompt used for the final answering call.
pub const ANSWER_PROMPT_ID: &str = "kb.answer";

/// Prompt used for per-article summarization.
pub const SUMMARIZE_PROMPT_ID: &str = "kb.summarize";

const BUILTIN_PROMPTS: [(&str, &str); 2] = [
    (ANSWER_PROMPT_ID, include_str!("../prompts/kb.answer.yml")),
    (SUMMARIZE_PROMPT_ID, include_str!("../prompts/kb.summarize.yml")),
];

/// Load a prompt definition by ID.
///
/// When `prompts_dir` is given and contains `<id>.yml`, that file wins;
/// otherwise the compiled-in definition is used.
///
/// # Example
/// ```no_run
/// use kba_prompt::{load_prompt, ANSWER_PROMPT_ID};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(None, ANSWER_PROMPT_ID)?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(prompts_dir: Option<&Path>, prompt_id: &str) -> AppResult<PromptDefinition> {
    if let Some(dir) = prompts_dir {
        let prompt_file = dir.join(format!("{}.yml", prompt_id));
        if prompt_file.exists() {
            tracing::debug!("Loading prompt from: {:?}", prompt_file);

            let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
                AppError::Prompt(format!(
                    "Failed to read prompt file {:?}: {}",
                    prompt_file, e
                ))
            })?;

            let definition = parse_prompt(&contents, &prompt_file.to_string_lossy())?;
            tracing::info!("Loaded prompt override: {} ({})", definition.id, definition.title);
            return Ok(definition);
        }
    }

    let (_, contents) = BUILTIN_PROMPTS
        .iter()
        .find(|(id, _)| *id == prompt_id)
        .ok_or_else(|| AppError::Prompt(format!("Prompt not found: {}", prompt_id)))?;

    parse_prompt(contents, prompt_id)
}

/// List all available prompt IDs: built-ins plus any `.yml` files in `prompts_dir`.
pub fn list_prompts(prompts_dir: Option<&Path>) -> AppResult<Vec<String>> {
    let mut prompt_ids: Vec<String> =
        BUILTIN_PROMPTS.iter().map(|(id, _)| id.to_string()).collect();

    if let Some(dir) = prompts_dir.filter(|d| d.exists()) {
        for entry in walkdir::WalkDir::new(dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("yml") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    prompt_ids.push(stem.to_string());
                }
            }
        }
    }

    prompt_ids.sort();
    prompt_ids.dedup();
    Ok(prompt_ids)
}

fn parse_prompt(contents: &str, origin: &str) -> AppResult<PromptDefinition> {
    let definition: PromptDefinition = serde_yaml::from_str(contents)
        .map_err(|e| AppError::Prompt(format!("Failed to parse prompt YAML {}: {}", origin, e)))?;

    validate_prompt(&definition)?;
    Ok(definition)
}

/// Validate a prompt definition.
fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.title.is_empty() {
        return Err(AppError::Prompt("Prompt title cannot be empty".to_string()));
    }

    if def.template.is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_prompt(dir: &Path, id: &str, valid: bool) {
        let content = if valid {
            format!(
                r#"
id: {}
title: "Custom Prompt"
apiVersion: "1.0"
template: "Q: {{{{question}}}}"
"#,
                id
            )
        } else {
            "invalid: yaml: content:".to_string()
        };

        fs::write(dir.join(format!("{}.yml", id)), content).unwrap();
    }

    #[test]
    fn test_builtins_load() {
        let answer = load_prompt(None, ANSWER_PROMPT_ID).unwrap();
        assert_eq!(answer.id, ANSWER_PROMPT_ID);
        assert!(answer.template.contains("Context:\n{{context}}"));

        let summarize = load_prompt(None, SUMMARIZE_PROMPT_ID).unwrap();
        assert_eq!(
            summarize.system.as_deref(),
            Some("You are a helpful technical summarizer.")
        );
    }

    #[test]
    fn test_override_wins_over_builtin() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(temp_dir.path(), ANSWER_PROMPT_ID, true);

        let prompt = load_prompt(Some(temp_dir.path()), ANSWER_PROMPT_ID).unwrap();
        assert_eq!(prompt.title, "Custom Prompt");
    }

    #[test]
    fn test_missing_override_falls_back_to_builtin() {
        let temp_dir = TempDir::new().unwrap();
        let prompt = load_prompt(Some(temp_dir.path()), SUMMARIZE_PROMPT_ID).unwrap();
        assert_eq!(prompt.id, SUMMARIZE_PROMPT_ID);
    }

    #[test]
    fn test_load_nonexistent_prompt() {
        assert!(load_prompt(None, "nonexistent").is_err());
    }

    #[test]
    fn test_load_invalid_yaml() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(temp_dir.path(), "invalid", false);

        let result = load_prompt(Some(temp_dir.path()), "invalid");
        assert!(matches!(result, Err(AppError::Prompt(_))));
    }

    #[test]
    fn test_list_prompts() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(temp_dir.path(), "custom.one", true);
        write_prompt(temp_dir.path(), ANSWER_PROMPT_ID, true);

        let prompts = list_prompts(Some(temp_dir.path())).unwrap();
        assert_eq!(prompts, vec!["custom.one", "kb.answer", "kb.summarize"]);
    }
}
