//! Prompts command handler.

use clap::Args;
use kba_core::{config::AppConfig, AppResult};
use kba_prompt::{list_prompts, load_prompt};
use std::path::Path;

/// List the prompt definitions in effect
#[derive(Args, Debug)]
pub struct PromptsCommand {}

impl PromptsCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        for line in prompt_lines(config.prompts_dir.as_deref())? {
            println!("{}", line);
        }
        Ok(())
    }
}

/// One `id  title  (source)` line per prompt, overrides marked by their directory.
fn prompt_lines(prompts_dir: Option<&Path>) -> AppResult<Vec<String>> {
    list_prompts(prompts_dir)?
        .into_iter()
        .map(|id| {
            let definition = load_prompt(prompts_dir, &id)?;
            let overridden = prompts_dir
                .map(|dir| dir.join(format!("{}.yml", id)).exists())
                .unwrap_or(false);
            let source = if overridden { "override" } else { "built-in" };
            Ok(format!("{}  {}  ({})", id, definition.title, source))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_prompts_listed() {
        let lines = prompt_lines(None).unwrap();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("kb.answer  "));
        assert!(lines[0].ends_with("(built-in)"));
        assert!(lines[1].starts_with("kb.summarize  "));
    }

    #[test]
    fn test_override_is_marked() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("kb.answer.yml"),
            "id: kb.answer\ntitle: Team answer\napiVersion: \"1.0\"\ntemplate: \"{{question}}\"\n",
        )
        .unwrap();

        let lines = prompt_lines(Some(dir.path())).unwrap();
        assert_eq!(lines[0], "kb.answer  Team answer  (override)");
        assert!(lines[1].ends_with("(built-in)"));
    }
}
