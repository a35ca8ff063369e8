//! Configuration management for the Knowledge Base Assistant.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Built-in defaults
//! - Config file (`kba.yaml` in the workspace, or `KBA_CONFIG`)
//! - Environment variables
//! - Command-line flags
//!
//! The resulting [`AppConfig`] is passed explicitly to the components that
//! need it; nothing below the binaries reads process state on its own.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Providers the backend knows how to talk to.
pub const KNOWN_PROVIDERS: [&str; 1] = ["openai"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (relative paths resolve against it)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// SQLite database holding the articles
    pub database: PathBuf,

    /// HTTP server settings
    pub server: ServerSettings,

    /// Completion provider settings
    pub llm: LlmSettings,

    /// Context budgeting settings
    pub context: ContextSettings,

    /// Optional directory with prompt definition overrides
    pub prompts_dir: Option<PathBuf>,

    /// Seed for the deterministic sample-data generator
    pub seed: u64,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Socket address to bind, e.g. `127.0.0.1:8000`
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
        }
    }
}

/// Completion provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// Provider identifier (currently only "openai")
    pub provider: String,

    /// Model identifier sent with every completion call
    pub model: String,

    /// Provider credential
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Name of the environment variable the credential is read from
    pub api_key_env: String,

    /// Provider base URL
    pub endpoint: String,

    /// Sampling temperature for both summarization and answering
    pub temperature: f32,

    /// Transport timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            api_key: None,
            api_key_env: "OPENAI_API_KEY".to_string(),
            endpoint: "https://api.openai.com".to_string(),
            temperature: 0.2,
            timeout_secs: 60,
        }
    }
}

impl LlmSettings {
    /// Return the credential or a configuration error naming where it is expected.
    ///
    /// Callers must invoke this before any network activity.
    pub fn require_api_key(&self) -> AppResult<&str> {
        match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(AppError::Config(format!(
                "{} is not set. Put it in your environment or in a .env file.",
                self.api_key_env
            ))),
        }
    }
}

/// Word-based budgeting constants for the context builder.
///
/// Word counts are a rough token proxy: whitespace-separated words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextSettings {
    /// Maximum total words across all included contexts
    pub word_budget: usize,

    /// Chunk size, in words, used when splitting long articles
    pub chunk_words: usize,

    /// Target length, in words, of a per-article summary
    pub summary_target: usize,

    /// Number of top-ranked chunks kept per article
    pub top_chunks: usize,
}

impl Default for ContextSettings {
    fn default() -> Self {
        Self {
            word_budget: 3500,
            chunk_words: 400,
            summary_target: 150,
            top_chunks: 2,
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    workspace: Option<String>,
    database: Option<String>,
    seed: Option<u64>,
    server: Option<ServerFileConfig>,
    llm: Option<LlmFileConfig>,
    context: Option<ContextFileConfig>,
    logging: Option<LoggingConfig>,
    prompts: Option<PromptsConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ServerFileConfig {
    bind: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LlmFileConfig {
    provider: Option<String>,
    model: Option<String>,
    api_key_env: Option<String>,
    endpoint: Option<String>,
    temperature: Option<f32>,
    timeout: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContextFileConfig {
    word_budget: Option<usize>,
    chunk_words: Option<usize>,
    summary_target: Option<usize>,
    top_chunks: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PromptsConfig {
    path: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let workspace = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::with_workspace(workspace)
    }
}

impl AppConfig {
    /// Default configuration rooted at `workspace`.
    pub fn with_workspace(workspace: impl Into<PathBuf>) -> Self {
        let workspace = workspace.into();
        Self {
            database: workspace.join("data").join("knowledge_base.db"),
            workspace,
            config_file: None,
            server: ServerSettings::default(),
            llm: LlmSettings::default(),
            context: ContextSettings::default(),
            prompts_dir: None,
            seed: 42,
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }

    /// Load configuration from the process environment and defaults.
    ///
    /// Environment variables:
    /// - `KBA_WORKSPACE`: Override workspace path
    /// - `KBA_CONFIG`: Path to config file
    /// - `KBA_DATABASE`: SQLite database path
    /// - `KBA_BIND`: Server bind address
    /// - `KBA_PROMPTS_DIR`: Prompt override directory
    /// - `OPENAI_MODEL`: Model identifier
    /// - `OPENAI_BASE_URL`: Provider endpoint
    /// - `OPENAI_API_KEY` (or the configured `apiKeyEnv`): credential
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use kba_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Database: {:?}", config.database);
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Load configuration using `env` as the variable lookup.
    pub fn load_with<F>(env: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(workspace) = env("KBA_WORKSPACE") {
            config = Self::with_workspace(workspace);
        }

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        if let Some(config_file) = env("KBA_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        let config_path = match config.config_file {
            Some(ref cf) => config.resolve(cf),
            None => config.workspace.join("kba.yaml"),
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        } else if config.config_file.is_some() {
            return Err(AppError::Config(format!(
                "Config file not found: {:?}",
                config_path
            )));
        }

        // Environment variables override YAML config
        if let Some(database) = env("KBA_DATABASE") {
            config.database = config.resolve(Path::new(&database));
        }

        if let Some(bind) = env("KBA_BIND") {
            config.server.bind = bind;
        }

        if let Some(dir) = env("KBA_PROMPTS_DIR") {
            config.prompts_dir = Some(config.resolve(Path::new(&dir)));
        }

        if let Some(model) = env("OPENAI_MODEL") {
            config.llm.model = model;
        }

        if let Some(endpoint) = env("OPENAI_BASE_URL") {
            config.llm.endpoint = endpoint;
        }

        config.llm.api_key = env(&config.llm.api_key_env).filter(|k| !k.trim().is_empty());

        if let Some(level) = env("RUST_LOG") {
            config.log_level = Some(level);
        }

        if env("NO_COLOR").is_some() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(ws) = file.workspace {
            result.workspace = PathBuf::from(ws);
            result.database = result.workspace.join("data").join("knowledge_base.db");
        }

        if let Some(database) = file.database {
            result.database = result.resolve(Path::new(&database));
        }

        if let Some(seed) = file.seed {
            result.seed = seed;
        }

        if let Some(bind) = file.server.and_then(|s| s.bind) {
            result.server.bind = bind;
        }

        if let Some(llm) = file.llm {
            if let Some(provider) = llm.provider {
                result.llm.provider = provider;
            }
            if let Some(model) = llm.model {
                result.llm.model = model;
            }
            if let Some(api_key_env) = llm.api_key_env {
                result.llm.api_key_env = api_key_env;
            }
            if let Some(endpoint) = llm.endpoint {
                result.llm.endpoint = endpoint;
            }
            if let Some(temperature) = llm.temperature {
                result.llm.temperature = temperature;
            }
            if let Some(timeout) = llm.timeout {
                result.llm.timeout_secs = timeout;
            }
        }

        if let Some(ctx) = file.context {
            if let Some(v) = ctx.word_budget {
                result.context.word_budget = v;
            }
            if let Some(v) = ctx.chunk_words {
                result.context.chunk_words = v;
            }
            if let Some(v) = ctx.summary_target {
                result.context.summary_target = v;
            }
            if let Some(v) = ctx.top_chunks {
                result.context.top_chunks = v;
            }
        }

        if let Some(logging) = file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        if let Some(path) = file.prompts.and_then(|p| p.path) {
            result.prompts_dir = Some(result.resolve(Path::new(&path)));
        }

        tracing::debug!("Merged config file {:?}", path);
        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over environment variables.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        database: Option<PathBuf>,
        bind: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(database) = database {
            self.database = self.resolve(&database);
        }

        if let Some(bind) = bind {
            self.server.bind = bind;
        }

        if let Some(model) = model {
            self.llm.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Resolve a possibly relative path against the workspace.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace.join(path)
        }
    }

    /// Validate configuration values.
    ///
    /// A missing credential is deliberately not checked here: search works
    /// without one, and [`LlmSettings::require_api_key`] guards completions.
    pub fn validate(&self) -> AppResult<()> {
        let provider = self.llm.provider.to_lowercase();
        if !KNOWN_PROVIDERS.contains(&provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.llm.provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(AppError::Config(format!(
                "Temperature must be within 0.0..=2.0, got {}",
                self.llm.temperature
            )));
        }

        let ctx = &self.context;
        for (name, value) in [
            ("wordBudget", ctx.word_budget),
            ("chunkWords", ctx.chunk_words),
            ("summaryTarget", ctx.summary_target),
            ("topChunks", ctx.top_chunks),
        ] {
            if value == 0 {
                return Err(AppError::Config(format!("context.{} must be positive", name)));
            }
        }

        // a summary longer than the whole budget could never reach the prompt
        if ctx.summary_target > ctx.word_budget {
            return Err(AppError::Config(format!(
                "context.summaryTarget ({}) must not exceed context.wordBudget ({})",
                ctx.summary_target, ctx.word_budget
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::with_workspace("/tmp/ws");
        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.llm.model, "gpt-3.5-turbo");
        assert_eq!(config.context.word_budget, 3500);
        assert_eq!(config.context.chunk_words, 400);
        assert_eq!(config.context.summary_target, 150);
        assert_eq!(config.context.top_chunks, 2);
        assert!(config.database.ends_with("data/knowledge_base.db"));
        assert!(!config.verbose);
    }

    #[test]
    fn test_load_reads_environment() {
        let temp = TempDir::new().unwrap();
        let ws = temp.path().to_string_lossy().to_string();
        let config = AppConfig::load_with(env_of(&[
            ("KBA_WORKSPACE", ws.as_str()),
            ("KBA_DATABASE", "kb.sqlite"),
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_MODEL", "gpt-4o-mini"),
            ("NO_COLOR", "1"),
        ]))
        .unwrap();

        assert_eq!(config.database, temp.path().join("kb.sqlite"));
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert!(config.no_color);
    }

    #[test]
    fn test_blank_api_key_is_treated_as_missing() {
        let temp = TempDir::new().unwrap();
        let ws = temp.path().to_string_lossy().to_string();
        let config = AppConfig::load_with(env_of(&[
            ("KBA_WORKSPACE", ws.as_str()),
            ("OPENAI_API_KEY", "  "),
        ]))
        .unwrap();

        assert!(config.llm.api_key.is_none());
        let err = config.llm.require_api_key().unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_yaml_merge_and_env_precedence() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("kba.yaml"),
            r#"
database: store/articles.db
server:
  bind: 0.0.0.0:9000
llm:
  model: from-yaml
  apiKeyEnv: KB_LLM_KEY
context:
  wordBudget: 1000
  chunkWords: 50
logging:
  level: warn
  color: false
"#,
        )
        .unwrap();

        let ws = temp.path().to_string_lossy().to_string();
        let config = AppConfig::load_with(env_of(&[
            ("KBA_WORKSPACE", ws.as_str()),
            ("OPENAI_MODEL", "from-env"),
            ("KB_LLM_KEY", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.database, temp.path().join("store/articles.db"));
        assert_eq!(config.server.bind, "0.0.0.0:9000");
        assert_eq!(config.llm.model, "from-env");
        assert_eq!(config.llm.api_key.as_deref(), Some("secret"));
        assert_eq!(config.context.word_budget, 1000);
        assert_eq!(config.context.chunk_words, 50);
        assert_eq!(config.context.summary_target, 150);
        assert_eq!(config.log_level.as_deref(), Some("warn"));
        assert!(config.no_color);
    }

    #[test]
    fn test_missing_explicit_config_file_fails() {
        let temp = TempDir::new().unwrap();
        let ws = temp.path().to_string_lossy().to_string();
        let result = AppConfig::load_with(env_of(&[
            ("KBA_WORKSPACE", ws.as_str()),
            ("KBA_CONFIG", "nope.yaml"),
        ]));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::with_workspace("/srv/kb").with_overrides(
            Some(PathBuf::from("other.db")),
            Some("0.0.0.0:8080".to_string()),
            Some("gpt-4".to_string()),
            None,
            true,
            false,
        );

        assert_eq!(config.database, PathBuf::from("/srv/kb/other.db"));
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.llm.model, "gpt-4");
        assert!(config.verbose);
        assert_eq!(config.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_validate_unknown_provider() {
        let mut config = AppConfig::with_workspace("/tmp");
        config.llm.provider = "unknown".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_chunk_size() {
        let mut config = AppConfig::with_workspace("/tmp");
        config.context.chunk_words = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("chunkWords"));
    }

    #[test]
    fn test_validate_rejects_summary_target_over_budget() {
        let mut config = AppConfig::with_workspace("/tmp");
        config.context.word_budget = 100;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert!(err.to_string().contains("summaryTarget (150)"));

        config.context.summary_target = 100;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_accepts_missing_credential() {
        let config = AppConfig::with_workspace("/tmp");
        assert!(config.llm.api_key.is_none());
        assert!(config.validate().is_ok());
    }
}
