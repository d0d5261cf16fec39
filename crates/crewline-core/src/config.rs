//! Configuration management
//!
//! Settings are resolved in this order of precedence:
//! 1. Environment variables
//! 2. `crewline.toml` configuration file
//! 3. Defaults
//!
//! `${VAR_NAME}` references inside the configuration file are expanded from
//! the environment before parsing.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::agents::RosterKind;
use crate::Error;

/// LLM Provider type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Anthropic Messages API
    Claude,
    /// OpenAI-compatible Chat Completions API
    #[default]
    OpenAi,
}

impl LlmProvider {
    fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "claude" | "anthropic" => LlmProvider::Claude,
            _ => LlmProvider::OpenAi,
        }
    }
}

/// LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API key
    pub api_key: String,

    /// Model to use
    #[serde(default = "default_model")]
    pub model: String,

    /// API provider
    #[serde(default)]
    pub provider: LlmProvider,

    /// Base URL (optional, for custom endpoints)
    pub base_url: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            provider: LlmProvider::OpenAi,
            base_url: None,
        }
    }
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

/// Orchestration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Specialist roster to register at start-up
    #[serde(default)]
    pub roster: RosterKind,

    /// Maximum number of re-delegations for a single subtask
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Token budget for each completion request
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            roster: RosterKind::default(),
            max_depth: default_max_depth(),
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_max_depth() -> usize {
    5
}

fn default_max_tokens() -> u64 {
    4096
}

/// Which backend persists conversation contexts
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// One JSON file per session id
    #[default]
    File,
    /// SQLite database
    Sqlite,
}

impl StoreKind {
    fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "sqlite" | "db" => StoreKind::Sqlite,
            _ => StoreKind::File,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub store: StoreKind,

    /// Directory for the file store
    #[serde(default = "default_session_dir")]
    pub dir: String,

    /// Path to SQLite database file
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Turns kept in a conversation context
    #[serde(default = "default_max_context_turns")]
    pub max_context_turns: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            store: StoreKind::default(),
            dir: default_session_dir(),
            db_path: default_db_path(),
            max_context_turns: default_max_context_turns(),
        }
    }
}

fn default_session_dir() -> String {
    "sessions".to_string()
}

fn default_db_path() -> String {
    "data/crewline.db".to_string()
}

fn default_max_context_turns() -> usize {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ToolsConfig {
    /// SerpAPI key used by the web search tools
    pub serpapi_key: Option<String>,
}

/// Main configuration for crewline
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub orchestrator: OrchestratorConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub tools: ToolsConfig,
}

impl Config {
    /// Expand `${VAR_NAME}` references with environment values.
    ///
    /// Unknown variables expand to the empty string.
    fn expand_env_vars(value: &str) -> String {
        let mut result = String::new();
        let mut chars = value.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '$' && chars.peek() == Some(&'{') {
                chars.next();

                let mut var_name = String::new();
                for c in chars.by_ref() {
                    if c == '}' {
                        break;
                    }
                    var_name.push(c);
                }

                if let Ok(env_value) = std::env::var(&var_name) {
                    result.push_str(&env_value);
                }
            } else {
                result.push(c);
            }
        }

        result
    }

    /// Load configuration from a TOML file, then apply environment overrides.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();

        let toml_content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let mut cfg = Self::from_toml_str(&toml_content)?;
        cfg.apply_env_overrides();

        Ok(cfg)
    }

    /// Parse a TOML document (after `${VAR}` expansion) without env overrides.
    pub fn from_toml_str(content: &str) -> crate::Result<Self> {
        let expanded_content = Self::expand_env_vars(content);

        let config: TomlConfig = toml::from_str(&expanded_content)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))?;

        Ok(Self::from_toml_config(config))
    }

    /// Load from `./crewline.toml` if it exists, otherwise from the environment.
    pub fn load() -> crate::Result<Self> {
        if Path::new("crewline.toml").exists() {
            return Self::from_toml_file("crewline.toml");
        }

        Self::from_env()
    }

    fn from_toml_config(toml: TomlConfig) -> Self {
        let llm = toml.llm.unwrap_or_default();
        let llm_config = LlmConfig {
            api_key: llm.api_key.unwrap_or_default(),
            model: llm.model.unwrap_or_else(default_model),
            provider: llm
                .provider
                .map(|p| LlmProvider::parse(&p))
                .unwrap_or_default(),
            base_url: llm.base_url,
        };

        let orchestrator = toml.orchestrator.unwrap_or_default();
        let orchestrator_config = OrchestratorConfig {
            roster: orchestrator
                .roster
                .and_then(|r| RosterKind::parse(&r))
                .unwrap_or_default(),
            max_depth: orchestrator.max_depth.unwrap_or_else(default_max_depth),
            max_tokens: orchestrator.max_tokens.unwrap_or_else(default_max_tokens),
        };

        let session = toml.session.unwrap_or_default();
        let session_config = SessionConfig {
            store: session
                .store
                .map(|s| StoreKind::parse(&s))
                .unwrap_or_default(),
            dir: session.dir.unwrap_or_else(default_session_dir),
            db_path: session.db_path.unwrap_or_else(default_db_path),
            max_context_turns: session
                .max_context_turns
                .unwrap_or_else(default_max_context_turns),
        };

        let tools = toml.tools.unwrap_or_default();

        Config {
            llm: llm_config,
            orchestrator: orchestrator_config,
            session: session_config,
            tools: ToolsConfig {
                serpapi_key: tools.serpapi_key.filter(|k| !k.is_empty()),
            },
        }
    }

    /// Override settings from environment variables
    fn apply_env_overrides(&mut self) {
        if let Some(api_key) = first_env(&["LLM_API_KEY", "OPENAI_API_KEY", "CLAUDE_API_KEY"]) {
            self.llm.api_key = api_key;
        }
        if let Some(model) = first_env(&["LLM_MODEL", "OPENAI_MODEL"]) {
            self.llm.model = model;
        }
        if let Some(provider) = first_env(&["LLM_PROVIDER"]) {
            self.llm.provider = LlmProvider::parse(&provider);
        }
        if let Some(base_url) = first_env(&["LLM_BASE_URL"]) {
            self.llm.base_url = Some(base_url);
        }

        if let Some(roster) = first_env(&["CREWLINE_ROSTER"]).and_then(|r| RosterKind::parse(&r)) {
            self.orchestrator.roster = roster;
        }
        if let Some(depth) = first_env(&["CREWLINE_MAX_DEPTH"]).and_then(|d| d.parse().ok()) {
            self.orchestrator.max_depth = depth;
        }

        if let Some(store) = first_env(&["SESSION_STORE"]) {
            self.session.store = StoreKind::parse(&store);
        }
        if let Some(dir) = first_env(&["SESSION_DIR"]) {
            self.session.dir = dir;
        }
        if let Some(path) = first_env(&["DB_PATH"]) {
            self.session.db_path = path;
        }

        if let Some(key) = first_env(&["SERPAPI_KEY"]) {
            self.tools.serpapi_key = Some(key);
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut cfg = Config::default();
        cfg.apply_env_overrides();

        if cfg.llm.api_key.is_empty() {
            return Err(Error::Config(
                "LLM_API_KEY or OPENAI_API_KEY not set".to_string(),
            ));
        }

        Ok(cfg)
    }
}

/// First non-empty value among the given environment variables
fn first_env(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| !value.is_empty())
}

// ============================================================================
// TOML file structures
// ============================================================================

#[derive(Debug, Deserialize)]
struct TomlConfig {
    llm: Option<TomlLlmConfig>,
    orchestrator: Option<TomlOrchestratorConfig>,
    session: Option<TomlSessionConfig>,
    tools: Option<TomlToolsConfig>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlLlmConfig {
    /// "openai" or "claude"
    #[serde(default)]
    provider: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    base_url: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlOrchestratorConfig {
    /// "general" or "wealth_advisory"
    roster: Option<String>,
    max_depth: Option<usize>,
    max_tokens: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlSessionConfig {
    /// "file" or "sqlite"
    store: Option<String>,
    dir: Option<String>,
    db_path: Option<String>,
    max_context_turns: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlToolsConfig {
    serpapi_key: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_config_default() {
        let config = LlmConfig::default();
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.provider, LlmProvider::OpenAi);
        assert!(config.api_key.is_empty());
        assert!(config.base_url.is_none());
    }

    #[test]
    fn test_orchestrator_config_default() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.max_depth, 5);
        assert_eq!(config.roster, RosterKind::General);
    }

    #[test]
    fn test_session_config_default() {
        let config = SessionConfig::default();
        assert_eq!(config.store, StoreKind::File);
        assert_eq!(config.dir, "sessions");
        assert_eq!(config.db_path, "data/crewline.db");
        assert_eq!(config.max_context_turns, 10);
    }

    #[test]
    fn test_provider_parse() {
        assert_eq!(LlmProvider::parse("Claude"), LlmProvider::Claude);
        assert_eq!(LlmProvider::parse("anthropic"), LlmProvider::Claude);
        assert_eq!(LlmProvider::parse("openai"), LlmProvider::OpenAi);
        assert_eq!(LlmProvider::parse("glm"), LlmProvider::OpenAi);
    }

    #[test]
    fn test_expand_env_vars() {
        unsafe {
            std::env::set_var("CREWLINE_TEST_VAR", "test_value");
        }

        let result = Config::expand_env_vars("prefix_${CREWLINE_TEST_VAR}_suffix");
        assert_eq!(result, "prefix_test_value_suffix");

        let result = Config::expand_env_vars("prefix_${CREWLINE_NONEXISTENT_VAR}_suffix");
        assert_eq!(result, "prefix__suffix");

        unsafe {
            std::env::remove_var("CREWLINE_TEST_VAR");
        }
    }

    #[test]
    fn test_expand_env_vars_no_braces() {
        assert_eq!(Config::expand_env_vars("no_vars_here"), "no_vars_here");
        assert_eq!(Config::expand_env_vars("cost: $5"), "cost: $5");
    }

    #[test]
    fn test_toml_config_parsing() {
        let toml_content = r#"
[llm]
provider = "claude"
model = "claude-sonnet-4-20250514"
api_key = "test_key"
base_url = "https://api.example.com"

[orchestrator]
roster = "wealth_advisory"
max_depth = 3

[session]
store = "sqlite"
db_path = "/path/to/db"
max_context_turns = 4

[tools]
serpapi_key = "serp"
"#;

        let config = Config::from_toml_str(toml_content).unwrap();

        assert_eq!(config.llm.provider, LlmProvider::Claude);
        assert_eq!(config.llm.model, "claude-sonnet-4-20250514");
        assert_eq!(config.llm.api_key, "test_key");
        assert_eq!(config.llm.base_url.as_deref(), Some("https://api.example.com"));

        assert_eq!(config.orchestrator.roster, RosterKind::WealthAdvisory);
        assert_eq!(config.orchestrator.max_depth, 3);
        assert_eq!(config.orchestrator.max_tokens, 4096);

        assert_eq!(config.session.store, StoreKind::Sqlite);
        assert_eq!(config.session.db_path, "/path/to/db");
        assert_eq!(config.session.dir, "sessions");
        assert_eq!(config.session.max_context_turns, 4);

        assert_eq!(config.tools.serpapi_key.as_deref(), Some("serp"));
    }

    #[test]
    fn test_toml_unknown_roster_falls_back_to_default() {
        let config = Config::from_toml_str("[orchestrator]\nroster = \"pirates\"\n").unwrap();
        assert_eq!(config.orchestrator.roster, RosterKind::General);
    }

    #[test]
    fn test_toml_parse_error() {
        let result = Config::from_toml_str("[llm\nmodel = 1");
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
