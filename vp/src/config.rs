//! vidprompt configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::Language;

/// Main vidprompt configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Generative backend configuration
    pub llm: LlmConfig,

    /// History persistence
    pub history: HistoryConfig,

    /// Prompt template overrides
    pub prompts: PromptsConfig,

    /// Default output language
    pub language: Language,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Fails fast when no API key can be resolved.
    pub fn validate(&self) -> Result<()> {
        self.llm.get_api_key().map(|_| ())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        for candidate in Self::default_paths() {
            if candidate.exists() {
                match Self::load_from_file(&candidate) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", candidate.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only the log level, before logging is initialized
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let path = match config_path {
            Some(p) => p.clone(),
            None => Self::default_paths().into_iter().find(|p| p.exists())?,
        };
        let content = fs::read_to_string(path).ok()?;
        let config: Self = serde_yaml::from_str(&content).ok()?;
        config.log_level
    }

    /// Project-local config first, then the user config directory
    fn default_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(".vidprompt.yml")];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("vidprompt").join("vidprompt.yml"));
        }
        paths
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Generative backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name ("gemini" or "openai")
    pub provider: String,

    /// Model identifier used for full-brief generation and translation
    pub model: String,

    /// Model used for single-field suggestions (defaults to `model`)
    #[serde(rename = "suggestion-model")]
    pub suggestion_model: Option<String>,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// File containing the API key (used when the variable is unset)
    #[serde(rename = "api-key-file")]
    pub api_key_file: Option<PathBuf>,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum output tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: "gemini-2.5-flash".to_string(),
            suggestion_model: None,
            api_key_env: "GEMINI_API_KEY".to_string(),
            api_key_file: None,
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            max_tokens: 8192,
            timeout_ms: 120_000,
        }
    }
}

impl LlmConfig {
    /// Resolve the API key from the environment, then from the key file
    pub fn get_api_key(&self) -> Result<String> {
        if let Ok(key) = std::env::var(&self.api_key_env)
            && !key.trim().is_empty()
        {
            return Ok(key.trim().to_string());
        }

        if let Some(path) = &self.api_key_file {
            let expanded = expand_home(path);
            let key = fs::read_to_string(&expanded)
                .context(format!("Failed to read API key file {}", expanded.display()))?;
            let key = key.trim().to_string();
            if !key.is_empty() {
                return Ok(key);
            }
        }

        Err(eyre::eyre!(
            "LLM API key not found. Set the {} environment variable or api-key-file.",
            self.api_key_env
        ))
    }

    /// Model used for suggestions
    pub fn suggestion_model(&self) -> &str {
        self.suggestion_model.as_deref().unwrap_or(&self.model)
    }
}

/// History persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Directory backing the local key-value store
    pub dir: PathBuf,

    /// Maximum retained entries
    #[serde(rename = "max-entries")]
    pub max_entries: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        // XDG data directory (~/.local/share/vidprompt on Linux)
        let dir = dirs::data_dir()
            .map(|d| d.join("vidprompt"))
            .unwrap_or_else(|| PathBuf::from(".vidprompt"));

        Self {
            dir,
            max_entries: crate::history::MAX_HISTORY_ENTRIES,
        }
    }
}

impl HistoryConfig {
    pub fn expanded_dir(&self) -> PathBuf {
        expand_home(&self.dir)
    }
}

/// Prompt template override configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    /// Directory searched for `{name}.pmt` overrides
    pub dir: Option<PathBuf>,
}

impl PromptsConfig {
    pub fn expanded_dir(&self) -> Option<PathBuf> {
        self.dir.as_deref().map(expand_home)
    }
}

/// Resolve a leading `~/`
fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir().map(|home| home.join(rest)).unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}
