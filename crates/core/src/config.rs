//! Configuration file parsing for .deepoptimizer.toml and environment resolution

use crate::error::ConfigError;
use crate::llm::GenerationConfig;
use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE: &str = ".deepoptimizer.toml";
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const MODEL_ENV: &str = "GEMINI_MODEL";
pub const DEFAULT_MODEL: &str = "gemini-2.5-pro";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const MAX_OUTPUT_TOKENS_CAP: u32 = 32768;

/// Main configuration structure for .deepoptimizer.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeepOptimizerConfig {
    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub project: ProjectConfig,

    /// Free-form project hints folded into every prompt (framework, hardware, ...)
    #[serde(default)]
    pub context: BTreeMap<String, String>,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Gemini model id. `GEMINI_MODEL` takes precedence.
    #[serde(default = "default_model")]
    pub model: String,

    /// API key. `GEMINI_API_KEY` takes precedence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Clamped to 32768
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Client-side request timeout. Unset means wait for the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,

    /// Delay before the 2nd, 3rd, ... attempt
    #[serde(default = "default_delays")]
    pub delays_secs: Vec<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Glob patterns relative to the project root
    #[serde(default = "default_patterns")]
    pub patterns: Vec<String>,

    /// Directory names excluded on top of the built-in set
    #[serde(default)]
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default output format
    #[serde(default = "default_format")]
    pub format: String,

    /// Severity threshold for non-zero exit code
    #[serde(default = "default_fail_on")]
    pub fail_on: String,
}

// Default functions
fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_top_p() -> f32 {
    0.9
}

fn default_max_output_tokens() -> u32 {
    MAX_OUTPUT_TOKENS_CAP
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_max_attempts() -> usize {
    3
}

fn default_delays() -> Vec<u64> {
    vec![30, 60, 120]
}

fn default_patterns() -> Vec<String> {
    vec!["**/*.py".to_string()]
}

fn default_format() -> String {
    "terminal".to_string()
}

fn default_fail_on() -> String {
    "never".to_string()
}

impl Default for DeepOptimizerConfig {
    fn default() -> Self {
        toml::from_str("").expect("empty TOML should parse to defaults")
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key: None,
            temperature: default_temperature(),
            top_p: default_top_p(),
            max_output_tokens: default_max_output_tokens(),
            base_url: default_base_url(),
            request_timeout_secs: None,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delays_secs: default_delays(),
        }
    }
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            patterns: default_patterns(),
            exclude: Vec::new(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            fail_on: default_fail_on(),
        }
    }
}

impl DeepOptimizerConfig {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Toml {
            path: path.display().to_string(),
            source,
        })
    }

    /// Find and load .deepoptimizer.toml from the given directory or its ancestors
    pub fn find_and_load(start_dir: &Path) -> Result<Self, ConfigError> {
        let mut current = start_dir;

        loop {
            let config_path = current.join(CONFIG_FILE);
            if config_path.exists() {
                tracing::debug!("loading config from {}", config_path.display());
                return Self::from_file(&config_path);
            }

            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }

        // No config found, use defaults
        Ok(Self::default())
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}

/// Values given explicitly by the caller, winning over env and file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_key: Option<String>,
    pub model: Option<String>,
}

/// Everything the pipeline needs, resolved once at construction.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub generation: GenerationConfig,
    pub retry: RetryPolicy,
    pub request_timeout: Option<Duration>,
    pub excluded_dirs: Vec<String>,
    pub context: BTreeMap<String, String>,
}

impl ResolvedConfig {
    /// Resolve against the process environment.
    pub fn resolve(config: &DeepOptimizerConfig, overrides: Overrides) -> Result<Self, ConfigError> {
        Self::resolve_with(config, overrides, |name| std::env::var(name).ok())
    }

    /// Resolve with an explicit environment lookup.
    ///
    /// Precedence: explicit override, then environment, then config file.
    pub fn resolve_with<F>(
        config: &DeepOptimizerConfig,
        overrides: Overrides,
        env: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

        let api_key = non_empty(overrides.api_key)
            .or_else(|| non_empty(env(API_KEY_ENV)))
            .or_else(|| non_empty(config.llm.api_key.clone()))
            .ok_or(ConfigError::MissingApiKey)?;

        let model = non_empty(overrides.model)
            .or_else(|| non_empty(env(MODEL_ENV)))
            .unwrap_or_else(|| config.llm.model.clone());

        let generation = GenerationConfig {
            temperature: config.llm.temperature,
            top_p: config.llm.top_p,
            max_output_tokens: config.llm.max_output_tokens.min(MAX_OUTPUT_TOKENS_CAP),
        };

        let retry = RetryPolicy::new(
            config.retry.max_attempts,
            config
                .retry
                .delays_secs
                .iter()
                .map(|s| Duration::from_secs(*s))
                .collect(),
        );

        Ok(Self {
            api_key,
            model,
            base_url: config.llm.base_url.trim_end_matches('/').to_string(),
            generation,
            retry,
            request_timeout: config.llm.request_timeout_secs.map(Duration::from_secs),
            excluded_dirs: config.project.exclude.clone(),
            context: config.context.clone(),
        })
    }
}

/// Load the first `.env` found in `start`, its parent, or its grandparent.
///
/// Variables already set in the process are left alone. Returns the loaded file.
pub fn load_dotenv(start: &Path) -> Option<PathBuf> {
    for rel in [".", "..", "../.."] {
        let candidate = start.join(rel).join(".env");
        if candidate.is_file() {
            if let Err(e) = dotenv::from_path(&candidate) {
                tracing::debug!("ignoring unreadable {}: {}", candidate.display(), e);
            }
            return Some(candidate);
        }
    }
    None
}
