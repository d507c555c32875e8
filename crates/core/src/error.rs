//! Error types for the analysis pipeline

use thiserror::Error;

/// Substrings that mark a remote failure as transient.
pub const RETRYABLE_MARKERS: &[&str] = &[
    "500",
    "Internal",
    "internal error",
    "503",
    "Service Unavailable",
    "429",
    "Resource Exhausted",
    "Deadline Exceeded",
    "timeout",
];

/// Failures of a single generation call, or of the retry loop around it
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The prompt was rejected before generation
    #[error("Response blocked: {0}")]
    Blocked(String),

    /// Generation stopped on a safety finish reason
    #[error("Content generation stopped for safety reasons")]
    SafetyStopped,

    /// The call succeeded but no extraction strategy produced text
    #[error("Unable to extract text from model response")]
    NoText,

    /// Non-success HTTP reply from the service
    #[error("Gemini API error {status}: {body}")]
    Api { status: String, body: String },

    /// Request never produced a reply
    #[error("{0}")]
    Transport(String),

    /// Reply body was not the expected JSON shape
    #[error("Failed to decode model response: {0}")]
    Decode(String),

    #[error("Gemini API error after {attempts} attempt(s): {source}")]
    Exhausted {
        attempts: usize,
        #[source]
        source: Box<GenerateError>,
    },
}

impl GenerateError {
    /// Content-policy failures are never retried.
    pub fn is_content_policy(&self) -> bool {
        matches!(self, GenerateError::Blocked(_) | GenerateError::SafetyStopped)
    }

    /// Whether another attempt is worthwhile.
    pub fn is_retryable(&self) -> bool {
        !self.is_content_policy() && is_retryable_message(&self.to_string())
    }
}

impl From<reqwest::Error> for GenerateError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GenerateError::Transport(format!("Request timeout: {}", err))
        } else if err.is_decode() {
            GenerateError::Decode(err.to_string())
        } else {
            GenerateError::Transport(err.to_string())
        }
    }
}

/// Substring classification of transient failures.
pub fn is_retryable_message(message: &str) -> bool {
    RETRYABLE_MARKERS.iter().any(|m| message.contains(m))
}

/// Configuration resolution failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Gemini API key required. Set GEMINI_API_KEY environment variable, [llm].api_key in .deepoptimizer.toml, or pass --api-key.")]
    MissingApiKey,

    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Toml {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}
