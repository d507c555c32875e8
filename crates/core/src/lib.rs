//! DeepOptimizer Core - LLM-backed analysis of machine-learning code
//!
//! This crate provides the analysis pipeline behind the `deepoptimizer` CLI:
//! - Prompt construction from code plus project context
//! - Gemini `generateContent` calls with bounded retry over transient failures
//! - Response parsing into validated issues, with a text fallback
//! - Project-wide walks aggregating issues by severity and file

pub mod analyzer;
pub mod config;
pub mod discovery;
pub mod error;
pub mod issue;
pub mod llm;
pub mod parse;
pub mod prompt;
pub mod retry;

pub use analyzer::Analyzer;
pub use config::{load_dotenv, DeepOptimizerConfig, Overrides, ResolvedConfig};
pub use discovery::collect_files;
pub use error::{ConfigError, GenerateError};
pub use issue::{Issue, ProjectAnalysis, Severity};
pub use llm::{ContentGenerator, GeminiClient, GenerateContentResponse, GenerationConfig};
pub use parse::parse_response;
pub use prompt::{ProjectContext, PromptBuilder};
pub use retry::{RetryPolicy, Sleeper, ThreadSleeper};

/// DeepOptimizer version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
