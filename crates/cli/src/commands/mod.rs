//! CLI commands

pub mod analyze;
pub mod init;
pub mod project;

use anyhow::{Context, Result};
use deepoptimizer_core::{
    load_dotenv, Analyzer, DeepOptimizerConfig, Overrides, ProjectContext, ResolvedConfig,
};
use std::path::Path;

/// Everything a command needs after config resolution.
pub struct Session {
    pub config: DeepOptimizerConfig,
    pub model: String,
    pub analyzer: Analyzer,
}

/// Load `.env` from the working directory and `.deepoptimizer.toml` from
/// `config_dir` upwards, apply command-line overrides, and build the
/// Gemini-backed analyzer.
pub fn open_session(config_dir: &Path, cli: &crate::Cli) -> Result<Session> {
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    open_session_in(config_dir, &cwd, cli)
}

/// [`open_session`] with an explicit directory for the `.env` search.
pub fn open_session_in(config_dir: &Path, env_dir: &Path, cli: &crate::Cli) -> Result<Session> {
    if let Some(env_file) = load_dotenv(env_dir) {
        tracing::debug!("loaded environment from {}", env_file.display());
    }

    let config = DeepOptimizerConfig::find_and_load(config_dir)?;
    let overrides = Overrides {
        api_key: cli.api_key.clone(),
        model: cli.model.clone(),
    };
    let resolved = ResolvedConfig::resolve(&config, overrides)?;

    let context = merged_context(&resolved.context, &cli.project_context());
    let analyzer = Analyzer::from_config(&resolved)
        .context("Failed to create Gemini client")?
        .with_context(context);

    Ok(Session {
        config,
        model: resolved.model,
        analyzer,
    })
}

/// File-level context overlaid with command-line context.
pub fn merged_context(base: &ProjectContext, cli: &ProjectContext) -> ProjectContext {
    let mut merged = base.clone();
    merged.extend(cli.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}
