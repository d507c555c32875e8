//! DeepOptimizer CLI library, exposed for integration tests

pub mod commands;
pub mod logging;
pub mod output;
pub mod progress;

use clap::{Parser, Subcommand};
use deepoptimizer_core::ProjectContext;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "deepoptimizer")]
#[command(about = "Find correctness and performance bugs in ML code with Gemini", long_about = None)]
#[command(version = deepoptimizer_core::VERSION)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, value_enum, global = true)]
    pub format: Option<OutputFormat>,

    /// Gemini model id (overrides GEMINI_MODEL)
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Gemini API key (overrides GEMINI_API_KEY)
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// ML framework in use, e.g. pytorch, tensorflow, jax
    #[arg(long, global = true)]
    pub framework: Option<String>,

    /// Target hardware, e.g. "A100", "TPU v4", "cpu"
    #[arg(long, global = true)]
    pub hardware: Option<String>,

    /// Extra project context, repeatable
    #[arg(long = "context", value_name = "KEY=VALUE", value_parser = parse_key_val, global = true)]
    pub context: Vec<(String, String)>,

    /// Severity threshold for non-zero exit: error, warning, info, never.
    /// Unreadable project files count as errors.
    #[arg(long, global = true)]
    pub fail_on: Option<String>,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a single file ("-" reads stdin)
    Analyze {
        /// File to analyze
        file: PathBuf,
    },

    /// Analyze every matching file in a project
    Project {
        /// Project root (default: current directory)
        path: Option<PathBuf>,

        /// Glob pattern relative to the root, repeatable (default: **/*.py)
        #[arg(long = "pattern", value_name = "GLOB")]
        patterns: Vec<String>,
    },

    /// Initialize .deepoptimizer.toml configuration
    Init {
        /// Path to initialize (default: current directory)
        path: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Terminal,
    Json,
}

/// Parse a `KEY=VALUE` pair.
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no `=` found in `{}`", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("invalid KEY=VALUE: empty key in `{}`", s));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

impl Cli {
    /// Context given on the command line. `--framework`/`--hardware` win over `--context`.
    pub fn project_context(&self) -> ProjectContext {
        let mut ctx: ProjectContext = self.context.iter().cloned().collect();
        if let Some(f) = &self.framework {
            ctx.insert("framework".to_string(), f.clone());
        }
        if let Some(h) = &self.hardware {
            ctx.insert("hardware".to_string(), h.clone());
        }
        ctx
    }
}
