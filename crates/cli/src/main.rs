//! DeepOptimizer CLI - LLM-backed ML code analysis

use anyhow::Result;
use clap::Parser;
use deepoptimizer_cli::{commands, logging, Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let failed = match &cli.command {
        Commands::Analyze { file } => commands::analyze::run(file, &cli)?,
        Commands::Project { path, patterns } => {
            commands::project::run(path.as_deref(), patterns, &cli)?
        }
        Commands::Init { path } => {
            commands::init::run(path.as_deref())?;
            false
        }
    };

    if failed {
        std::process::exit(1);
    }

    Ok(())
}
