//! Initialize .deepoptimizer.toml configuration

use anyhow::Result;
use deepoptimizer_core::config::{API_KEY_ENV, CONFIG_FILE};
use deepoptimizer_core::DeepOptimizerConfig;
use std::path::{Path, PathBuf};

/// Write the default config. Returns the path, or `None` when one already exists.
pub fn write_default(path: Option<&Path>) -> Result<Option<PathBuf>> {
    let target_path = path.unwrap_or_else(|| Path::new("."));
    let config_path = target_path.join(CONFIG_FILE);

    if config_path.exists() {
        return Ok(None);
    }

    DeepOptimizerConfig::default().save(&config_path)?;
    Ok(Some(config_path))
}

pub fn run(path: Option<&Path>) -> Result<()> {
    match write_default(path)? {
        None => {
            let existing = path.unwrap_or_else(|| Path::new(".")).join(CONFIG_FILE);
            println!("⚠️  {} already exists at {:?}", CONFIG_FILE, existing);
        }
        Some(config_path) => {
            println!("✅ Created {} at {:?}", CONFIG_FILE, config_path);
            println!("\nSet {} (or add it to .env), then run:", API_KEY_ENV);
            println!("  deepoptimizer analyze train.py");
            println!("  deepoptimizer project .");
        }
    }

    Ok(())
}
