//! Result rendering

pub mod json;
pub mod terminal;

use deepoptimizer_core::{DeepOptimizerConfig, Issue, Severity};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Terminal,
    Json,
}

/// `--format` wins over `[output].format`.
pub fn resolve_format(cli: &crate::Cli, config: &DeepOptimizerConfig) -> Format {
    if let Some(f) = cli.format {
        return match f {
            crate::OutputFormat::Json => Format::Json,
            crate::OutputFormat::Terminal => Format::Terminal,
        };
    }
    match config.output.format.as_str() {
        "json" => Format::Json,
        _ => Format::Terminal,
    }
}

/// `--fail-on` wins over `[output].fail_on`.
pub fn resolve_fail_on(cli: &crate::Cli, config: &DeepOptimizerConfig) -> String {
    cli.fail_on
        .clone()
        .unwrap_or_else(|| config.output.fail_on.clone())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IssueCounts {
    pub errors: usize,
    pub warnings: usize,
    pub info: usize,
}

impl IssueCounts {
    pub fn from_issues(issues: &[Issue]) -> Self {
        let mut counts = Self::default();
        for issue in issues {
            match issue.severity {
                Severity::Error => counts.errors += 1,
                Severity::Warning => counts.warnings += 1,
                Severity::Info => counts.info += 1,
            }
        }
        counts
    }

    pub fn exceeds_threshold(&self, fail_on: &str) -> bool {
        deepoptimizer_core::issue::exceeds_threshold(self.errors, self.warnings, self.info, fail_on)
    }
}
