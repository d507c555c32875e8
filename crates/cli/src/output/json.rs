//! JSON output formatting

use super::IssueCounts;
use deepoptimizer_core::{Issue, ProjectAnalysis};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Single-file result.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    pub issues: Vec<Issue>,
    pub summary: JsonSummary,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonSummary {
    pub errors: usize,
    pub warnings: usize,
    pub info: usize,
}

impl From<IssueCounts> for JsonSummary {
    fn from(c: IssueCounts) -> Self {
        Self {
            errors: c.errors,
            warnings: c.warnings,
            info: c.info,
        }
    }
}

pub fn render_issues(file: Option<PathBuf>, issues: &[Issue]) -> serde_json::Result<String> {
    let out = JsonOutput {
        file,
        issues: issues.to_vec(),
        summary: IssueCounts::from_issues(issues).into(),
    };
    serde_json::to_string_pretty(&out)
}

pub fn render_project(analysis: &ProjectAnalysis) -> serde_json::Result<String> {
    serde_json::to_string_pretty(analysis)
}
