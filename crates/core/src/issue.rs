//! Issue records produced by analysis and the project-wide aggregate

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;

pub const DEFAULT_CATEGORY: &str = "general";
pub const DEFAULT_CONFIDENCE: f64 = 0.8;
pub const FILE_ERROR_CATEGORY: &str = "file_error";
pub const FILE_ERROR_TITLE: &str = "File Analysis Error";

/// Severity level of an issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Error, Severity::Warning, Severity::Info];

    /// Case-insensitive parse, no trimming. Anything outside the three levels becomes `Info`.
    pub fn coerce(raw: &str) -> Self {
        match raw.to_lowercase().as_str() {
            "error" => Severity::Error,
            "warning" => Severity::Warning,
            _ => Severity::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single issue reported for a piece of ML code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub severity: Severity,

    /// Short headline
    pub title: String,

    pub description: String,

    #[serde(default = "default_category")]
    pub category: String,

    /// Model confidence in [0, 1]
    #[serde(default = "default_confidence")]
    pub confidence: f64,

    #[serde(default)]
    pub line_numbers: Vec<usize>,

    #[serde(default)]
    pub references: Vec<String>,

    /// Remediation advice
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,

    /// File the issue belongs to, attached by the caller after parsing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,

    /// Any further keys the model returned, kept as-is
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

fn default_confidence() -> f64 {
    DEFAULT_CONFIDENCE
}

impl Issue {
    /// New issue with every optional field at its default.
    pub fn new(severity: Severity, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            severity,
            title: title.into(),
            description: description.into(),
            category: default_category(),
            confidence: DEFAULT_CONFIDENCE,
            line_numbers: Vec::new(),
            references: Vec::new(),
            suggestion: None,
            file: None,
            extra: Map::new(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }
}

/// Aggregate result of analyzing every matching file under a project root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectAnalysis {
    pub project_path: PathBuf,

    /// Files that produced at least one issue, in analysis order
    pub files_analyzed: Vec<PathBuf>,

    pub total_issues: usize,

    pub issues_by_severity: BTreeMap<Severity, usize>,

    /// Per-file issues, including synthetic records for files that could not be read
    pub issues_by_file: BTreeMap<PathBuf, Vec<Issue>>,
}

impl ProjectAnalysis {
    pub fn new(project_path: impl Into<PathBuf>) -> Self {
        Self {
            project_path: project_path.into(),
            files_analyzed: Vec::new(),
            total_issues: 0,
            issues_by_severity: Severity::ALL.iter().map(|s| (*s, 0)).collect(),
            issues_by_file: BTreeMap::new(),
        }
    }

    /// Fold one file's analysis into the aggregate. Empty results are ignored.
    pub fn record_file(&mut self, file: PathBuf, issues: Vec<Issue>) {
        if issues.is_empty() {
            return;
        }
        self.total_issues += issues.len();
        for issue in &issues {
            *self.issues_by_severity.entry(issue.severity).or_insert(0) += 1;
        }
        self.files_analyzed.push(file.clone());
        self.issues_by_file.insert(file, issues);
    }

    /// Record a file that could not be read. Does not count toward the totals.
    pub fn record_failure(&mut self, file: PathBuf, error: impl std::fmt::Display) {
        let issue = Issue::new(
            Severity::Error,
            FILE_ERROR_TITLE,
            format!("Could not analyze file: {}", error),
        )
        .with_category(FILE_ERROR_CATEGORY)
        .with_confidence(1.0)
        .with_file(file.clone());
        self.issues_by_file.insert(file, vec![issue]);
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.issues_by_severity.get(&severity).copied().unwrap_or(0)
    }

    /// Files recorded through [`ProjectAnalysis::record_failure`].
    pub fn file_errors(&self) -> usize {
        self.issues_by_file
            .values()
            .flatten()
            .filter(|i| i.category == FILE_ERROR_CATEGORY && i.title == FILE_ERROR_TITLE)
            .count()
    }

    /// Check whether issues exceed the configured severity threshold.
    /// Unreadable files count as errors here, though not in the totals.
    ///
    /// - `"error"` → fail if errors > 0
    /// - `"warning"` → fail if errors or warnings > 0
    /// - `"info"` → fail if any issues
    /// - `"never"` → always pass
    pub fn exceeds_threshold(&self, fail_on: &str) -> bool {
        exceeds_threshold(
            self.count(Severity::Error) + self.file_errors(),
            self.count(Severity::Warning),
            self.count(Severity::Info),
            fail_on,
        )
    }
}

/// Threshold check shared by single-file and project runs.
pub fn exceeds_threshold(errors: usize, warnings: usize, info: usize, fail_on: &str) -> bool {
    match fail_on {
        "error" => errors > 0,
        "warning" => errors > 0 || warnings > 0,
        "info" => errors > 0 || warnings > 0 || info > 0,
        "never" => false,
        _ => errors > 0, // default to "error" for unknown values
    }
}
