//! Turn free-form model output into validated issues
//!
//! Structured JSON is tried first at three levels of looseness. Only when all
//! of them fail does the line-oriented label scan run, and when that finds
//! nothing the whole response becomes a single informational note.

use crate::issue::{Issue, Severity, DEFAULT_CATEGORY, DEFAULT_CONFIDENCE};
use regex::Regex;
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::OnceLock;

pub const REQUIRED_FIELDS: [&str; 3] = ["severity", "title", "description"];
pub const FALLBACK_CONFIDENCE: f64 = 0.6;
pub const NOTES_CONFIDENCE: f64 = 0.5;
pub const NOTES_TITLE: &str = "Analysis Notes";

/// Keys under which some models nest the issue array
const WRAPPER_KEYS: [&str; 4] = ["issues", "findings", "results", "items"];
const MAX_TITLE_CHARS: usize = 100;
const EXCERPT_CHARS: usize = 500;

fn json_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<json>\s*(.*?)\s*</json>").unwrap())
}

fn array_span() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\[.*\]").unwrap())
}

/// Label patterns in priority order (Error → Warning → Info)
fn label_patterns() -> &'static [(Regex, Severity)] {
    static PATTERNS: OnceLock<Vec<(Regex, Severity)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        vec![
            (
                Regex::new(r"(?m)(?:ERROR|CRITICAL):\s*(.+?)(?:\n|$)").unwrap(),
                Severity::Error,
            ),
            (
                Regex::new(r"(?m)(?:WARNING):\s*(.+?)(?:\n|$)").unwrap(),
                Severity::Warning,
            ),
            (
                Regex::new(r"(?m)(?:INFO|SUGGESTION):\s*(.+?)(?:\n|$)").unwrap(),
                Severity::Info,
            ),
        ]
    })
}

/// Parse a model response into issues. Never fails.
pub fn parse_response(response: &str) -> Vec<Issue> {
    let levels = [
        json_tag()
            .captures(response)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str()),
        array_span().find(response).map(|m| m.as_str()),
        Some(response),
    ];

    let mut last_error = String::from("no JSON found");
    for text in levels.into_iter().flatten() {
        match decode_array(text) {
            Ok(items) => return items.iter().filter_map(validate_issue).collect(),
            Err(e) => last_error = e,
        }
    }

    tracing::warn!("JSON parsing error: {}", last_error);
    tracing::warn!(
        "Response excerpt: {}...",
        response.chars().take(EXCERPT_CHARS).collect::<String>()
    );
    fallback_parse(response)
}

/// Decode `text` as an issue array, tolerating code fences and a wrapping object.
pub fn decode_array(text: &str) -> Result<Vec<Value>, String> {
    let value: Value = serde_json::from_str(strip_fences(text)).map_err(|e| e.to_string())?;
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut obj) => WRAPPER_KEYS
            .iter()
            .find_map(|key| match obj.remove(*key) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            })
            .ok_or_else(|| "expected a JSON array of issues, found an object".to_string()),
        other => Err(format!("expected a JSON array of issues, found {}", kind(&other))),
    }
}

fn strip_fences(text: &str) -> &str {
    let text = text.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    text.strip_suffix("```").unwrap_or(text).trim()
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Validate and normalize one decoded element.
///
/// Returns `None` unless it is an object carrying every required field.
pub fn validate_issue(value: &Value) -> Option<Issue> {
    let obj = value.as_object()?;
    if !REQUIRED_FIELDS.iter().all(|k| obj.contains_key(*k)) {
        return None;
    }

    let mut rest: Map<String, Value> = obj.clone();

    let severity = match rest.remove("severity") {
        Some(Value::String(s)) => Severity::coerce(&s),
        _ => Severity::Info,
    };
    let title = text_of(rest.remove("title"));
    let description = text_of(rest.remove("description"));

    let category = match rest.remove("category") {
        Some(Value::String(s)) if !s.trim().is_empty() => s,
        _ => DEFAULT_CATEGORY.to_string(),
    };

    let confidence = rest
        .remove("confidence")
        .and_then(|v| v.as_f64())
        .unwrap_or(DEFAULT_CONFIDENCE)
        .clamp(0.0, 1.0);

    let line_numbers = match rest.remove("line_numbers") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_u64)
            .map(|n| n as usize)
            .collect(),
        Some(Value::Number(n)) => n.as_u64().map(|n| n as usize).into_iter().collect(),
        _ => Vec::new(),
    };

    let references = match rest.remove("references") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) => vec![s],
        _ => Vec::new(),
    };

    let suggestion = match rest.remove("suggestion") {
        Some(Value::String(s)) => Some(s),
        _ => None,
    };

    let file = match rest.remove("file") {
        Some(Value::String(s)) if !s.is_empty() => Some(PathBuf::from(s)),
        _ => None,
    };

    Some(Issue {
        severity,
        title,
        description,
        category,
        confidence,
        line_numbers,
        references,
        suggestion,
        file,
        extra: rest,
    })
}

fn text_of(value: Option<Value>) -> String {
    match value {
        Some(Value::String(s)) => s,
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Label scan used when no structured JSON could be decoded.
///
/// Matches are grouped per label, not interleaved in document order.
pub fn fallback_parse(response: &str) -> Vec<Issue> {
    let mut issues = Vec::new();

    for (regex, severity) in label_patterns() {
        for caps in regex.captures_iter(response) {
            let text = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
            issues.push(
                Issue::new(
                    *severity,
                    text.chars().take(MAX_TITLE_CHARS).collect::<String>(),
                    text,
                )
                .with_confidence(FALLBACK_CONFIDENCE),
            );
        }
    }

    if issues.is_empty() {
        issues.push(
            Issue::new(Severity::Info, NOTES_TITLE, response.trim())
                .with_confidence(NOTES_CONFIDENCE),
        );
    }

    issues
}
