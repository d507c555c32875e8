//! Terminal output formatting

use super::IssueCounts;
use colored::Colorize;
use deepoptimizer_core::{Issue, Severity};
use std::path::Path;

pub fn severity_icon(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "❌",
        Severity::Warning => "⚠️ ",
        Severity::Info => "ℹ️ ",
    }
}

/// `file:4,7`, `file`, `lines 4,7`, or empty when neither is known.
pub fn format_location(issue: &Issue, root: Option<&Path>) -> String {
    let lines = issue
        .line_numbers
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(",");

    match &issue.file {
        Some(file) => {
            let shown = root
                .and_then(|r| file.strip_prefix(r).ok())
                .unwrap_or(file)
                .display()
                .to_string();
            if lines.is_empty() {
                shown
            } else {
                format!("{}:{}", shown, lines)
            }
        }
        None if lines.is_empty() => String::new(),
        None => format!("lines {}", lines),
    }
}

pub fn format_issue(issue: &Issue, root: Option<&Path>) -> String {
    let mut out = format!(
        "  {} {} {}",
        severity_icon(issue.severity),
        issue.title.bold(),
        format!(
            "[{} \u{00b7} {:.0}%]",
            issue.category,
            issue.confidence * 100.0
        )
        .dimmed()
    );

    let location = format_location(issue, root);
    if !location.is_empty() {
        out.push_str(&format!("\n     {}", location.cyan()));
    }
    for line in issue.description.lines() {
        out.push_str(&format!("\n     {}", line));
    }
    if let Some(suggestion) = &issue.suggestion {
        out.push_str(&format!("\n     {} {}", "\u{2192}".green(), suggestion));
    }
    for reference in &issue.references {
        out.push_str(&format!("\n     {} {}", "ref:".dimmed(), reference));
    }
    out
}

pub fn format_counts(counts: &IssueCounts) -> String {
    format!(
        "  {} \u{00b7} {} \u{00b7} {}",
        format!("{} error(s)", counts.errors).red(),
        format!("{} warning(s)", counts.warnings).yellow(),
        format!("{} info", counts.info).blue()
    )
}

/// Issues in severity order, then the summary rule and counts.
pub fn print_issues(issues: &[Issue], root: Option<&Path>) {
    let mut sorted: Vec<&Issue> = issues.iter().collect();
    sorted.sort_by_key(|i| i.severity);

    println!();
    for issue in &sorted {
        println!("{}", format_issue(issue, root));
        println!();
    }
    if issues.is_empty() {
        println!("  {}", "No issues found.".green());
        println!();
    }
}

pub fn print_summary(counts: &IssueCounts, files_with_issues: Option<usize>, elapsed_secs: f64) {
    println!("  {}", "\u{2500}".repeat(60).dimmed());
    println!("{}", format_counts(counts));
    if let Some(n) = files_with_issues {
        println!("  {} file(s) with issues", n);
    }
    println!("  Time: {:.1}s", elapsed_secs);
}
