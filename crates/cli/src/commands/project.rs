//! Analyze every matching file in a project

use anyhow::Result;
use colored::Colorize;
use deepoptimizer_core::{Issue, ProjectAnalysis, Severity};
use std::path::Path;
use std::time::Instant;

use crate::output::{self, Format, IssueCounts};
use crate::progress::create_progress_bar;

/// Returns `true` when the `--fail-on` threshold is exceeded.
pub fn run(path: Option<&Path>, patterns: &[String], cli: &crate::Cli) -> Result<bool> {
    let start = Instant::now();
    let root = path.unwrap_or_else(|| Path::new("."));

    let session = super::open_session(root, cli)?;
    let format = output::resolve_format(cli, &session.config);
    let fail_on = output::resolve_fail_on(cli, &session.config);

    let patterns = if patterns.is_empty() {
        session.config.project.patterns.clone()
    } else {
        patterns.to_vec()
    };

    eprintln!(
        "  {} {} ({})",
        "Analyzing project".bold(),
        root.display(),
        patterns.join(", ")
    );

    let pb = create_progress_bar(0, "Analyzing");
    let analysis = session
        .analyzer
        .analyze_project_with(root, Some(&patterns[..]), |done, total, file| {
            pb.set_length(total as u64);
            pb.set_position(done as u64);
            let shown = file.strip_prefix(root).unwrap_or(file);
            pb.set_message(shown.display().to_string());
        });
    pb.finish_and_clear();
    let analysis = analysis?;

    match format {
        Format::Json => println!("{}", output::json::render_project(&analysis)?),
        Format::Terminal => print_terminal(&analysis, root, start),
    }

    Ok(analysis.exceeds_threshold(&fail_on))
}

fn print_terminal(analysis: &ProjectAnalysis, root: &Path, start: Instant) {
    let issues: Vec<Issue> = analysis
        .issues_by_file
        .values()
        .flatten()
        .cloned()
        .collect();
    output::terminal::print_issues(&issues, Some(root));

    let counts = IssueCounts {
        errors: analysis.count(Severity::Error),
        warnings: analysis.count(Severity::Warning),
        info: analysis.count(Severity::Info),
    };
    output::terminal::print_summary(
        &counts,
        Some(analysis.files_analyzed.len()),
        start.elapsed().as_secs_f64(),
    );
}
