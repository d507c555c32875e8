//! Analyze a single file or stdin

use anyhow::{bail, Context, Result};
use std::io::Read;
use std::path::Path;
use std::time::Instant;

use crate::output::{self, Format, IssueCounts};
use crate::progress::Step;

/// Returns `true` when the `--fail-on` threshold is exceeded.
pub fn run(file: &Path, cli: &crate::Cli) -> Result<bool> {
    let start = Instant::now();
    let from_stdin = file == Path::new("-");

    let code = if from_stdin {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read code from stdin")?;
        buf
    } else {
        std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read {}", file.display()))?
    };
    if code.trim().is_empty() {
        bail!("Nothing to analyze: input is empty");
    }

    let cwd = std::env::current_dir()?;
    let session = super::open_session(&cwd, cli)?;
    let format = output::resolve_format(cli, &session.config);
    let fail_on = output::resolve_fail_on(cli, &session.config);

    let file_path = if from_stdin { None } else { Some(file) };
    let label = match file_path {
        Some(p) => format!("Analyzing {} with {}", p.display(), session.model),
        None => format!("Analyzing stdin with {}", session.model),
    };

    let step = Step::new(label);
    let issues = session.analyzer.analyze(&code, file_path, None);
    step.finish(&format!("{} issue(s)", issues.len()));

    let counts = IssueCounts::from_issues(&issues);
    match format {
        Format::Json => {
            let json = output::json::render_issues(file_path.map(Path::to_path_buf), &issues)?;
            println!("{}", json);
        }
        Format::Terminal => {
            output::terminal::print_issues(&issues, Some(&cwd));
            output::terminal::print_summary(&counts, None, start.elapsed().as_secs_f64());
        }
    }

    Ok(counts.exceeds_threshold(&fail_on))
}
