//! File discovery by glob pattern with a fixed directory exclusion set

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

/// Directory names never analyzed
pub const EXCLUDED_DIRS: &[&str] = &[
    "__pycache__",
    ".git",
    "venv",
    "env",
    ".env",
    "node_modules",
];

pub const DEFAULT_PATTERN: &str = "**/*.py";

/// Expand each pattern relative to `root` and return the matching files.
///
/// Paths with a component in [`EXCLUDED_DIRS`] or `extra_excludes` are dropped.
/// Files matched by several patterns appear once, in first-seen order.
pub fn collect_files(
    root: &Path,
    patterns: &[String],
    extra_excludes: &[String],
) -> Result<Vec<PathBuf>> {
    let escaped_root = glob::Pattern::escape(&root.to_string_lossy());
    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for pattern in patterns {
        let full = format!("{}/{}", escaped_root.trim_end_matches('/'), pattern);
        let entries =
            glob::glob(&full).with_context(|| format!("Invalid glob pattern: {}", pattern))?;

        for entry in entries {
            let path = match entry {
                Ok(p) => p,
                Err(e) => {
                    tracing::debug!("skipping unreadable path: {}", e);
                    continue;
                }
            };

            if !path.is_file() || is_excluded(root, &path, extra_excludes) {
                continue;
            }
            if seen.insert(path.clone()) {
                files.push(path);
            }
        }
    }

    Ok(files)
}

/// Whether any component of `path` below `root` is an excluded directory name.
pub fn is_excluded(root: &Path, path: &Path, extra_excludes: &[String]) -> bool {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative.components().any(|c| match c {
        Component::Normal(name) => {
            let name = name.to_string_lossy();
            let name: &str = &name;
            EXCLUDED_DIRS.contains(&name) || extra_excludes.iter().any(|e| e == name)
        }
        _ => false,
    })
}
