//! Single-file and project-wide analysis
//!
//! [`Analyzer::analyze`] runs prompt → remote call → parse and never fails:
//! any error is reported back as a single synthetic issue so callers always
//! have something to show. [`Analyzer::analyze_project`] walks a directory one
//! file at a time and folds every result into a [`ProjectAnalysis`].

use crate::config::ResolvedConfig;
use crate::discovery::{collect_files, DEFAULT_PATTERN};
use crate::error::GenerateError;
use crate::issue::{Issue, ProjectAnalysis, Severity};
use crate::llm::{ContentGenerator, GeminiClient, GenerationConfig};
use crate::parse::parse_response;
use crate::prompt::{ProjectContext, PromptBuilder};
use crate::retry::{generate_with_retry, RetryPolicy, Sleeper, ThreadSleeper};
use anyhow::{bail, Result};
use std::path::Path;

pub const ANALYSIS_FAILED_TITLE: &str = "LLM Analysis Failed";
pub const ANALYSIS_FAILED_SUGGESTION: &str = "For larger files, try: 1) analyzing smaller \
code portions, 2) Google AI Studio: https://aistudio.google.com, 3) a faster model via GEMINI_MODEL";

pub struct Analyzer<G = GeminiClient> {
    generator: G,
    generation: GenerationConfig,
    retry: RetryPolicy,
    sleeper: Box<dyn Sleeper>,
    prompts: PromptBuilder,
    context: ProjectContext,
    excluded_dirs: Vec<String>,
}

impl Analyzer<GeminiClient> {
    /// Analyzer backed by the Gemini REST API.
    pub fn from_config(config: &ResolvedConfig) -> Result<Self, GenerateError> {
        let client = GeminiClient::from_config(config)?;
        Ok(Analyzer::new(client)
            .with_generation_config(config.generation)
            .with_retry_policy(config.retry.clone())
            .with_context(config.context.clone())
            .with_excluded_dirs(config.excluded_dirs.clone()))
    }
}

impl<G: ContentGenerator> Analyzer<G> {
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            generation: GenerationConfig::default(),
            retry: RetryPolicy::default(),
            sleeper: Box::new(ThreadSleeper),
            prompts: PromptBuilder::new(),
            context: ProjectContext::new(),
            excluded_dirs: Vec::new(),
        }
    }

    pub fn with_generation_config(mut self, generation: GenerationConfig) -> Self {
        self.generation = generation;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_sleeper(mut self, sleeper: impl Sleeper + 'static) -> Self {
        self.sleeper = Box::new(sleeper);
        self
    }

    /// Context applied to every call; per-call entries win on conflicts.
    pub fn with_context(mut self, context: ProjectContext) -> Self {
        self.context = context;
        self
    }

    /// Directory names skipped during project walks, besides the built-in set.
    pub fn with_excluded_dirs(mut self, dirs: Vec<String>) -> Self {
        self.excluded_dirs = dirs;
        self
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Analyze one piece of code. Always returns at least one issue on failure.
    pub fn analyze(
        &self,
        code: &str,
        file_path: Option<&Path>,
        context: Option<&ProjectContext>,
    ) -> Vec<Issue> {
        match self.try_analyze(code, file_path, context) {
            Ok(issues) => issues,
            Err(e) => {
                tracing::warn!("analysis failed: {}", e);
                vec![analysis_failed(&e, file_path)]
            }
        }
    }

    /// Like [`Analyzer::analyze`] but surfaces the remote failure.
    pub fn try_analyze(
        &self,
        code: &str,
        file_path: Option<&Path>,
        context: Option<&ProjectContext>,
    ) -> Result<Vec<Issue>, GenerateError> {
        let mut merged = self.context.clone();
        if let Some(ctx) = context {
            merged.extend(ctx.iter().map(|(k, v)| (k.clone(), v.clone())));
        }

        let prompt = self.prompts.build_analysis_prompt(code, file_path, &merged);
        let response = generate_with_retry(
            &self.generator,
            &prompt,
            &self.generation,
            &self.retry,
            self.sleeper.as_ref(),
        )?;

        let mut issues = parse_response(&response);
        if let Some(path) = file_path {
            for issue in &mut issues {
                issue.file = Some(path.to_path_buf());
            }
        }
        Ok(issues)
    }

    /// Analyze every file under `root` matching `patterns` (default `**/*.py`).
    ///
    /// Fails only when `root` does not exist or a pattern is invalid. Files
    /// that cannot be read get a single `file_error` issue and the walk goes on.
    pub fn analyze_project(
        &self,
        root: &Path,
        patterns: Option<&[String]>,
    ) -> Result<ProjectAnalysis> {
        self.analyze_project_with(root, patterns, |_, _, _| {})
    }

    /// [`Analyzer::analyze_project`] reporting `(index, total, file)` before each file.
    pub fn analyze_project_with<F>(
        &self,
        root: &Path,
        patterns: Option<&[String]>,
        mut on_file: F,
    ) -> Result<ProjectAnalysis>
    where
        F: FnMut(usize, usize, &Path),
    {
        if !root.exists() {
            bail!("Project path does not exist: {}", root.display());
        }

        let default_patterns = [DEFAULT_PATTERN.to_string()];
        let patterns = patterns.unwrap_or(&default_patterns[..]);
        let files = collect_files(root, patterns, &self.excluded_dirs)?;
        let total = files.len();

        let mut result = ProjectAnalysis::new(root);

        for (i, file) in files.into_iter().enumerate() {
            on_file(i, total, &file);

            let code = match std::fs::read_to_string(&file) {
                Ok(c) => c,
                Err(e) => {
                    tracing::warn!("could not read {}: {}", file.display(), e);
                    result.record_failure(file, e);
                    continue;
                }
            };

            if code.trim().is_empty() {
                tracing::debug!("skipping empty file {}", file.display());
                continue;
            }

            tracing::info!("[{}/{}] analyzing {}", i + 1, total, file.display());
            let issues = self.analyze(&code, Some(&file), None);
            result.record_file(file, issues);
        }

        Ok(result)
    }
}

/// The synthetic issue returned when analysis could not complete.
pub fn analysis_failed(error: &dyn std::fmt::Display, file_path: Option<&Path>) -> Issue {
    let mut issue = Issue::new(
        Severity::Error,
        ANALYSIS_FAILED_TITLE,
        format!("Failed to analyze code with Gemini: {}", error),
    )
    .with_category("analysis_error")
    .with_suggestion(ANALYSIS_FAILED_SUGGESTION)
    .with_confidence(1.0);
    issue.file = file_path.map(Path::to_path_buf);
    issue
}
