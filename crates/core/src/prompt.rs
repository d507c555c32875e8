//! Prompt construction for ML code analysis

use std::collections::BTreeMap;
use std::path::Path;

/// Caller-supplied hints (framework, hardware, dataset size, ...)
pub type ProjectContext = BTreeMap<String, String>;

/// One area of ML bugs the model is asked to check
pub struct KnowledgeEntry {
    pub category: &'static str,
    pub focus: &'static str,
    /// Frameworks whose idioms make this category especially relevant
    pub frameworks: &'static [&'static str],
    pub checks: &'static [&'static str],
}

/// Built-in knowledge base, in default presentation order
pub const KNOWLEDGE_BASE: &[KnowledgeEntry] = &[
    KnowledgeEntry {
        category: "data_leakage",
        focus: "information from evaluation data reaching training",
        frameworks: &["sklearn", "scikit-learn", "pandas"],
        checks: &[
            "scalers, encoders or feature selectors fit before the train/test split",
            "fit or fit_transform called on validation or test data",
            "target-derived features computed over the full dataset",
        ],
    },
    KnowledgeEntry {
        category: "reproducibility",
        focus: "runs that cannot be repeated",
        frameworks: &[],
        checks: &[
            "missing seeds for random, numpy and the framework RNG",
            "train_test_split or shuffling without random_state",
            "non-deterministic kernels left enabled when determinism matters",
        ],
    },
    KnowledgeEntry {
        category: "training_loop",
        focus: "mistakes in the optimization loop",
        frameworks: &["pytorch", "torch"],
        checks: &[
            "optimizer.zero_grad() missing or called after backward()",
            "model.train()/model.eval() not toggled around evaluation",
            "loss.item() omitted when accumulating metrics, keeping graphs alive",
            "learning-rate scheduler stepped at the wrong granularity",
        ],
    },
    KnowledgeEntry {
        category: "gradient",
        focus: "gradient flow problems",
        frameworks: &["pytorch", "torch", "jax", "tensorflow"],
        checks: &[
            "evaluation code not wrapped in torch.no_grad() or equivalent",
            "tensors detached or converted to numpy inside the differentiable path",
            "exploding gradients without clipping in recurrent models",
        ],
    },
    KnowledgeEntry {
        category: "performance",
        focus: "wasted compute and slow input pipelines",
        frameworks: &["pytorch", "torch", "tensorflow", "keras", "jax"],
        checks: &[
            "DataLoader without num_workers or pin_memory on GPU",
            "host/device copies or .item() calls inside the hot loop",
            "Python loops over tensors where vectorized ops exist",
            "mixed precision unused on hardware that supports it",
        ],
    },
    KnowledgeEntry {
        category: "memory",
        focus: "memory growth and out-of-memory risks",
        frameworks: &["pytorch", "torch", "tensorflow"],
        checks: &[
            "accumulating tensors that retain the autograd graph",
            "whole datasets materialized on the accelerator",
            "caches or histories that grow every step",
        ],
    },
    KnowledgeEntry {
        category: "numerical_stability",
        focus: "overflow, underflow and NaNs",
        frameworks: &[],
        checks: &[
            "log or division without epsilon",
            "softmax followed by log instead of log_softmax",
            "sigmoid plus BCELoss instead of BCEWithLogitsLoss",
        ],
    },
    KnowledgeEntry {
        category: "serialization",
        focus: "unsafe or fragile model persistence",
        frameworks: &["pytorch", "torch", "sklearn", "scikit-learn"],
        checks: &[
            "pickle used for model artifacts",
            "whole model saved instead of state_dict",
            "torch.load without weights_only on untrusted files",
        ],
    },
    KnowledgeEntry {
        category: "api_misuse",
        focus: "framework APIs used against their contract",
        frameworks: &["tensorflow", "keras", "jax"],
        checks: &[
            "loss functions given probabilities where logits are expected",
            "deprecated APIs with changed semantics",
            "jit-compiled functions with Python side effects",
        ],
    },
];

const PREAMBLE: &str = "You are an expert machine-learning engineer reviewing code for \
correctness bugs and performance problems. You know PyTorch, TensorFlow/Keras, JAX and \
scikit-learn in depth. Report only concrete problems you can point to in the code; do not \
restate the code or praise it.";

const OUTPUT_FORMAT: &str = r#"Respond with a JSON array wrapped in <json></json> tags. Each element must have:
- "severity": "error" for bugs that produce wrong results or crashes, "warning" for likely problems, "info" for improvements
- "category": one of the categories above, or "general"
- "title": a short headline (max 100 characters)
- "description": what is wrong and why it matters
- "line_numbers": array of 1-based line numbers involved
- "suggestion": the concrete fix
- "confidence": number between 0 and 1
- "references": array of documentation URLs or paper titles (may be empty)

If you find no problems, respond with <json>[]</json>."#;

/// Builds analysis prompts. Output depends only on the inputs.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build_analysis_prompt(
        &self,
        code: &str,
        file_path: Option<&Path>,
        context: &ProjectContext,
    ) -> String {
        let mut out = String::with_capacity(code.len() + 4096);
        out.push_str(PREAMBLE);
        out.push_str("\n\n## What to check\n");

        for entry in ordered_entries(context) {
            out.push_str(&format!("\n### {} ({})\n", entry.category, entry.focus));
            for check in entry.checks {
                out.push_str(&format!("- {}\n", check));
            }
        }

        if !context.is_empty() {
            out.push_str("\n## Project context\n");
            for (key, value) in context {
                out.push_str(&format!("- {}: {}\n", key, value));
            }
        }

        out.push_str("\n## Code\n");
        if let Some(path) = file_path {
            out.push_str(&format!("File: {}\n", path.display()));
        }
        out.push_str("```python\n");
        for (i, line) in code.lines().enumerate() {
            out.push_str(&format!("{:4}: {}\n", i + 1, line));
        }
        out.push_str("```\n\n## Output format\n");
        out.push_str(OUTPUT_FORMAT);
        out.push('\n');
        out
    }
}

/// Entries relevant to the context's framework first, the rest after.
fn ordered_entries(context: &ProjectContext) -> Vec<&'static KnowledgeEntry> {
    let framework = context
        .get("framework")
        .map(|f| f.trim().to_lowercase())
        .unwrap_or_default();

    let (mut first, rest): (Vec<_>, Vec<_>) = KNOWLEDGE_BASE
        .iter()
        .partition(|e| !framework.is_empty() && e.frameworks.contains(&framework.as_str()));
    first.extend(rest);
    first
}
