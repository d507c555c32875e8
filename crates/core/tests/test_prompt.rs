//! Tests for prompt construction

use deepoptimizer_core::{ProjectContext, PromptBuilder};
use std::path::Path;

#[test]
fn test_prompt_is_deterministic() {
    let mut ctx = ProjectContext::new();
    ctx.insert("hardware".to_string(), "TPU v4".to_string());
    ctx.insert("framework".to_string(), "jax".to_string());

    let builder = PromptBuilder::new();
    let a = builder.build_analysis_prompt("x = 1", Some(Path::new("m.py")), &ctx);
    let b = builder.build_analysis_prompt("x = 1", Some(Path::new("m.py")), &ctx);
    assert_eq!(a, b);
}

#[test]
fn test_prompt_contents() {
    let mut ctx = ProjectContext::new();
    ctx.insert("hardware".to_string(), "A100".to_string());
    ctx.insert("framework".to_string(), "pytorch".to_string());

    let prompt = PromptBuilder::new().build_analysis_prompt(
        "import torch\nloss.backward()",
        Some(Path::new("train.py")),
        &ctx,
    );

    assert!(prompt.contains("File: train.py"));
    assert!(prompt.contains("   1: import torch"));
    assert!(prompt.contains("   2: loss.backward()"));
    assert!(prompt.contains("<json>"));

    // Context keys are listed in sorted order
    let framework = prompt.find("- framework: pytorch").unwrap();
    let hardware = prompt.find("- hardware: A100").unwrap();
    assert!(framework < hardware);
}

#[test]
fn test_prompt_without_context_or_path() {
    let prompt = PromptBuilder::new().build_analysis_prompt("x = 1", None, &ProjectContext::new());
    assert!(!prompt.contains("## Project context"));
    assert!(!prompt.contains("File:"));
    assert!(prompt.contains("### data_leakage"));
}

#[test]
fn test_framework_reorders_checks() {
    let mut ctx = ProjectContext::new();
    ctx.insert("framework".to_string(), "PyTorch".to_string());
    let prompt = PromptBuilder::new().build_analysis_prompt("x = 1", None, &ctx);

    let training = prompt.find("### training_loop").unwrap();
    let leakage = prompt.find("### data_leakage").unwrap();
    assert!(training < leakage);
}
