//! Tests for configuration parsing and resolution

use deepoptimizer_core::config::{load_dotenv, API_KEY_ENV, CONFIG_FILE, MODEL_ENV};
use deepoptimizer_core::{ConfigError, DeepOptimizerConfig, Overrides, ResolvedConfig};
use std::collections::HashMap;
use std::time::Duration;
use tempfile::TempDir;

fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| map.get(name).cloned()
}

#[test]
fn test_default_config() {
    let config = DeepOptimizerConfig::default();
    assert_eq!(config.llm.model, "gemini-2.5-pro");
    assert_eq!(config.llm.temperature, 0.3);
    assert_eq!(config.llm.top_p, 0.9);
    assert_eq!(config.llm.max_output_tokens, 32768);
    assert_eq!(config.retry.max_attempts, 3);
    assert_eq!(config.retry.delays_secs, vec![30, 60, 120]);
    assert_eq!(config.project.patterns, vec!["**/*.py"]);
    assert_eq!(config.output.fail_on, "never");
}

#[test]
fn test_serialize_config() {
    let config = DeepOptimizerConfig::default();
    let toml_str = toml::to_string(&config).unwrap();
    assert!(toml_str.contains("max_output_tokens"));
    assert!(!toml_str.contains("api_key"));
}

#[test]
fn test_parse_partial_config() {
    let toml_str = r#"
[llm]
model = "gemini-2.5-flash"
max_output_tokens = 100000

[retry]
delays_secs = [1, 2]

[context]
framework = "pytorch"
hardware = "A100"
"#;
    let config: DeepOptimizerConfig = toml::from_str(toml_str).unwrap();
    assert_eq!(config.llm.model, "gemini-2.5-flash");
    assert_eq!(config.llm.temperature, 0.3);
    assert_eq!(config.retry.max_attempts, 3);
    assert_eq!(config.context["framework"], "pytorch");
}

#[test]
fn test_resolve_requires_api_key() {
    let config = DeepOptimizerConfig::default();
    let err = ResolvedConfig::resolve_with(&config, Overrides::default(), env_of(&[])).unwrap_err();
    assert!(matches!(err, ConfigError::MissingApiKey));
    assert!(err.to_string().contains("GEMINI_API_KEY"));
}

#[test]
fn test_resolve_precedence() {
    let mut config = DeepOptimizerConfig::default();
    config.llm.api_key = Some("file-key".to_string());
    config.llm.model = "file-model".to_string();

    let env = env_of(&[(API_KEY_ENV, "env-key"), (MODEL_ENV, "env-model")]);
    let resolved = ResolvedConfig::resolve_with(&config, Overrides::default(), env).unwrap();
    assert_eq!(resolved.api_key, "env-key");
    assert_eq!(resolved.model, "env-model");

    let overrides = Overrides {
        api_key: Some("cli-key".to_string()),
        model: Some("cli-model".to_string()),
    };
    let env = env_of(&[(API_KEY_ENV, "env-key"), (MODEL_ENV, "env-model")]);
    let resolved = ResolvedConfig::resolve_with(&config, overrides, env).unwrap();
    assert_eq!(resolved.api_key, "cli-key");
    assert_eq!(resolved.model, "cli-model");

    let resolved =
        ResolvedConfig::resolve_with(&config, Overrides::default(), env_of(&[])).unwrap();
    assert_eq!(resolved.api_key, "file-key");
    assert_eq!(resolved.model, "file-model");
}

#[test]
fn test_resolve_ignores_blank_values() {
    let config = DeepOptimizerConfig::default();
    let env = env_of(&[(API_KEY_ENV, "k"), (MODEL_ENV, "  ")]);
    let resolved = ResolvedConfig::resolve_with(&config, Overrides::default(), env).unwrap();
    assert_eq!(resolved.model, "gemini-2.5-pro");
}

#[test]
fn test_resolve_generation_and_retry() {
    let mut config = DeepOptimizerConfig::default();
    config.llm.max_output_tokens = 1_000_000;
    config.llm.base_url = "https://proxy.test/v1beta/".to_string();
    config.retry.delays_secs = vec![5];

    let resolved =
        ResolvedConfig::resolve_with(&config, Overrides::default(), env_of(&[(API_KEY_ENV, "k")]))
            .unwrap();
    assert_eq!(resolved.generation.max_output_tokens, 32768);
    assert_eq!(resolved.generation.temperature, 0.3);
    assert_eq!(resolved.base_url, "https://proxy.test/v1beta");
    assert_eq!(resolved.retry.max_attempts(), 3);
    assert_eq!(resolved.retry.delay_before(2), Duration::from_secs(5));
    assert_eq!(resolved.retry.delay_before(3), Duration::from_secs(5));
    assert!(resolved.request_timeout.is_none());
}

#[test]
fn test_find_and_load_walks_up() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join(CONFIG_FILE),
        "[output]\nfail_on = \"warning\"\n",
    )
    .unwrap();
    let nested = tmp.path().join("a").join("b");
    std::fs::create_dir_all(&nested).unwrap();

    let config = DeepOptimizerConfig::find_and_load(&nested).unwrap();
    assert_eq!(config.output.fail_on, "warning");
}

#[test]
fn test_invalid_config_reports_path() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join(CONFIG_FILE);
    std::fs::write(&path, "[llm\nmodel = ").unwrap();

    let err = DeepOptimizerConfig::from_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Toml { .. }));
    assert!(err.to_string().contains(CONFIG_FILE));
}

#[test]
fn test_save_round_trip() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join(CONFIG_FILE);
    DeepOptimizerConfig::default().save(&path).unwrap();

    let loaded = DeepOptimizerConfig::from_file(&path).unwrap();
    assert_eq!(loaded.llm.model, "gemini-2.5-pro");
    assert_eq!(loaded.retry.delays_secs, vec![30, 60, 120]);
}

#[test]
fn test_load_dotenv_from_parent() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join(".env"),
        "DEEPOPTIMIZER_TEST_DOTENV_MARKER=loaded\n",
    )
    .unwrap();
    let child = tmp.path().join("child");
    std::fs::create_dir(&child).unwrap();

    let found = load_dotenv(&child).unwrap();
    assert!(found.ends_with(".env"));
    assert_eq!(
        std::env::var("DEEPOPTIMIZER_TEST_DOTENV_MARKER").as_deref(),
        Ok("loaded")
    );
}

#[test]
fn test_load_dotenv_missing() {
    let tmp = TempDir::new().unwrap();
    let deep = tmp.path().join("a").join("b").join("c");
    std::fs::create_dir_all(&deep).unwrap();
    assert!(load_dotenv(&deep).is_none());
}
