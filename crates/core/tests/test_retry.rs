//! Tests for the retry loop and text extraction around a generation call

use deepoptimizer_core::error::GenerateError;
use deepoptimizer_core::llm::{Candidate, PromptFeedback};
use deepoptimizer_core::retry::generate_with_retry;
use deepoptimizer_core::{
    ContentGenerator, GenerateContentResponse, GenerationConfig, RetryPolicy, Sleeper,
};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

type Reply = Result<GenerateContentResponse, GenerateError>;

struct ScriptedGenerator {
    replies: RefCell<VecDeque<Reply>>,
    calls: Cell<usize>,
}

impl ScriptedGenerator {
    fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: RefCell::new(replies.into()),
            calls: Cell::new(0),
        }
    }
}

impl ContentGenerator for ScriptedGenerator {
    fn generate_content(&self, _prompt: &str, _config: &GenerationConfig) -> Reply {
        self.calls.set(self.calls.get() + 1);
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(GenerateError::Transport("no scripted reply".to_string())))
    }
}

#[derive(Clone, Default)]
struct RecordingSleeper(Rc<RefCell<Vec<Duration>>>);

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.0.borrow_mut().push(duration);
    }
}

fn unavailable() -> Reply {
    Err(GenerateError::Api {
        status: "503 Service Unavailable".to_string(),
        body: "The model is overloaded.".to_string(),
    })
}

fn run(generator: &ScriptedGenerator, sleeper: &RecordingSleeper) -> Result<String, GenerateError> {
    generate_with_retry(
        generator,
        "prompt",
        &GenerationConfig::default(),
        &RetryPolicy::default(),
        sleeper,
    )
}

#[test]
fn test_transient_errors_then_success() {
    let generator = ScriptedGenerator::new(vec![
        unavailable(),
        unavailable(),
        Ok(GenerateContentResponse::from_text("<json>[]</json>")),
    ]);
    let sleeper = RecordingSleeper::default();

    let text = run(&generator, &sleeper).unwrap();
    assert_eq!(text, "<json>[]</json>");
    assert_eq!(generator.calls.get(), 3);
    assert_eq!(
        *sleeper.0.borrow(),
        vec![Duration::from_secs(30), Duration::from_secs(60)]
    );
}

#[test]
fn test_safety_finish_reason_fails_immediately() {
    let generator = ScriptedGenerator::new(vec![Ok(GenerateContentResponse {
        candidates: vec![Candidate::with_parts(["half an answer"], Some("SAFETY"))],
        ..Default::default()
    })]);
    let sleeper = RecordingSleeper::default();

    let err = run(&generator, &sleeper).unwrap_err();
    match err {
        GenerateError::Exhausted { attempts, source } => {
            assert_eq!(attempts, 1);
            assert!(matches!(*source, GenerateError::SafetyStopped));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(generator.calls.get(), 1);
    assert!(sleeper.0.borrow().is_empty());
}

#[test]
fn test_blocked_prompt_fails_immediately() {
    let generator = ScriptedGenerator::new(vec![Ok(GenerateContentResponse {
        prompt_feedback: Some(PromptFeedback {
            block_reason: Some("SAFETY".to_string()),
        }),
        ..Default::default()
    })]);
    let sleeper = RecordingSleeper::default();

    let err = run(&generator, &sleeper).unwrap_err();
    assert!(err.to_string().contains("Response blocked: SAFETY"));
    assert_eq!(generator.calls.get(), 1);
    assert!(sleeper.0.borrow().is_empty());
}

#[test]
fn test_exhausted_budget_reports_attempts() {
    let generator = ScriptedGenerator::new(vec![
        Err(GenerateError::Api {
            status: "500 Internal Server Error".to_string(),
            body: "boom".to_string(),
        }),
        unavailable(),
        Err(GenerateError::Transport("Request timeout: deadline".to_string())),
    ]);
    let sleeper = RecordingSleeper::default();

    let err = run(&generator, &sleeper).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("after 3 attempt(s)"), "{}", msg);
    assert!(msg.contains("Request timeout"), "{}", msg);
    assert_eq!(generator.calls.get(), 3);
    assert_eq!(sleeper.0.borrow().len(), 2);
}

#[test]
fn test_non_retryable_error_stops() {
    let generator = ScriptedGenerator::new(vec![
        Err(GenerateError::Api {
            status: "400 Bad Request".to_string(),
            body: "API key not valid".to_string(),
        }),
        Ok(GenerateContentResponse::from_text("never reached")),
    ]);
    let sleeper = RecordingSleeper::default();

    let err = run(&generator, &sleeper).unwrap_err();
    assert!(err.to_string().contains("API key not valid"));
    assert_eq!(generator.calls.get(), 1);
    assert!(sleeper.0.borrow().is_empty());
}

#[test]
fn test_max_tokens_returns_partial_text() {
    let generator = ScriptedGenerator::new(vec![Ok(GenerateContentResponse {
        candidates: vec![Candidate::with_parts(
            ["<json>[{\"severity\":", "\"info\"}"],
            Some("MAX_TOKENS"),
        )],
        ..Default::default()
    })]);
    let sleeper = RecordingSleeper::default();

    let text = run(&generator, &sleeper).unwrap();
    assert_eq!(text, "<json>[{\"severity\": \"info\"}");
}

#[test]
fn test_empty_response_is_no_text() {
    let generator = ScriptedGenerator::new(vec![Ok(GenerateContentResponse::default())]);
    let sleeper = RecordingSleeper::default();

    let err = run(&generator, &sleeper).unwrap_err();
    match err {
        GenerateError::Exhausted { source, .. } => {
            assert!(matches!(*source, GenerateError::NoText))
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(generator.calls.get(), 1);
}

#[test]
fn test_custom_policy_single_attempt() {
    let generator = ScriptedGenerator::new(vec![unavailable()]);
    let sleeper = RecordingSleeper::default();

    let err = generate_with_retry(
        &generator,
        "prompt",
        &GenerationConfig::default(),
        &RetryPolicy::new(1, vec![]),
        &sleeper,
    )
    .unwrap_err();
    assert!(err.to_string().contains("after 1 attempt(s)"));
    assert!(sleeper.0.borrow().is_empty());
}
