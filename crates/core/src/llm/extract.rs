//! Text extraction from a raw generation response
//!
//! The response shape is not stable across models and failure modes, so
//! extraction runs an ordered list of strategies. Each returns `Ok(Some(text))`
//! to finish, `Ok(None)` to defer to the next one, or an error to stop
//! immediately.

use super::GenerateContentResponse;
use crate::error::GenerateError;

pub type Strategy = fn(&GenerateContentResponse) -> Result<Option<String>, GenerateError>;

/// Strategies in the order they are tried
pub const STRATEGIES: &[(&str, Strategy)] = &[
    ("direct_text", direct_text),
    ("prompt_feedback", prompt_feedback),
    ("candidate_parts", candidate_parts),
    ("response_parts", response_parts),
];

/// Run every strategy until one yields non-empty text.
pub fn extract_text(response: &GenerateContentResponse) -> Result<String, GenerateError> {
    for (name, strategy) in STRATEGIES {
        if let Some(text) = strategy(response)? {
            if !text.trim().is_empty() {
                tracing::debug!(strategy = *name, "extracted {} chars", text.len());
                return Ok(text);
            }
        }
    }
    Err(GenerateError::NoText)
}

pub fn direct_text(response: &GenerateContentResponse) -> Result<Option<String>, GenerateError> {
    Ok(response.text())
}

/// Fails when the prompt itself was blocked.
pub fn prompt_feedback(response: &GenerateContentResponse) -> Result<Option<String>, GenerateError> {
    match response.block_reason() {
        Some(reason) => Err(GenerateError::Blocked(reason.to_string())),
        None => Ok(None),
    }
}

/// Inspects the first candidate's finish reason, then joins its text parts.
pub fn candidate_parts(response: &GenerateContentResponse) -> Result<Option<String>, GenerateError> {
    let Some(candidate) = response.candidates.first() else {
        return Ok(None);
    };

    if let Some(reason) = candidate.finish_reason.as_deref() {
        if reason.contains("SAFETY") {
            return Err(GenerateError::SafetyStopped);
        }
        if reason.contains("MAX_TOKENS") {
            tracing::warn!("model output hit the token limit; using partial response");
        }
    }

    Ok(join_non_empty(candidate.texts()))
}

pub fn response_parts(response: &GenerateContentResponse) -> Result<Option<String>, GenerateError> {
    Ok(join_non_empty(
        response.parts.iter().filter_map(|p| p.text.as_deref()).collect(),
    ))
}

fn join_non_empty(texts: Vec<&str>) -> Option<String> {
    if texts.is_empty() {
        None
    } else {
        Some(texts.join(" "))
    }
}
