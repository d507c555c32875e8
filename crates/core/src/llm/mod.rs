//! Remote generation API: request/response shapes and the client seam
//!
//! The shapes follow the Gemini `generateContent` REST payloads. Every field
//! the pipeline inspects is optional because the service omits them freely.

use crate::error::GenerateError;
use serde::{Deserialize, Serialize};

pub mod extract;
pub mod gemini;

pub use extract::extract_text;
pub use gemini::GeminiClient;

/// Sampling parameters sent with every request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            top_p: 0.9,
            max_output_tokens: crate::config::MAX_OUTPUT_TOKENS_CAP,
        }
    }
}

/// Anything that turns a prompt into a raw model response.
///
/// Implemented by [`GeminiClient`] for the real service and by fakes in tests.
pub trait ContentGenerator {
    fn generate_content(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<GenerateContentResponse, GenerateError>;
}

impl<T: ContentGenerator + ?Sized> ContentGenerator for &T {
    fn generate_content(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<GenerateContentResponse, GenerateError> {
        (**self).generate_content(prompt, config)
    }
}

impl<T: ContentGenerator + ?Sized> ContentGenerator for Box<T> {
    fn generate_content(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<GenerateContentResponse, GenerateError> {
        (**self).generate_content(prompt, config)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_feedback: Option<PromptFeedback>,

    /// Flattened parts, returned by some proxies instead of candidates
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_reason: Option<String>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}

impl Candidate {
    pub fn with_parts<I, S>(parts: I, finish_reason: Option<&str>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            content: Some(Content {
                role: Some("model".to_string()),
                parts: parts.into_iter().map(Part::text).collect(),
            }),
            finish_reason: finish_reason.map(str::to_string),
        }
    }

    /// Text parts, in order. Non-text parts are skipped.
    pub fn texts(&self) -> Vec<&str> {
        self.content
            .as_ref()
            .map(|c| c.parts.iter().filter_map(|p| p.text.as_deref()).collect())
            .unwrap_or_default()
    }
}

impl GenerateContentResponse {
    /// A normal single-candidate reply carrying `text`.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            candidates: vec![Candidate::with_parts([text.into()], Some("STOP"))],
            ..Default::default()
        }
    }

    pub fn block_reason(&self) -> Option<&str> {
        self.prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
            .filter(|r| !r.is_empty() && *r != "BLOCK_REASON_UNSPECIFIED")
    }

    /// Quick accessor: the text of a cleanly finished single candidate.
    ///
    /// `None` when there is not exactly one candidate, when it stopped for any
    /// reason other than a normal stop, or when any of its parts is not text.
    pub fn text(&self) -> Option<String> {
        let [candidate] = self.candidates.as_slice() else {
            return None;
        };
        match candidate.finish_reason.as_deref() {
            None | Some("STOP") | Some("FINISH_REASON_UNSPECIFIED") => {}
            Some(_) => return None,
        }
        let parts = &candidate.content.as_ref()?.parts;
        if parts.is_empty() {
            return None;
        }
        parts
            .iter()
            .map(|p| p.text.as_deref())
            .collect::<Option<Vec<_>>>()
            .map(|texts| texts.concat())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_rest_payload() {
        let body = r#"{
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "hello"}]},
                "finishReason": "STOP",
                "index": 0
            }],
            "usageMetadata": {"promptTokenCount": 3}
        }"#;
        let resp: GenerateContentResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.text().as_deref(), Some("hello"));
        assert!(resp.block_reason().is_none());
    }

    #[test]
    fn test_generation_config_wire_names() {
        let json = serde_json::to_value(GenerationConfig::default()).unwrap();
        assert_eq!(json["maxOutputTokens"], 32768);
        assert!(json.get("topP").is_some());
    }

    #[test]
    fn test_quick_text_rejects_non_stop() {
        let resp = GenerateContentResponse {
            candidates: vec![Candidate::with_parts(["partial"], Some("MAX_TOKENS"))],
            ..Default::default()
        };
        assert!(resp.text().is_none());
    }

    #[test]
    fn test_quick_text_rejects_non_text_part() {
        let mut candidate = Candidate::with_parts(["a"], None);
        if let Some(content) = candidate.content.as_mut() {
            content.parts.push(Part { text: None });
        }
        let resp = GenerateContentResponse {
            candidates: vec![candidate],
            ..Default::default()
        };
        assert!(resp.text().is_none());
    }
}
