//! Blocking HTTP client for the Gemini `generateContent` endpoint

use super::{Content, ContentGenerator, GenerateContentResponse, GenerationConfig, Part};
use crate::config::{ResolvedConfig, DEFAULT_BASE_URL};
use crate::error::GenerateError;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Longest error body kept in an error message
const MAX_ERROR_BODY: usize = 500;

pub struct GeminiClient {
    http: reqwest::blocking::Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content>,
    generation_config: &'a GenerationConfig,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, GenerateError> {
        Self::with_base_url(api_key, model, DEFAULT_BASE_URL, None)
    }

    pub fn from_config(config: &ResolvedConfig) -> Result<Self, GenerateError> {
        Self::with_base_url(
            config.api_key.clone(),
            config.model.clone(),
            config.base_url.clone(),
            config.request_timeout,
        )
    }

    /// `timeout` of `None` waits as long as the service takes.
    pub fn with_base_url(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, GenerateError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

impl ContentGenerator for GeminiClient {
    fn generate_content(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<GenerateContentResponse, GenerateError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part::text(prompt)],
            }],
            generation_config: config,
        };

        tracing::debug!(
            model = %self.model,
            prompt_chars = prompt.len(),
            "sending generateContent request"
        );

        let resp = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().unwrap_or_default();
            return Err(GenerateError::Api {
                status: status.to_string(),
                body: error_message(&text),
            });
        }

        Ok(resp.json::<GenerateContentResponse>()?)
    }
}

/// Pull `error.message` out of a Gemini error body, else a truncated raw body.
fn error_message(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        if let Some(msg) = json["error"]["message"].as_str() {
            return msg.to_string();
        }
    }
    body.chars().take(MAX_ERROR_BODY).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint() {
        let client =
            GeminiClient::with_base_url("k", "gemini-2.5-pro", "https://example.test/v1beta/", None)
                .unwrap();
        assert_eq!(
            client.endpoint(),
            "https://example.test/v1beta/models/gemini-2.5-pro:generateContent"
        );
    }

    #[test]
    fn test_request_body_shape() {
        let config = GenerationConfig::default();
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part::text("hi")],
            }],
            generation_config: &config,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 32768);
    }

    #[test]
    fn test_error_message_prefers_api_message() {
        let body = r#"{"error": {"code": 503, "message": "The model is overloaded.", "status": "UNAVAILABLE"}}"#;
        assert_eq!(error_message(body), "The model is overloaded.");
        assert_eq!(error_message("plain failure"), "plain failure");
    }
}
