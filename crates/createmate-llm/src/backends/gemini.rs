use super::LlmBackend;
use crate::config::ModelConfig;
use async_trait::async_trait;
use createmate_core::{CreateMateError, CreateMateResult};
use tracing::debug;

/// Google Gemini `generateContent` backend.
pub struct GeminiBackend {
    config: ModelConfig,
    http: reqwest::Client,
}

impl GeminiBackend {
    /// Create a backend for `config`.
    pub fn new(config: ModelConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    fn build_body(&self, prompt: &str) -> serde_json::Value {
        serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }]
            }],
            "generationConfig": {
                "temperature": self.config.temperature,
                "maxOutputTokens": self.config.max_tokens,
            }
        })
    }
}

#[async_trait]
impl LlmBackend for GeminiBackend {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, prompt: &str) -> CreateMateResult<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url().trim_end_matches('/'),
            self.config.model_id
        );
        debug!(model = %self.config.model_id, prompt_len = prompt.len(), "Gemini request");

        let resp = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .header("Content-Type", "application/json")
            .json(&self.build_body(prompt))
            .send()
            .await
            .map_err(|e| CreateMateError::Http(e.to_string()))?;

        let status = resp.status();
        let resp_body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| CreateMateError::Http(format!("Gemini API error {status}: {e}")))?;

        if !status.is_success() {
            return Err(CreateMateError::Http(format!(
                "Gemini API error {}: {}",
                status, resp_body
            )));
        }

        parse_gemini_response(&resp_body)
    }
}

/// Join the text parts of the first candidate.
pub(crate) fn parse_gemini_response(body: &serde_json::Value) -> CreateMateResult<String> {
    let parts = body["candidates"][0]["content"]["parts"]
        .as_array()
        .ok_or_else(|| CreateMateError::Llm(format!("Gemini returned no candidates: {body}")))?;

    let text: String = parts
        .iter()
        .filter_map(|p| p["text"].as_str())
        .collect::<Vec<_>>()
        .join("");

    if text.trim().is_empty() {
        return Err(CreateMateError::Llm("Gemini returned an empty response".into()));
    }
    Ok(text)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_joins_parts() {
        let body = serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "[\"Mon" }, { "text": "day\"]" }] }
            }]
        });
        assert_eq!(parse_gemini_response(&body).unwrap(), "[\"Monday\"]");
    }

    #[test]
    fn test_parse_without_candidates() {
        let body = serde_json::json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        let err = parse_gemini_response(&body).unwrap_err();
        assert!(matches!(err, CreateMateError::Llm(_)));
    }

    #[test]
    fn test_body_carries_generation_config() {
        let mut config = ModelConfig::gemini("k");
        config.temperature = 0.2;
        config.max_tokens = 512;
        let body = GeminiBackend::new(config).build_body("hello");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 512);
    }
}
