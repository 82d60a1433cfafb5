use super::LlmBackend;
use crate::config::{LlmProvider, ModelConfig};
use async_trait::async_trait;
use createmate_core::{CreateMateError, CreateMateResult};

/// OpenAI-compatible chat completions backend.
///
/// Works with OpenAI, OpenRouter, Groq and any other provider exposing
/// `/v1/chat/completions`.
pub struct OpenAiBackend {
    config: ModelConfig,
    http: reqwest::Client,
}

impl OpenAiBackend {
    /// Create a backend for `config`; the provider picks the extra headers.
    pub fn new(config: ModelConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    fn add_provider_headers(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = request
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json");

        // OpenRouter wants attribution headers
        if matches!(self.config.provider, LlmProvider::OpenRouter) {
            request
                .header("HTTP-Referer", "https://github.com/createmate/createmate")
                .header("X-Title", "CreateMate")
        } else {
            request
        }
    }
}

#[async_trait]
impl LlmBackend for OpenAiBackend {
    fn name(&self) -> &str {
        match self.config.provider {
            LlmProvider::OpenRouter => "openrouter",
            LlmProvider::Groq => "groq",
            _ => "openai",
        }
    }

    async fn generate(&self, prompt: &str) -> CreateMateResult<String> {
        let url = format!(
            "{}/v1/chat/completions",
            self.config.base_url().trim_end_matches('/')
        );
        let body = serde_json::json!({
            "model": self.config.model_id,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "messages": [{ "role": "user", "content": prompt }],
        });

        let resp = self
            .add_provider_headers(self.http.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(|e| CreateMateError::Http(e.to_string()))?;

        let status = resp.status();
        let resp_body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| CreateMateError::Http(format!("OpenAI API error {status}: {e}")))?;

        if !status.is_success() {
            return Err(CreateMateError::Http(format!(
                "OpenAI API error {}: {}",
                status, resp_body
            )));
        }

        resp_body["choices"][0]["message"]["content"]
            .as_str()
            .filter(|text| !text.trim().is_empty())
            .map(str::to_string)
            .ok_or_else(|| CreateMateError::Llm(format!("No content in completion: {resp_body}")))
    }
}
