use crate::failover::RetryPolicy;
use serde::{Deserialize, Serialize};

/// Supported model providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Google Gemini `generateContent` API.
    Gemini,
    /// OpenAI chat completions.
    OpenAi,
    /// OpenRouter, which proxies many models behind the OpenAI API.
    OpenRouter,
    /// Groq cloud inference over the OpenAI-compatible API.
    Groq,
}

/// Model selection, credentials and sampling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Which API to call.
    pub provider: LlmProvider,
    /// Model name sent to the provider.
    #[serde(default = "default_model_id")]
    pub model_id: String,
    /// API key; empty when not configured.
    #[serde(default)]
    pub api_key: String,
    /// Overrides the provider's default base URL.
    pub api_base_url: Option<String>,
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Upper bound on generated tokens.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Tried in order when the primary model fails.
    #[serde(default)]
    pub fallback_models: Vec<ModelConfig>,
    /// Retry settings; `None` means a single attempt per model.
    #[serde(default)]
    pub retry_policy: Option<RetryPolicy>,
}

fn default_model_id() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    2048
}

impl ModelConfig {
    /// A Gemini config with default sampling settings.
    pub fn gemini(api_key: impl Into<String>) -> Self {
        Self {
            provider: LlmProvider::Gemini,
            model_id: default_model_id(),
            api_key: api_key.into(),
            api_base_url: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            fallback_models: Vec::new(),
            retry_policy: None,
        }
    }

    /// The configured base URL, or the provider default.
    pub fn base_url(&self) -> &str {
        if let Some(url) = &self.api_base_url {
            url
        } else {
            match self.provider {
                LlmProvider::Gemini => "https://generativelanguage.googleapis.com",
                LlmProvider::OpenAi => "https://api.openai.com",
                LlmProvider::OpenRouter => "https://openrouter.ai/api",
                LlmProvider::Groq => "https://api.groq.com/openai",
            }
        }
    }
}
