use crate::backends::gemini::GeminiBackend;
use crate::backends::openai::OpenAiBackend;
use crate::backends::LlmBackend;
use crate::config::{LlmProvider, ModelConfig};
use crate::failover::FailoverBackend;
use createmate_core::CreateMateResult;

/// Client that dispatches prompts to the configured provider backend.
pub struct LlmClient {
    backend: Box<dyn LlmBackend>,
}

impl LlmClient {
    /// Build the backend for `config`.
    ///
    /// When fallback models or a retry policy are configured the backend is
    /// wrapped in a [`FailoverBackend`].
    pub fn new(config: ModelConfig) -> Self {
        let needs_failover = !config.fallback_models.is_empty() || config.retry_policy.is_some();
        if !needs_failover {
            return Self {
                backend: backend_for(config),
            };
        }

        let policy = config.retry_policy.clone().unwrap_or_default();
        let fallbacks = config
            .fallback_models
            .iter()
            .cloned()
            .map(backend_for)
            .collect();
        Self {
            backend: Box::new(FailoverBackend::new(backend_for(config), fallbacks, policy)),
        }
    }

    /// Create from a pre-built backend.
    pub fn from_backend(backend: Box<dyn LlmBackend>) -> Self {
        Self { backend }
    }

    /// Name of the backend serving requests.
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Generate text for `prompt`.
    pub async fn generate(&self, prompt: &str) -> CreateMateResult<String> {
        self.backend.generate(prompt).await
    }
}

fn backend_for(config: ModelConfig) -> Box<dyn LlmBackend> {
    match config.provider {
        LlmProvider::Gemini => Box::new(GeminiBackend::new(config)),
        LlmProvider::OpenAi | LlmProvider::OpenRouter | LlmProvider::Groq => {
            Box::new(OpenAiBackend::new(config))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::failover::RetryPolicy;

    #[test]
    fn test_backend_selection() {
        assert_eq!(LlmClient::new(ModelConfig::gemini("k")).backend_name(), "gemini");

        let mut groq = ModelConfig::gemini("k");
        groq.provider = LlmProvider::Groq;
        assert_eq!(LlmClient::new(groq).backend_name(), "groq");
    }

    #[test]
    fn test_failover_wrapping() {
        let mut config = ModelConfig::gemini("k");
        config.retry_policy = Some(RetryPolicy::default());
        assert_eq!(LlmClient::new(config).backend_name(), "failover");

        let mut config = ModelConfig::gemini("k");
        config.fallback_models.push(ModelConfig::gemini("other"));
        assert_eq!(LlmClient::new(config).backend_name(), "failover");
    }
}
