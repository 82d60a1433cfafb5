/// Google Gemini backend.
pub mod gemini;
/// OpenAI-compatible chat completions backend.
pub mod openai;

use async_trait::async_trait;
use createmate_core::CreateMateResult;

/// Trait for generative-model provider backends.
///
/// Each provider turns a single prompt into generated text. `LlmClient`
/// picks the implementation from `ModelConfig::provider`.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &str;

    /// Generate a completion for `prompt`.
    async fn generate(&self, prompt: &str) -> CreateMateResult<String>;
}
