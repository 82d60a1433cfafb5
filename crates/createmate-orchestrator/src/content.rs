use crate::prompts::content_prompt;
use async_trait::async_trait;
use createmate_bus::{Address, Agent, Context};
use createmate_core::{
    format_content, AgentMessage, CreateMateResult, GeneratedContent, WorkFailed, WorkStage,
};
use createmate_llm::LlmClient;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Writes one post per request. Requests are handled concurrently.
pub struct ContentGenerationAgent {
    llm: Arc<LlmClient>,
    format_output: bool,
}

impl ContentGenerationAgent {
    /// Create the agent; formatting is off by default.
    pub fn new(llm: Arc<LlmClient>) -> Self {
        Self {
            llm,
            format_output: false,
        }
    }

    /// Run generated text through [`format_content`] before replying.
    pub fn with_formatting(mut self, format_output: bool) -> Self {
        self.format_output = format_output;
        self
    }
}

#[async_trait]
impl Agent for ContentGenerationAgent {
    fn name(&self) -> &str {
        "content_generation_agent"
    }

    fn concurrent(&self) -> bool {
        true
    }

    async fn on_message(
        &self,
        _ctx: &Context,
        sender: &Address,
        message: AgentMessage,
    ) -> CreateMateResult<Option<AgentMessage>> {
        let AgentMessage::ContentRequest(request) = message else {
            debug!(kind = message.kind(), from = %sender, "Ignoring message");
            return Ok(None);
        };

        let reply: AgentMessage = match self.llm.generate(&content_prompt(&request)).await {
            Ok(text) => {
                let content = if self.format_output {
                    format_content(&text)
                } else {
                    text.trim().to_string()
                };
                info!(
                    session = %request.session_id,
                    day = %request.day,
                    chars = content.len(),
                    "Content generated"
                );
                GeneratedContent {
                    session_id: request.session_id,
                    topic: request.topic,
                    content,
                    day: request.day,
                }
                .into()
            }
            Err(e) => {
                warn!(session = %request.session_id, day = %request.day, error = %e, "Content generation failed");
                WorkFailed {
                    session_id: request.session_id,
                    stage: WorkStage::Content,
                    reason: e.to_string(),
                    day: Some(request.day),
                }
                .into()
            }
        };
        Ok(Some(reply))
    }
}
