use crate::prompts::{parse_topics, topics_prompt};
use async_trait::async_trait;
use createmate_bus::{Address, Agent, Context};
use createmate_core::{AgentMessage, CreateMateResult, TopicSuggestion, WorkFailed, WorkStage};
use createmate_llm::LlmClient;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Suggests topics for the posting days still without content.
pub struct TopicSuggestionAgent {
    llm: Arc<LlmClient>,
}

impl TopicSuggestionAgent {
    /// Create the agent.
    pub fn new(llm: Arc<LlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Agent for TopicSuggestionAgent {
    fn name(&self) -> &str {
        "topic_suggestion_agent"
    }

    async fn on_message(
        &self,
        _ctx: &Context,
        sender: &Address,
        message: AgentMessage,
    ) -> CreateMateResult<Option<AgentMessage>> {
        let AgentMessage::TopicRequest(request) = message else {
            debug!(kind = message.kind(), from = %sender, "Ignoring message");
            return Ok(None);
        };

        let result = match self.llm.generate(&topics_prompt(&request)).await {
            Ok(text) => parse_topics(&text, request.num_topics),
            Err(e) => Err(e),
        };

        let reply: AgentMessage = match result {
            Ok(topics) => {
                info!(
                    session = %request.session_id,
                    count = topics.len(),
                    with_feedback = request.feedback.is_some(),
                    "Topics suggested"
                );
                TopicSuggestion {
                    session_id: request.session_id,
                    topics,
                }
                .into()
            }
            Err(e) => {
                warn!(session = %request.session_id, error = %e, "Topic suggestion failed");
                WorkFailed {
                    session_id: request.session_id,
                    stage: WorkStage::Topics,
                    reason: e.to_string(),
                    day: None,
                }
                .into()
            }
        };
        Ok(Some(reply))
    }
}
