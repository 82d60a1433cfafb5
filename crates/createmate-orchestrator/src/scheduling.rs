use crate::prompts::{parse_schedule, schedule_prompt};
use async_trait::async_trait;
use createmate_bus::{Address, Agent, Context};
use createmate_core::{AgentMessage, CreateMateResult, Schedule, WorkFailed, WorkStage};
use createmate_llm::LlmClient;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Turns a user's preferences into a set of posting days.
pub struct SchedulingAgent {
    llm: Arc<LlmClient>,
}

impl SchedulingAgent {
    /// Create the agent.
    pub fn new(llm: Arc<LlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Agent for SchedulingAgent {
    fn name(&self) -> &str {
        "scheduling_agent"
    }

    async fn on_message(
        &self,
        _ctx: &Context,
        sender: &Address,
        message: AgentMessage,
    ) -> CreateMateResult<Option<AgentMessage>> {
        let AgentMessage::ScheduleRequest(request) = message else {
            debug!(kind = message.kind(), from = %sender, "Ignoring message");
            return Ok(None);
        };

        let frequency = request.input.post_frequency;
        let prompt = schedule_prompt(&request.input);
        let result = match self.llm.generate(&prompt).await {
            Ok(text) => parse_schedule(&text, frequency),
            Err(e) => Err(e),
        };

        let reply: AgentMessage = match result {
            Ok(posting_days) => {
                info!(session = %request.session_id, days = ?posting_days, "Schedule generated");
                Schedule {
                    session_id: request.session_id,
                    posting_days,
                }
                .into()
            }
            Err(e) => {
                warn!(session = %request.session_id, error = %e, "Schedule generation failed");
                WorkFailed {
                    session_id: request.session_id,
                    stage: WorkStage::Schedule,
                    reason: e.to_string(),
                    day: None,
                }
                .into()
            }
        };
        Ok(Some(reply))
    }
}
