use crate::state::{Effect, SessionState};
use crate::types::AgentDirectory;
use async_trait::async_trait;
use createmate_bus::{Address, Agent, Context};
use createmate_core::{Ack, AgentMessage, CreateMateResult};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Owns the session and drives the workers through it.
pub struct CoordinatorAgent {
    directory: AgentDirectory,
    state: Mutex<SessionState>,
}

impl CoordinatorAgent {
    /// Create a coordinator addressing the agents in `directory`.
    pub fn new(directory: AgentDirectory) -> Self {
        Self {
            directory,
            state: Mutex::new(SessionState::new()),
        }
    }

    fn recipient(&self, effect: &Effect) -> &Address {
        match effect {
            Effect::Schedule(_) => &self.directory.scheduler,
            Effect::Topics(_) => &self.directory.topics,
            Effect::Content(_) => &self.directory.content,
            Effect::Store(_) => &self.directory.storage,
        }
    }

    /// Send every effect; delivery failures are recorded on the session.
    async fn dispatch(&self, ctx: &Context, effects: Vec<Effect>) {
        let mut failures = Vec::new();
        for effect in effects {
            let recipient = self.recipient(&effect).clone();
            let message = effect.into_message();
            let kind = message.kind();
            if let Err(e) = ctx.send(&recipient, message).await {
                warn!(kind, to = %recipient, error = %e, "Failed to dispatch");
                failures.push(format!("dispatch {kind}: {e}"));
            }
        }
        if !failures.is_empty() {
            let mut state = self.state.lock().await;
            for failure in failures {
                state.record_error(failure);
            }
        }
    }
}

#[async_trait]
impl Agent for CoordinatorAgent {
    fn name(&self) -> &str {
        "main_coordinator"
    }

    async fn on_startup(&self, ctx: &Context) -> CreateMateResult<()> {
        info!(address = %ctx.address(), "Main coordinator ready");
        Ok(())
    }

    async fn on_message(
        &self,
        ctx: &Context,
        sender: &Address,
        message: AgentMessage,
    ) -> CreateMateResult<Option<AgentMessage>> {
        let mut state = self.state.lock().await;
        if !state.accepts(&message) {
            debug!(
                kind = message.kind(),
                from = %sender,
                session = ?message.session_id(),
                "Dropping message from a previous session"
            );
            return Ok(None);
        }

        match message {
            AgentMessage::UserInput(input) => {
                info!(
                    area = %input.area_of_interest,
                    content_type = %input.content_type,
                    frequency = input.post_frequency,
                    "Received user input"
                );
                let effects = state.start_session(input)?;
                let session_id = state.session_id().unwrap_or_default();
                drop(state);
                self.dispatch(ctx, effects).await;
                Ok(Some(
                    Ack::new(format!(
                        "Input received; building schedule for session {session_id}"
                    ))
                    .into(),
                ))
            }
            AgentMessage::Schedule(schedule) => {
                info!(days = ?schedule.posting_days, "Received schedule");
                let effects = state.apply_schedule(schedule)?;
                drop(state);
                self.dispatch(ctx, effects).await;
                Ok(None)
            }
            AgentMessage::GeneratedContent(content) => {
                info!(day = %content.day, topic = %content.topic, "Received generated content");
                let effects = state.apply_content(content)?;
                drop(state);
                self.dispatch(ctx, effects).await;
                Ok(None)
            }
            AgentMessage::TopicSuggestion(suggestion) => {
                info!(topics = suggestion.topics.len(), "Received topic suggestions");
                let effects = state.apply_topics(suggestion)?;
                drop(state);
                self.dispatch(ctx, effects).await;
                Ok(None)
            }
            AgentMessage::Feedback(feedback) => {
                info!(liked = feedback.liked, "Received feedback");
                let (reply, effects) = state.apply_feedback(feedback)?;
                drop(state);
                self.dispatch(ctx, effects).await;
                Ok(Some(Ack::new(reply).into()))
            }
            AgentMessage::StateRequest(_) => Ok(Some(state.snapshot().into())),
            AgentMessage::WorkFailed(failure) => {
                warn!(
                    stage = %failure.stage,
                    day = ?failure.day,
                    reason = %failure.reason,
                    "Worker reported a failure"
                );
                state.apply_failure(failure);
                Ok(None)
            }
            AgentMessage::DataResponse(response) => {
                if response.success {
                    debug!(data = ?response.data, "{}", response.message);
                } else {
                    warn!(message = %response.message, "Storage request failed");
                }
                Ok(None)
            }
            other => {
                debug!(kind = other.kind(), from = %sender, "Ignoring message");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::types::AgentSeeds;
    use createmate_bus::Bureau;
    use createmate_core::{Feedback, StateRequest, UserInput};
    use std::sync::Arc;
    use std::time::Duration;

    async fn coordinator_only() -> (Arc<Bureau>, AgentDirectory) {
        let directory = AgentDirectory::from_seeds(&AgentSeeds::default());
        let bureau = Bureau::new();
        bureau
            .register(
                directory.coordinator.clone(),
                Arc::new(CoordinatorAgent::new(directory.clone())),
            )
            .await
            .unwrap();
        (bureau, directory)
    }

    #[tokio::test]
    async fn test_feedback_before_input_acks() {
        let (bureau, directory) = coordinator_only().await;
        let reply = bureau
            .query(
                Address::named("test"),
                &directory.coordinator,
                Feedback {
                    liked: true,
                    comments: None,
                }
                .into(),
                Duration::from_secs(1),
            )
            .await
            .unwrap();
        match reply {
            AgentMessage::Ack(ack) => assert!(ack.message.contains("nothing pending")),
            other => panic!("expected ack, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_undeliverable_effects_become_errors() {
        // only the coordinator is registered, so every dispatch fails
        let (bureau, directory) = coordinator_only().await;
        let input = UserInput {
            area_of_interest: "AI".into(),
            content_type: "Blog".into(),
            keywords: vec!["agents".into()],
            post_frequency: 1,
        };
        bureau
            .query(
                Address::named("test"),
                &directory.coordinator,
                input.into(),
                Duration::from_secs(1),
            )
            .await
            .unwrap();

        let reply = bureau
            .query(
                Address::named("test"),
                &directory.coordinator,
                StateRequest::default().into(),
                Duration::from_secs(1),
            )
            .await
            .unwrap();
        let AgentMessage::StateResponse(state) = reply else {
            panic!("expected a state response");
        };
        assert_eq!(state.errors.len(), 2);
        assert!(state.errors[0].starts_with("dispatch store_data"));
        assert!(state.errors[1].starts_with("dispatch schedule_request"));
    }

    #[tokio::test]
    async fn test_storage_replies_are_absorbed() {
        let (bureau, directory) = coordinator_only().await;
        let err = bureau
            .query(
                Address::named("test"),
                &directory.coordinator,
                createmate_core::DataResponse::failed("No data found").into(),
                Duration::from_secs(1),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, createmate_core::CreateMateError::Bus(_)));
    }
}
