use crate::content::ContentGenerationAgent;
use crate::coordinator::CoordinatorAgent;
use crate::scheduling::SchedulingAgent;
use crate::storage_agent::StorageAgent;
use crate::topics::TopicSuggestionAgent;
use crate::types::{AgentDirectory, AgentRole, AgentSeeds};
use createmate_bus::{Address, Bureau, BusMonitor, DEFAULT_MAILBOX_CAPACITY};
use createmate_core::{
    validate_user_input, Ack, AgentMessage, CreateMateError, CreateMateResult, Feedback,
    StateRequest, StateResponse, UserInput,
};
use createmate_llm::LlmClient;
use createmate_storage::DocumentStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Settings for [`Runtime::start`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Seed phrases for every agent address.
    #[serde(default)]
    pub seeds: AgentSeeds,
    /// How long API calls wait for the coordinator to reply.
    #[serde(default = "default_query_timeout_secs")]
    pub query_timeout_secs: u64,
    /// Pending envelopes each mailbox can hold.
    #[serde(default = "default_mailbox_capacity")]
    pub mailbox_capacity: usize,
    /// Apply sentence formatting to generated posts.
    #[serde(default)]
    pub format_output: bool,
}

fn default_query_timeout_secs() -> u64 {
    30
}

fn default_mailbox_capacity() -> usize {
    DEFAULT_MAILBOX_CAPACITY
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            seeds: AgentSeeds::default(),
            query_timeout_secs: default_query_timeout_secs(),
            mailbox_capacity: default_mailbox_capacity(),
            format_output: false,
        }
    }
}

/// The five agents running on one bureau.
pub struct Runtime {
    bureau: Arc<Bureau>,
    directory: AgentDirectory,
    api_address: Address,
    timeout: Duration,
}

impl Runtime {
    /// Register every agent and start their dispatch loops.
    pub async fn start(
        config: RuntimeConfig,
        llm: Arc<LlmClient>,
        store: Arc<dyn DocumentStore>,
    ) -> CreateMateResult<Self> {
        let directory = AgentDirectory::from_seeds(&config.seeds);
        directory.ensure_distinct()?;

        let bureau = Bureau::with_capacity(config.mailbox_capacity);
        bureau
            .register(directory.storage.clone(), Arc::new(StorageAgent::new(store)))
            .await?;
        bureau
            .register(
                directory.scheduler.clone(),
                Arc::new(SchedulingAgent::new(llm.clone())),
            )
            .await?;
        bureau
            .register(
                directory.topics.clone(),
                Arc::new(TopicSuggestionAgent::new(llm.clone())),
            )
            .await?;
        bureau
            .register(
                directory.content.clone(),
                Arc::new(ContentGenerationAgent::new(llm).with_formatting(config.format_output)),
            )
            .await?;
        // registered last so its startup sees every worker in place
        bureau
            .register(
                directory.coordinator.clone(),
                Arc::new(CoordinatorAgent::new(directory.clone())),
            )
            .await?;

        info!(
            coordinator = %directory.coordinator,
            timeout_secs = config.query_timeout_secs,
            "CreateMate runtime started"
        );

        Ok(Self {
            bureau,
            directory,
            api_address: Address::named("rest_api"),
            timeout: Duration::from_secs(config.query_timeout_secs),
        })
    }

    /// Start a new session for `input`.
    pub async fn submit_input(&self, input: UserInput) -> CreateMateResult<Ack> {
        validate_user_input(&input)?;
        expect_ack(self.ask(input.into()).await?)
    }

    /// Forward the user's verdict on the initial post.
    pub async fn submit_feedback(&self, feedback: Feedback) -> CreateMateResult<Ack> {
        expect_ack(self.ask(feedback.into()).await?)
    }

    /// Snapshot of the coordinator's session.
    pub async fn state(&self) -> CreateMateResult<StateResponse> {
        match self.ask(StateRequest::default().into()).await? {
            AgentMessage::StateResponse(state) => Ok(state),
            other => Err(unexpected(&other)),
        }
    }

    /// Per-agent metrics.
    pub fn monitor(&self) -> &Arc<BusMonitor> {
        self.bureau.monitor()
    }

    /// Every role with its address, in registration order.
    pub fn addresses(&self) -> Vec<(AgentRole, Address)> {
        self.directory.entries()
    }

    /// Addresses of all agents.
    pub fn directory(&self) -> &AgentDirectory {
        &self.directory
    }

    /// Stop every agent.
    ///
    /// Returns once every dispatch loop has ended and every running handler,
    /// including in-flight content generations, has finished.
    pub async fn shutdown(&self) {
        self.bureau.shutdown().await;
    }

    async fn ask(&self, message: AgentMessage) -> CreateMateResult<AgentMessage> {
        self.bureau
            .query(
                self.api_address.clone(),
                &self.directory.coordinator,
                message,
                self.timeout,
            )
            .await
    }
}

fn expect_ack(reply: AgentMessage) -> CreateMateResult<Ack> {
    match reply {
        AgentMessage::Ack(ack) => Ok(ack),
        other => Err(unexpected(&other)),
    }
}

fn unexpected(reply: &AgentMessage) -> CreateMateError {
    CreateMateError::Agent(format!(
        "Unexpected {} reply from the coordinator",
        reply.kind()
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_from_empty_object() {
        let config: RuntimeConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.query_timeout_secs, 30);
        assert_eq!(config.mailbox_capacity, DEFAULT_MAILBOX_CAPACITY);
        assert!(!config.format_output);
        assert_eq!(config.seeds, AgentSeeds::default());
    }
}
