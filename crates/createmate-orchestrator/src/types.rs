use createmate_bus::Address;
use serde::{Deserialize, Serialize};

/// Role of each agent in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    /// Owns the session and sequences the workers.
    Coordinator,
    /// Picks posting days.
    Scheduler,
    /// Suggests topics after feedback.
    TopicSuggester,
    /// Writes posts.
    ContentGenerator,
    /// Persists documents.
    Storage,
}

impl AgentRole {
    /// Every role, coordinator first.
    pub const ALL: [AgentRole; 5] = [
        AgentRole::Coordinator,
        AgentRole::Scheduler,
        AgentRole::TopicSuggester,
        AgentRole::ContentGenerator,
        AgentRole::Storage,
    ];
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentRole::Coordinator => write!(f, "main_coordinator"),
            AgentRole::Scheduler => write!(f, "scheduling_agent"),
            AgentRole::TopicSuggester => write!(f, "topic_suggestion_agent"),
            AgentRole::ContentGenerator => write!(f, "content_generation_agent"),
            AgentRole::Storage => write!(f, "storage_agent"),
        }
    }
}

/// Secret seed phrase per agent. Addresses are derived from these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSeeds {
    /// Seed of the main coordinator.
    #[serde(default = "default_coordinator_seed")]
    pub coordinator: String,
    /// Seed of the scheduling agent.
    #[serde(default = "default_scheduler_seed")]
    pub scheduler: String,
    /// Seed of the topic suggestion agent.
    #[serde(default = "default_topics_seed")]
    pub topics: String,
    /// Seed of the content generation agent.
    #[serde(default = "default_content_seed")]
    pub content: String,
    /// Seed of the storage agent.
    #[serde(default = "default_storage_seed")]
    pub storage: String,
}

fn default_coordinator_seed() -> String {
    "main_coordinator_secret_seed_phrase".into()
}

fn default_scheduler_seed() -> String {
    "scheduling_agent_secret_seed_phrase".into()
}

fn default_topics_seed() -> String {
    "topic_suggestion_agent_secret_seed_phrase".into()
}

fn default_content_seed() -> String {
    "content_generation_agent_secret_seed_phrase".into()
}

fn default_storage_seed() -> String {
    "storage_agent_secret_seed_phrase".into()
}

impl Default for AgentSeeds {
    fn default() -> Self {
        Self {
            coordinator: default_coordinator_seed(),
            scheduler: default_scheduler_seed(),
            topics: default_topics_seed(),
            content: default_content_seed(),
            storage: default_storage_seed(),
        }
    }
}

/// Where every agent lives on the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentDirectory {
    /// Address of the main coordinator.
    pub coordinator: Address,
    /// Address of the scheduling agent.
    pub scheduler: Address,
    /// Address of the topic suggestion agent.
    pub topics: Address,
    /// Address of the content generation agent.
    pub content: Address,
    /// Address of the storage agent.
    pub storage: Address,
}

impl AgentDirectory {
    /// Derive every address from its seed.
    pub fn from_seeds(seeds: &AgentSeeds) -> Self {
        Self {
            coordinator: Address::from_seed(&seeds.coordinator),
            scheduler: Address::from_seed(&seeds.scheduler),
            topics: Address::from_seed(&seeds.topics),
            content: Address::from_seed(&seeds.content),
            storage: Address::from_seed(&seeds.storage),
        }
    }

    /// Address of the agent filling `role`.
    pub fn address_of(&self, role: AgentRole) -> &Address {
        match role {
            AgentRole::Coordinator => &self.coordinator,
            AgentRole::Scheduler => &self.scheduler,
            AgentRole::TopicSuggester => &self.topics,
            AgentRole::ContentGenerator => &self.content,
            AgentRole::Storage => &self.storage,
        }
    }

    /// `(role, address)` for every agent, coordinator first.
    pub fn entries(&self) -> Vec<(AgentRole, Address)> {
        AgentRole::ALL
            .iter()
            .map(|role| (*role, self.address_of(*role).clone()))
            .collect()
    }

    /// Fails when two agents would share an address.
    pub fn ensure_distinct(&self) -> createmate_core::CreateMateResult<()> {
        let entries = self.entries();
        for (i, (role, address)) in entries.iter().enumerate() {
            if let Some((other, _)) = entries[i + 1..].iter().find(|(_, a)| a == address) {
                return Err(createmate_core::CreateMateError::Config(format!(
                    "{role} and {other} resolve to the same address {address}; use distinct seeds"
                )));
            }
        }
        Ok(())
    }
}

/// Collection names the coordinator persists to.
pub mod collections {
    /// User inputs, one per session.
    pub const USER_INPUTS: &str = "user_inputs";
    /// Schedules returned by the scheduler.
    pub const SCHEDULES: &str = "schedules";
    /// Generated posts.
    pub const GENERATED_CONTENT: &str = "generated_content";
    /// Topic suggestions.
    pub const SUGGESTED_TOPICS: &str = "suggested_topics";
    /// User feedback.
    pub const FEEDBACK: &str = "feedback";
}
