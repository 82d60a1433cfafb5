//! The CreateMate agents and the runtime that wires them onto a bureau.
//!
//! # Main types
//!
//! - [`Runtime`]: Starts all five agents and exposes the submit/state API.
//! - [`CoordinatorAgent`]: Sequences a session through schedule, topics and content.
//! - [`SessionState`]: The coordinator's state machine, free of any I/O.
//! - [`SchedulingAgent`], [`TopicSuggestionAgent`], [`ContentGenerationAgent`]: LLM-backed workers.
//! - [`StorageAgent`]: Serves store/retrieve/update/delete requests from a document store.

/// Main coordinator agent.
pub mod coordinator;
/// Content generation worker.
pub mod content;
/// Prompt construction and model-output parsing.
pub mod prompts;
/// Runtime wiring and the public submit/state API.
pub mod runtime;
/// Weekly schedule worker.
pub mod scheduling;
/// Coordinator session state machine.
pub mod state;
/// Document store agent.
pub mod storage_agent;
/// Topic suggestion worker.
pub mod topics;
/// Agent roles, seeds and addresses.
pub mod types;

pub use content::ContentGenerationAgent;
pub use coordinator::CoordinatorAgent;
pub use runtime::{Runtime, RuntimeConfig};
pub use scheduling::SchedulingAgent;
pub use state::{Effect, SessionState};
pub use storage_agent::StorageAgent;
pub use topics::TopicSuggestionAgent;
pub use types::{collections, AgentDirectory, AgentRole, AgentSeeds};
