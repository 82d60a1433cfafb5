//! Generative-language-model client used by the CreateMate worker agents.
//!
//! # Main types
//!
//! - [`LlmClient`]: Dispatches prompts to the configured provider backend.
//! - [`ModelConfig`]: Provider, model, credentials and retry settings.
//! - [`backends::LlmBackend`]: Trait implemented by every provider backend.
//! - [`failover::FailoverBackend`]: Retries and falls back across backends.

/// Provider backends.
pub mod backends;
/// Provider and model configuration.
pub mod config;
/// Retry and fallback across backends.
pub mod failover;
/// The client used by the agents.
pub mod llm;

pub use config::{LlmProvider, ModelConfig};
pub use failover::RetryPolicy;
pub use llm::LlmClient;
