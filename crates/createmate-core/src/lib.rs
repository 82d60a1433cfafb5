//! Core types and error definitions for CreateMate.
//!
//! This crate provides the foundational types shared across all CreateMate
//! crates: the unified error type, every message that travels between the
//! agents, and the input validation and formatting helpers.
//!
//! # Main types
//!
//! - [`CreateMateError`]: Unified error enum for all CreateMate subsystems.
//! - [`CreateMateResult`]: Convenience alias for `Result<T, CreateMateError>`.
//! - [`AgentMessage`]: Tagged union of every payload carried by the bus.
//! - [`UserInput`]: The user's area of interest, content type, keywords and frequency.
//! - [`Weekday`]: Canonical posting-day names.

/// Message models exchanged between agents.
pub mod message;
/// Input validation and content formatting helpers.
pub mod validation;
/// Posting-day parsing.
pub mod weekday;

pub use message::{
    Ack, AgentMessage, ContentRequest, DataResponse, DeleteData, Document, Feedback,
    GeneratedContent, RetrieveData, Schedule, ScheduleRequest, StateRequest, StateResponse,
    StoreData, TopicRequest, TopicSuggestion, UpdateData, UserInput, WorkFailed, WorkStage,
};
pub use validation::{format_content, validate_user_input};
pub use weekday::Weekday;

// --- Error types ---

/// Top-level error type for CreateMate.
///
/// Each variant corresponds to a subsystem that can produce errors.
#[derive(Debug, thiserror::Error)]
pub enum CreateMateError {
    /// User-supplied input was rejected.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The message bus could not deliver an envelope.
    #[error("Bus error: {0}")]
    Bus(String),

    /// A request/reply query did not complete in time.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// An agent failed while handling a message.
    #[error("Agent error: {0}")]
    Agent(String),

    /// The language model returned something unusable.
    #[error("LLM error: {0}")]
    Llm(String),

    /// An error from an outbound HTTP request (e.g. LLM API call).
    #[error("HTTP error: {0}")]
    Http(String),

    /// An error from the document store.
    #[error("Storage error: {0}")]
    Storage(String),

    /// An error in configuration parsing or validation.
    #[error("Config error: {0}")]
    Config(String),

    /// A JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`CreateMateError`].
pub type CreateMateResult<T> = Result<T, CreateMateError>;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_names_subsystem() {
        let err = CreateMateError::Timeout("state query".into());
        assert_eq!(err.to_string(), "Timeout: state query");
        let err = CreateMateError::Http("Gemini API error 503".into());
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn test_json_error_conversion() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: CreateMateError = parse.unwrap_err().into();
        assert!(matches!(err, CreateMateError::Json(_)));
    }
}
