//! In-process message bus for CreateMate agents.
//!
//! Agents are registered on a [`Bureau`] under an [`Address`]. Each agent
//! owns a bounded mailbox drained by a dedicated dispatch loop; messages are
//! delivered fire-and-forget with [`Bureau::send`], or as request/reply with
//! [`Bureau::query`]. Messages sent by agents go through a per-agent outbox,
//! so a handler never blocks on another agent's full mailbox. Handler failures are logged and counted by the
//! [`BusMonitor`], never bounced back to the sender.
//!
//! # Main types
//!
//! - [`Address`]: Opaque agent address, derivable from a seed phrase.
//! - [`Agent`]: Trait implemented by every agent.
//! - [`Context`]: Handle passed to handlers for sending follow-on messages.
//! - [`Bureau`]: Agent registry and dispatcher.
//! - [`BusMonitor`]: Per-agent message counters.

/// Agent addresses.
pub mod address;
/// The `Agent` trait and handler context.
pub mod agent;
/// Agent registry, mailboxes and dispatch.
pub mod bureau;
/// Envelopes carried between mailboxes.
pub mod envelope;
/// Per-agent metrics.
pub mod monitor;

pub use address::Address;
pub use agent::{Agent, Context};
pub use bureau::{Bureau, DEFAULT_MAILBOX_CAPACITY};
pub use envelope::Envelope;
pub use monitor::{AgentMetrics, AgentState, BusMonitor, WorkerStatus};
