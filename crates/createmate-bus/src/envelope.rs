use crate::address::Address;
use chrono::{DateTime, Utc};
use createmate_core::AgentMessage;
use tokio::sync::oneshot;
use uuid::Uuid;

/// A message in flight between two addresses.
#[derive(Debug)]
pub struct Envelope {
    /// Unique id, used to correlate log lines.
    pub id: Uuid,
    /// Address the envelope came from.
    pub sender: Address,
    /// Address whose mailbox receives it.
    pub recipient: Address,
    /// The payload.
    pub message: AgentMessage,
    /// When the envelope was created.
    pub sent_at: DateTime<Utc>,
    /// Present when the sender is waiting on a reply (see `Bureau::query`).
    pub(crate) reply_to: Option<oneshot::Sender<AgentMessage>>,
}

impl Envelope {
    pub(crate) fn new(
        sender: Address,
        recipient: Address,
        message: AgentMessage,
        reply_to: Option<oneshot::Sender<AgentMessage>>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
            recipient,
            message,
            sent_at: Utc::now(),
            reply_to,
        }
    }

    /// Whether the sender awaits a direct reply.
    pub fn is_query(&self) -> bool {
        self.reply_to.is_some()
    }
}
