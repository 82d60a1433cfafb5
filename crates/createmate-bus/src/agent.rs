use crate::address::Address;
use crate::bureau::Bureau;
use crate::envelope::Envelope;
use async_trait::async_trait;
use createmate_core::{AgentMessage, CreateMateError, CreateMateResult};
use std::sync::Arc;
use tokio::sync::mpsc;

/// A participant on the bus.
///
/// Handlers return an optional reply. For a query the reply resolves the
/// caller's pending request; otherwise it is delivered to the sender's
/// mailbox like any other message.
#[async_trait]
pub trait Agent: Send + Sync + 'static {
    /// Human-readable agent name used in logs and metrics.
    fn name(&self) -> &str;

    /// When true, every envelope is handled on its own task instead of in
    /// mailbox order.
    fn concurrent(&self) -> bool {
        false
    }

    /// Called once, after the mailbox is registered and before the first message.
    async fn on_startup(&self, ctx: &Context) -> CreateMateResult<()> {
        let _ = ctx;
        Ok(())
    }

    /// Handle one message.
    async fn on_message(
        &self,
        ctx: &Context,
        sender: &Address,
        message: AgentMessage,
    ) -> CreateMateResult<Option<AgentMessage>>;
}

/// Handle given to an agent's handlers.
#[derive(Clone)]
pub struct Context {
    address: Address,
    bureau: Arc<Bureau>,
    outbox: mpsc::UnboundedSender<Envelope>,
}

impl Context {
    pub(crate) fn new(
        address: Address,
        bureau: Arc<Bureau>,
        outbox: mpsc::UnboundedSender<Envelope>,
    ) -> Self {
        Self {
            address,
            bureau,
            outbox,
        }
    }

    /// This agent's own address.
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Send a message from this agent to `recipient`.
    ///
    /// Fails right away when nothing is registered at `recipient`. Otherwise
    /// the envelope is queued on this agent's outbox and the call returns
    /// without waiting for room in the recipient's mailbox.
    pub async fn send(
        &self,
        recipient: &Address,
        message: impl Into<AgentMessage> + Send,
    ) -> CreateMateResult<()> {
        if !self.bureau.is_registered(recipient).await {
            return Err(CreateMateError::Bus(format!(
                "No agent registered at {recipient}"
            )));
        }
        let envelope = Envelope::new(self.address.clone(), recipient.clone(), message.into(), None);
        self.outbox
            .send(envelope)
            .map_err(|_| CreateMateError::Bus(format!("Outbox of {} is closed", self.address)))
    }
}
