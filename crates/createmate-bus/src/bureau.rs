use crate::address::Address;
use crate::agent::{Agent, Context};
use crate::envelope::Envelope;
use crate::monitor::BusMonitor;
use createmate_core::{AgentMessage, CreateMateError, CreateMateResult};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, oneshot, Mutex, RwLock};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};

/// Mailbox depth used by [`Bureau::new`].
pub const DEFAULT_MAILBOX_CAPACITY: usize = 64;

struct Mailbox {
    name: String,
    tx: mpsc::Sender<Envelope>,
}

/// Registry of agents and the dispatcher between their mailboxes.
pub struct Bureau {
    mailboxes: RwLock<HashMap<Address, Mailbox>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    monitor: Arc<BusMonitor>,
    capacity: usize,
}

impl Bureau {
    /// Create a bureau with [`DEFAULT_MAILBOX_CAPACITY`] mailboxes.
    pub fn new() -> Arc<Self> {
        Self::with_capacity(DEFAULT_MAILBOX_CAPACITY)
    }

    /// Create a bureau whose mailboxes hold at most `capacity` pending envelopes.
    pub fn with_capacity(capacity: usize) -> Arc<Self> {
        Arc::new(Self {
            mailboxes: RwLock::new(HashMap::new()),
            tasks: Mutex::new(Vec::new()),
            monitor: Arc::new(BusMonitor::new()),
            capacity: capacity.max(1),
        })
    }

    /// Get a reference to the monitor.
    pub fn monitor(&self) -> &Arc<BusMonitor> {
        &self.monitor
    }

    /// Register `agent` at `address` and start its dispatch loop.
    ///
    /// `on_startup` runs before this returns; a startup failure is logged and
    /// the agent is still registered.
    ///
    /// Messages the agent sends go through an unbounded outbox drained by its
    /// own forwarding task, so a handler never waits on another agent's full
    /// mailbox.
    pub async fn register(
        self: &Arc<Self>,
        address: Address,
        agent: Arc<dyn Agent>,
    ) -> CreateMateResult<()> {
        let (tx, rx) = mpsc::channel(self.capacity);
        {
            let mut mailboxes = self.mailboxes.write().await;
            if let Some(existing) = mailboxes.get(&address) {
                return Err(CreateMateError::Bus(format!(
                    "Address {address} is already registered to {}",
                    existing.name
                )));
            }
            mailboxes.insert(
                address.clone(),
                Mailbox {
                    name: agent.name().to_string(),
                    tx,
                },
            );
        }
        self.monitor.register(agent.name(), &address).await;

        let (outbox, outbox_rx) = mpsc::unbounded_channel();
        let forwarder = tokio::spawn(run_outbox(self.clone(), outbox_rx));
        let ctx = Context::new(address.clone(), self.clone(), outbox);
        if let Err(e) = agent.on_startup(&ctx).await {
            warn!(agent = agent.name(), error = %e, "Agent startup hook failed");
            self.monitor.record_error(&address, e.to_string()).await;
        }

        info!(agent = agent.name(), address = %address, "Agent started");

        let monitor = self.monitor.clone();
        let handle = tokio::spawn(run_mailbox(agent, ctx, rx, monitor));
        let mut tasks = self.tasks.lock().await;
        tasks.push(handle);
        tasks.push(forwarder);
        Ok(())
    }

    /// Deliver `message` to `recipient` without waiting for it to be handled.
    pub async fn send(
        &self,
        sender: Address,
        recipient: &Address,
        message: AgentMessage,
    ) -> CreateMateResult<()> {
        self.deliver(Envelope::new(sender, recipient.clone(), message, None))
            .await
    }

    /// Deliver `message` and wait up to `timeout` for the recipient's reply.
    ///
    /// The deadline covers waiting for room in the recipient's mailbox as well
    /// as the reply itself.
    pub async fn query(
        &self,
        sender: Address,
        recipient: &Address,
        message: AgentMessage,
        timeout: Duration,
    ) -> CreateMateResult<AgentMessage> {
        let kind = message.kind();
        let (tx, rx) = oneshot::channel();
        let exchange = async {
            self.deliver(Envelope::new(sender, recipient.clone(), message, Some(tx)))
                .await?;
            rx.await.map_err(|_| {
                CreateMateError::Bus(format!("{recipient} handled {kind} without replying"))
            })
        };

        match tokio::time::timeout(timeout, exchange).await {
            Ok(result) => result,
            Err(_) => Err(CreateMateError::Timeout(format!(
                "No reply to {kind} from {recipient} within {}ms",
                timeout.as_millis()
            ))),
        }
    }

    pub(crate) async fn deliver(&self, envelope: Envelope) -> CreateMateResult<()> {
        let tx = {
            let mailboxes = self.mailboxes.read().await;
            mailboxes.get(&envelope.recipient).map(|m| m.tx.clone())
        }
        .ok_or_else(|| {
            CreateMateError::Bus(format!("No agent registered at {}", envelope.recipient))
        })?;

        let sender = envelope.sender.clone();
        let recipient = envelope.recipient.clone();
        debug!(
            envelope_id = %envelope.id,
            from = %sender,
            to = %recipient,
            kind = envelope.message.kind(),
            query = envelope.is_query(),
            "Delivering envelope"
        );

        tx.send(envelope)
            .await
            .map_err(|_| CreateMateError::Bus(format!("Mailbox of {recipient} is closed")))?;
        self.monitor.record_sent(&sender).await;
        Ok(())
    }

    /// All registered addresses.
    pub async fn addresses(&self) -> Vec<Address> {
        let mut all: Vec<Address> = self.mailboxes.read().await.keys().cloned().collect();
        all.sort();
        all
    }

    /// Whether an agent is registered at `address`.
    pub async fn is_registered(&self, address: &Address) -> bool {
        self.mailboxes.read().await.contains_key(address)
    }

    /// Close every mailbox and wait for the dispatch loops to drain.
    ///
    /// Handlers already running, including concurrent ones, finish before
    /// this returns. Replies they send afterwards are undeliverable and are
    /// counted as errors.
    pub async fn shutdown(&self) {
        let closed = {
            let mut mailboxes = self.mailboxes.write().await;
            let count = mailboxes.len();
            mailboxes.clear();
            count
        };
        let tasks = std::mem::take(&mut *self.tasks.lock().await);
        for task in tasks {
            if let Err(e) = task.await {
                warn!(error = %e, "Dispatch loop ended abnormally");
            }
        }
        info!(agents = closed, "Bureau shut down");
    }
}

async fn run_mailbox(
    agent: Arc<dyn Agent>,
    ctx: Context,
    mut rx: mpsc::Receiver<Envelope>,
    monitor: Arc<BusMonitor>,
) {
    let mut in_flight = JoinSet::new();
    while let Some(envelope) = rx.recv().await {
        if agent.concurrent() {
            let agent = agent.clone();
            let ctx = ctx.clone();
            let monitor = monitor.clone();
            in_flight.spawn(async move {
                handle_envelope(agent.as_ref(), &ctx, envelope, &monitor).await;
            });
            while in_flight.try_join_next().is_some() {}
        } else {
            handle_envelope(agent.as_ref(), &ctx, envelope, &monitor).await;
        }
    }
    while let Some(finished) = in_flight.join_next().await {
        if let Err(e) = finished {
            warn!(agent = agent.name(), error = %e, "Concurrent handler panicked");
        }
    }
    debug!(agent = agent.name(), "Mailbox closed");
}

/// Forward one agent's outgoing envelopes in the order they were sent.
async fn run_outbox(bureau: Arc<Bureau>, mut rx: mpsc::UnboundedReceiver<Envelope>) {
    while let Some(envelope) = rx.recv().await {
        let sender = envelope.sender.clone();
        let recipient = envelope.recipient.clone();
        if let Err(e) = bureau.deliver(envelope).await {
            warn!(from = %sender, to = %recipient, error = %e, "Failed to forward envelope");
            bureau.monitor.record_error(&sender, e.to_string()).await;
        }
    }
}

async fn handle_envelope(agent: &dyn Agent, ctx: &Context, envelope: Envelope, monitor: &BusMonitor) {
    let Envelope {
        id,
        sender,
        message,
        reply_to,
        ..
    } = envelope;
    let kind = message.kind();
    let address = ctx.address();

    monitor.start_message(address).await;
    let start = Instant::now();
    let result = agent.on_message(ctx, &sender, message).await;
    monitor
        .finish_message(address, start.elapsed().as_millis() as u64)
        .await;

    match result {
        Ok(Some(reply)) => match reply_to {
            Some(tx) => {
                if tx.send(reply).is_err() {
                    debug!(agent = agent.name(), envelope_id = %id, "Query caller went away before the reply");
                }
            }
            None => {
                if let Err(e) = ctx.send(&sender, reply).await {
                    warn!(agent = agent.name(), to = %sender, error = %e, "Failed to deliver reply");
                    monitor.record_error(address, e.to_string()).await;
                }
            }
        },
        Ok(None) => {}
        Err(e) => {
            warn!(
                agent = agent.name(),
                from = %sender,
                kind,
                error = %e,
                "Handler failed, message dropped"
            );
            monitor.record_error(address, e.to_string()).await;
        }
    }
}
