use crate::address::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Message counters tracked per agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentMetrics {
    /// Messages picked up from the mailbox.
    pub messages_received: u64,
    /// Messages put on the bus, replies included.
    pub messages_sent: u64,
    /// Handler failures and undeliverable messages.
    pub errors: u64,
    /// Total time spent inside handlers.
    pub handling_ms: u64,
}

/// Coarse activity state of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerStatus {
    /// Waiting for messages.
    Idle,
    /// At least one handler is running.
    Working,
    /// The last handler failed.
    Error,
}

/// Real-time snapshot of one agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentState {
    /// Agent name as reported by [`crate::Agent::name`].
    pub name: String,
    /// Address the agent is registered at.
    pub address: Address,
    /// Current activity.
    pub status: WorkerStatus,
    /// Handlers currently running. Above one only for concurrent agents.
    pub in_flight: u32,
    /// Counters since registration.
    pub metrics: AgentMetrics,
    /// Most recent failure, kept until the next error replaces it.
    pub last_error: Option<String>,
    /// When the agent last picked up a message.
    pub last_active: Option<DateTime<Utc>>,
}

/// Tracks state and metrics for every agent registered on a bureau.
///
/// Updates for addresses that were never registered (e.g. the REST API
/// sending a query) are ignored.
pub struct BusMonitor {
    states: RwLock<HashMap<Address, AgentState>>,
}

impl BusMonitor {
    /// Create an empty monitor.
    pub fn new() -> Self {
        Self {
            states: RwLock::new(HashMap::new()),
        }
    }

    /// Start tracking an agent.
    pub async fn register(&self, name: &str, address: &Address) {
        self.states.write().await.insert(
            address.clone(),
            AgentState {
                name: name.to_string(),
                address: address.clone(),
                status: WorkerStatus::Idle,
                in_flight: 0,
                metrics: AgentMetrics::default(),
                last_error: None,
                last_active: None,
            },
        );
    }

    /// An agent picked up a message.
    pub async fn start_message(&self, address: &Address) {
        let mut states = self.states.write().await;
        if let Some(state) = states.get_mut(address) {
            state.metrics.messages_received += 1;
            state.in_flight += 1;
            state.status = WorkerStatus::Working;
            state.last_active = Some(Utc::now());
        }
    }

    /// An agent finished handling a message.
    ///
    /// The status only returns to idle once no other handler of the same
    /// agent is still running.
    pub async fn finish_message(&self, address: &Address, duration_ms: u64) {
        let mut states = self.states.write().await;
        if let Some(state) = states.get_mut(address) {
            state.metrics.handling_ms += duration_ms;
            state.in_flight = state.in_flight.saturating_sub(1);
            if state.in_flight == 0 && state.status == WorkerStatus::Working {
                state.status = WorkerStatus::Idle;
            }
        }
    }

    /// An agent put a message on the bus.
    pub async fn record_sent(&self, address: &Address) {
        let mut states = self.states.write().await;
        if let Some(state) = states.get_mut(address) {
            state.metrics.messages_sent += 1;
        }
    }

    /// Record a handler error for an agent.
    pub async fn record_error(&self, address: &Address, error: impl Into<String>) {
        let mut states = self.states.write().await;
        if let Some(state) = states.get_mut(address) {
            state.metrics.errors += 1;
            state.status = WorkerStatus::Error;
            state.last_error = Some(error.into());
        }
    }

    /// Get a snapshot of all agent states, sorted by name.
    pub async fn snapshot(&self) -> Vec<AgentState> {
        let states = self.states.read().await;
        let mut all: Vec<AgentState> = states.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    /// Get the state of a specific agent.
    pub async fn get_state(&self, address: &Address) -> Option<AgentState> {
        self.states.read().await.get(address).cloned()
    }

    /// Get aggregate metrics across all agents.
    pub async fn aggregate_metrics(&self) -> AgentMetrics {
        let states = self.states.read().await;
        let mut total = AgentMetrics::default();
        for state in states.values() {
            total.messages_received += state.metrics.messages_received;
            total.messages_sent += state.metrics.messages_sent;
            total.errors += state.metrics.errors;
            total.handling_ms += state.metrics.handling_ms;
        }
        total
    }

    /// Serialize the current state as JSON.
    pub async fn to_json(&self) -> serde_json::Value {
        let agents = self.snapshot().await;
        let aggregate = self.aggregate_metrics().await;
        serde_json::json!({
            "agents": agents,
            "aggregate": aggregate,
        })
    }
}

impl Default for BusMonitor {
    fn default() -> Self {
        Self::new()
    }
}
