use async_trait::async_trait;
use createmate_bus::{Address, Agent, Context};
use createmate_core::{AgentMessage, CreateMateResult, DataResponse};
use createmate_storage::DocumentStore;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error};

/// Serves store/retrieve/update/delete requests against a [`DocumentStore`].
pub struct StorageAgent {
    store: Arc<dyn DocumentStore>,
}

impl StorageAgent {
    /// Create the agent on top of `store`.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    async fn handle(&self, message: AgentMessage) -> Option<DataResponse> {
        let response = match message {
            AgentMessage::StoreData(req) => {
                match self.store.insert(&req.collection, req.data).await {
                    Ok(id) => DataResponse::ok(json!({ "inserted_id": id }), "Data stored successfully"),
                    Err(e) => failed("storing", &req.collection, e),
                }
            }
            AgentMessage::RetrieveData(req) => {
                match self.store.find_one(&req.collection, &req.query).await {
                    Ok(Some(doc)) => DataResponse::ok(doc.into(), "Data retrieved successfully"),
                    Ok(None) => DataResponse::failed("No data found"),
                    Err(e) => failed("retrieving", &req.collection, e),
                }
            }
            AgentMessage::UpdateData(req) => {
                match self.store.update_one(&req.collection, &req.query, &req.update).await {
                    Ok(count) => DataResponse::ok(
                        json!({ "modified_count": count }),
                        "Data updated successfully",
                    ),
                    Err(e) => failed("updating", &req.collection, e),
                }
            }
            AgentMessage::DeleteData(req) => {
                match self.store.delete_one(&req.collection, &req.query).await {
                    Ok(count) => DataResponse::ok(
                        json!({ "deleted_count": count }),
                        "Data deleted successfully",
                    ),
                    Err(e) => failed("deleting", &req.collection, e),
                }
            }
            _ => return None,
        };
        Some(response)
    }
}

fn failed(action: &str, collection: &str, e: createmate_core::CreateMateError) -> DataResponse {
    error!(collection, error = %e, "Error {action} data");
    DataResponse::failed(format!("Error {action} data: {e}"))
}

#[async_trait]
impl Agent for StorageAgent {
    fn name(&self) -> &str {
        "storage_agent"
    }

    async fn on_message(
        &self,
        _ctx: &Context,
        sender: &Address,
        message: AgentMessage,
    ) -> CreateMateResult<Option<AgentMessage>> {
        let kind = message.kind();
        debug!(kind, from = %sender, "Storage request");
        match self.handle(message).await {
            Some(response) => Ok(Some(response.into())),
            None => {
                debug!(kind, from = %sender, "Ignoring message");
                Ok(None)
            }
        }
    }
}
