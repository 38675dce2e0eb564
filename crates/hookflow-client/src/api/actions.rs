//! Actions API.

use serde_json::Value;

use crate::client::HookflowClient;
use crate::error::Result;
use crate::types::{Action, ActionRequest, Listing, RecordId};

/// Query parameters for listing actions.
#[derive(Debug, Default, serde::Serialize)]
pub struct ListActionsQuery {
    /// Only actions owned by this connector.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connector_id: Option<RecordId>,
}

/// Actions API client.
pub struct ActionsApi {
    client: HookflowClient,
}

impl ActionsApi {
    pub(crate) fn new(client: HookflowClient) -> Self {
        Self { client }
    }

    /// List actions, optionally for a single connector.
    pub async fn list(&self, query: ListActionsQuery) -> Result<Vec<Action>> {
        let listing: Listing<Action> = self.client.get_with_query("actions", &query).await?;
        Ok(listing.into_items())
    }

    /// Get an action by ID.
    pub async fn get(&self, id: RecordId) -> Result<Action> {
        self.client.get(&format!("actions/{}", id)).await
    }

    /// Create a new action.
    pub async fn create(&self, request: &ActionRequest) -> Result<Action> {
        self.client.post("actions", request).await
    }

    /// Replace an action.
    pub async fn update(&self, id: RecordId, request: &ActionRequest) -> Result<Action> {
        self.client.put(&format!("actions/{}", id), request).await
    }

    /// Delete an action.
    pub async fn delete(&self, id: RecordId) -> Result<()> {
        self.client.delete(&format!("actions/{}", id)).await
    }

    /// Fire an action once with optional overrides and return the raw result.
    pub async fn test(&self, id: RecordId, overrides: &Value) -> Result<Value> {
        self.client
            .post(&format!("actions/{}/test", id), overrides)
            .await
    }
}
