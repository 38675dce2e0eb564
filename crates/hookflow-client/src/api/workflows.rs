//! Workflows API.

use crate::client::HookflowClient;
use crate::error::Result;
use crate::types::{Listing, RecordId, Workflow, WorkflowExecution, WorkflowRequest};

/// Workflows API client.
pub struct WorkflowsApi {
    client: HookflowClient,
}

impl WorkflowsApi {
    pub(crate) fn new(client: HookflowClient) -> Self {
        Self { client }
    }

    /// List all workflows.
    pub async fn list(&self) -> Result<Vec<Workflow>> {
        let listing: Listing<Workflow> = self.client.get("workflows").await?;
        Ok(listing.into_items())
    }

    /// Get a workflow by ID.
    pub async fn get(&self, id: RecordId) -> Result<Workflow> {
        self.client.get(&format!("workflows/{}", id)).await
    }

    /// Create a new workflow.
    pub async fn create(&self, request: &WorkflowRequest) -> Result<Workflow> {
        self.client.post("workflows", request).await
    }

    /// Replace a workflow.
    pub async fn update(&self, id: RecordId, request: &WorkflowRequest) -> Result<Workflow> {
        self.client.put(&format!("workflows/{}", id), request).await
    }

    /// Delete a workflow.
    pub async fn delete(&self, id: RecordId) -> Result<()> {
        self.client.delete(&format!("workflows/{}", id)).await
    }

    /// Start a new execution of a workflow at step 1.
    pub async fn create_execution(&self, id: RecordId) -> Result<WorkflowExecution> {
        self.client
            .post_empty(&format!("workflows/{}/create_execution", id))
            .await
    }
}
