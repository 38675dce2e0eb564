//! Async executions API.

use crate::client::HookflowClient;
use crate::error::Result;
use crate::types::{AsyncExecution, AsyncExecutionStats, ExecutionStatus, Listing, RecordId};

/// Query parameters for listing async executions.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct ListAsyncExecutionsQuery {
    /// Only executions started by this workflow execution.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_execution_id: Option<RecordId>,
    /// Filter by status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ExecutionStatus>,
    /// Filter by the action that was called.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_id: Option<RecordId>,
}

/// Scope for the stats endpoint.
#[derive(Debug, Default, serde::Serialize)]
struct StatsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    workflow_execution_id: Option<RecordId>,
}

/// Async executions API client.
pub struct AsyncExecutionsApi {
    client: HookflowClient,
}

impl AsyncExecutionsApi {
    pub(crate) fn new(client: HookflowClient) -> Self {
        Self { client }
    }

    /// List executions matching the query.
    pub async fn list(&self, query: &ListAsyncExecutionsQuery) -> Result<Vec<AsyncExecution>> {
        let listing: Listing<AsyncExecution> = self
            .client
            .get_with_query("async-executions", query)
            .await?;
        Ok(listing.into_items())
    }

    /// Aggregate counters, optionally scoped to one workflow execution.
    pub async fn stats(&self, workflow_execution_id: Option<RecordId>) -> Result<AsyncExecutionStats> {
        let query = StatsQuery {
            workflow_execution_id,
        };
        self.client
            .get_with_query("async-executions/stats", &query)
            .await
    }

    /// Full status record of one execution, including response blobs.
    pub async fn status(&self, id: RecordId) -> Result<AsyncExecution> {
        self.client
            .get(&format!("async-executions/{}/status", id))
            .await
    }
}
