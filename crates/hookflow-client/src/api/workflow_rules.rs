//! Workflow rules API.

use serde_json::Value;

use crate::client::HookflowClient;
use crate::error::Result;
use crate::types::{Listing, RecordId, WorkflowRule, WorkflowRuleRequest};

/// Query parameters for listing workflow rules.
#[derive(Debug, Default, serde::Serialize)]
pub struct ListWorkflowRulesQuery {
    /// Only rules belonging to this workflow.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<RecordId>,
}

/// Workflow rules API client.
pub struct WorkflowRulesApi {
    client: HookflowClient,
}

impl WorkflowRulesApi {
    pub(crate) fn new(client: HookflowClient) -> Self {
        Self { client }
    }

    /// List all rules.
    pub async fn list(&self) -> Result<Vec<WorkflowRule>> {
        self.list_with_query(ListWorkflowRulesQuery::default()).await
    }

    /// List rules with query parameters.
    pub async fn list_with_query(&self, query: ListWorkflowRulesQuery) -> Result<Vec<WorkflowRule>> {
        let listing: Listing<WorkflowRule> =
            self.client.get_with_query("workflow-rules", &query).await?;
        Ok(listing.into_items())
    }

    /// List the rules of one workflow.
    pub async fn list_for_workflow(&self, workflow_id: RecordId) -> Result<Vec<WorkflowRule>> {
        self.list_with_query(ListWorkflowRulesQuery {
            workflow_id: Some(workflow_id),
        })
        .await
    }

    /// Get a rule by ID.
    pub async fn get(&self, id: RecordId) -> Result<WorkflowRule> {
        self.client.get(&format!("workflow-rules/{}", id)).await
    }

    /// Create a new rule.
    pub async fn create(&self, request: &WorkflowRuleRequest) -> Result<WorkflowRule> {
        self.client.post("workflow-rules", request).await
    }

    /// Replace a rule.
    pub async fn update(&self, id: RecordId, request: &WorkflowRuleRequest) -> Result<WorkflowRule> {
        self.client
            .put(&format!("workflow-rules/{}", id), request)
            .await
    }

    /// Delete a rule.
    pub async fn delete(&self, id: RecordId) -> Result<()> {
        self.client.delete(&format!("workflow-rules/{}", id)).await
    }

    /// Evaluate a rule against a sample context without saving anything.
    pub async fn test_rule(&self, id: RecordId, context: &Value) -> Result<Value> {
        let body = serde_json::json!({ "context": context });
        self.client
            .post(&format!("workflow-rules/{}/test_rule", id), &body)
            .await
    }
}
