//! Workflow executions and their rule outcomes.

use crate::client::HookflowClient;
use crate::error::Result;
use crate::types::{
    Listing, RecordId, RuleExecution, StepOneData, StepResponse, StepTwoData, WorkflowExecution,
};

/// Query parameters for listing rule executions.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct ListRuleExecutionsQuery {
    /// Only outcomes recorded for this workflow execution.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_execution_id: Option<RecordId>,
}

/// Workflow executions API client.
///
/// An execution starts at step 1 (`WorkflowsApi::create_execution`). Rules
/// with `trigger_step` 1 run on `proceed_to_step2`; rules with
/// `trigger_step` 2 run on `complete_workflow`. A failing rule rejects the
/// transition with `rule_errors`.
pub struct WorkflowExecutionsApi {
    client: HookflowClient,
}

impl WorkflowExecutionsApi {
    pub(crate) fn new(client: HookflowClient) -> Self {
        Self { client }
    }

    /// List executions, newest first.
    pub async fn list(&self) -> Result<Vec<WorkflowExecution>> {
        let listing: Listing<WorkflowExecution> = self.client.get("workflow-executions").await?;
        Ok(listing.into_items())
    }

    /// Get an execution by ID.
    pub async fn get(&self, id: RecordId) -> Result<WorkflowExecution> {
        self.client.get(&format!("workflow-executions/{}", id)).await
    }

    /// Save step 1 fields without running rules.
    pub async fn update_step1(&self, id: RecordId, data: &StepOneData) -> Result<StepResponse> {
        self.client
            .post(&format!("workflow-executions/{}/update_step1", id), data)
            .await
    }

    /// Save any given step 1 fields, run the step 1 rules and move to step 2.
    pub async fn proceed_to_step2(&self, id: RecordId, data: &StepOneData) -> Result<StepResponse> {
        self.client
            .post(&format!("workflow-executions/{}/proceed_to_step2", id), data)
            .await
    }

    /// Replace the step 2 documents without running rules.
    pub async fn update_step2(&self, id: RecordId, data: &StepTwoData) -> Result<StepResponse> {
        self.client
            .post(&format!("workflow-executions/{}/update_step2", id), data)
            .await
    }

    /// Save any given documents, run the step 2 rules and complete.
    pub async fn complete_workflow(&self, id: RecordId, data: &StepTwoData) -> Result<StepResponse> {
        self.client
            .post(&format!("workflow-executions/{}/complete_workflow", id), data)
            .await
    }
}

/// Rule executions API client (read only).
pub struct RuleExecutionsApi {
    client: HookflowClient,
}

impl RuleExecutionsApi {
    pub(crate) fn new(client: HookflowClient) -> Self {
        Self { client }
    }

    /// List rule outcomes matching the query.
    pub async fn list(&self, query: &ListRuleExecutionsQuery) -> Result<Vec<RuleExecution>> {
        let listing: Listing<RuleExecution> =
            self.client.get_with_query("rule-executions", query).await?;
        Ok(listing.into_items())
    }
}
