//! Request and response types for the hookflow API.
//!
//! These types mirror the server's API contract. Fields the console never
//! interprets (payload samples, node outputs) stay as raw JSON.

use std::collections::BTreeMap;

use indexmap::IndexMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Record identifier used by every resource.
pub type RecordId = i64;

// ─────────────────────────────────────────────────────────────────────────────
// Shared
// ─────────────────────────────────────────────────────────────────────────────

/// A list response.
///
/// Paginated endpoints wrap items in `{"results": [...]}`; others return a
/// bare array.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    /// Paginated envelope.
    Page {
        results: Vec<T>,
        #[serde(default)]
        count: Option<usize>,
    },
    /// Bare array.
    Items(Vec<T>),
}

impl<T> Listing<T> {
    /// Take the items regardless of shape.
    pub fn into_items(self) -> Vec<T> {
        match self {
            Listing::Page { results, .. } => results,
            Listing::Items(items) => items,
        }
    }
}

/// Activation state of events and sequences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceStatus {
    #[default]
    Active,
    Inactive,
}

impl ResourceStatus {
    /// The opposite state, as `toggle-status` produces it.
    pub fn toggled(self) -> Self {
        match self {
            ResourceStatus::Active => ResourceStatus::Inactive,
            ResourceStatus::Inactive => ResourceStatus::Active,
        }
    }

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            ResourceStatus::Active => "Active",
            ResourceStatus::Inactive => "Inactive",
        }
    }
}

/// Lifecycle state of a server-side execution.
///
/// Status strings the client does not know decode to [`ExecutionStatus::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Pending,
    Initiated,
    Polling,
    Running,
    Completed,
    Failed,
    Timeout,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl ExecutionStatus {
    /// Every known status, in lifecycle order.
    pub const ALL: [ExecutionStatus; 8] = [
        ExecutionStatus::Pending,
        ExecutionStatus::Initiated,
        ExecutionStatus::Polling,
        ExecutionStatus::Running,
        ExecutionStatus::Completed,
        ExecutionStatus::Failed,
        ExecutionStatus::Timeout,
        ExecutionStatus::Cancelled,
    ];

    /// No further transition is expected from a terminal state.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ExecutionStatus::Completed
                | ExecutionStatus::Failed
                | ExecutionStatus::Timeout
                | ExecutionStatus::Cancelled
        )
    }

    /// The server is still working on it.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            ExecutionStatus::Pending
                | ExecutionStatus::Initiated
                | ExecutionStatus::Polling
                | ExecutionStatus::Running
        )
    }

    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            ExecutionStatus::Pending => "pending",
            ExecutionStatus::Initiated => "initiated",
            ExecutionStatus::Polling => "polling",
            ExecutionStatus::Running => "running",
            ExecutionStatus::Completed => "completed",
            ExecutionStatus::Failed => "failed",
            ExecutionStatus::Timeout => "timeout",
            ExecutionStatus::Cancelled => "cancelled",
            ExecutionStatus::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ExecutionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExecutionStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown execution status '{}'", s))
    }
}

/// Envelope returned by action endpoints such as `import` and `execute`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuccessEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Anything else the endpoint returned.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Events
// ─────────────────────────────────────────────────────────────────────────────

/// An inbound webhook event definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// `custom` or `system`.
    #[serde(default = "default_event_type")]
    pub event_type: String,
    #[serde(default)]
    pub event_format: Value,
    #[serde(default)]
    pub parameters: Value,
    #[serde(default)]
    pub acknowledgement_enabled: bool,
    #[serde(default = "default_ack_type")]
    pub acknowledgement_type: String,
    #[serde(default = "default_ack_status")]
    pub acknowledgement_status_code: u16,
    #[serde(default)]
    pub acknowledgement_payload: Value,
    #[serde(default)]
    pub status: ResourceStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_event_type() -> String {
    "custom".to_string()
}

fn default_ack_type() -> String {
    "basic".to_string()
}

fn default_ack_status() -> u16 {
    200
}

/// Body for creating or updating an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRequest {
    pub name: String,
    pub description: String,
    pub event_type: String,
    pub event_format: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
    pub acknowledgement_enabled: bool,
    pub acknowledgement_type: String,
    pub acknowledgement_status_code: u16,
    pub acknowledgement_payload: Value,
    pub status: ResourceStatus,
}

impl EventRequest {
    /// Request that recreates `event` under a `(Copy)` name.
    pub fn duplicate_of(event: &Event) -> Self {
        Self {
            name: format!("{} (Copy)", event.name),
            description: event.description.clone(),
            event_type: "custom".to_string(),
            event_format: event.event_format.clone(),
            parameters: Some(event.parameters.clone()),
            acknowledgement_enabled: event.acknowledgement_enabled,
            acknowledgement_type: event.acknowledgement_type.clone(),
            acknowledgement_status_code: event.acknowledgement_status_code,
            acknowledgement_payload: event.acknowledgement_payload.clone(),
            status: event.status,
        }
    }
}

/// Response of `events/{id}/test-endpoint/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestEndpoint {
    pub test_endpoint: String,
}

/// Response of `events/{id}/sample-payload/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplePayload {
    #[serde(default)]
    pub sample_payload: Value,
}

/// Most recent payload delivered to an event's test endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestPayload {
    pub timestamp: DateTime<Utc>,
    pub method: String,
    #[serde(default)]
    pub headers: IndexMap<String, String>,
    #[serde(default)]
    pub payload: Value,
}

// ─────────────────────────────────────────────────────────────────────────────
// Sequences
// ─────────────────────────────────────────────────────────────────────────────

/// A sequence of nodes triggered by one or more events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sequence {
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub sequence_type: Option<String>,
    #[serde(default)]
    pub status: ResourceStatus,
    #[serde(default)]
    pub trigger_type: Option<String>,
    #[serde(default)]
    pub trigger_events: Vec<RecordId>,
    #[serde(default)]
    pub trigger_event_version: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body for creating or updating a sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceRequest {
    pub name: String,
    pub description: String,
    pub sequence_type: String,
    pub status: ResourceStatus,
    pub trigger_type: String,
    pub trigger_events: Vec<RecordId>,
    pub trigger_event_version: String,
}

/// Response of `sequences/{id}/test-info/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SequenceTestInfo {
    #[serde(default)]
    pub trigger_events: Vec<TriggerEndpoint>,
}

/// A test endpoint that triggers a sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerEndpoint {
    pub event_id: RecordId,
    pub event_name: String,
    pub test_endpoint: String,
}

/// Latest test execution of a sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceExecution {
    pub execution_id: String,
    pub status: ExecutionStatus,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub trigger_event: Option<String>,
    #[serde(default)]
    pub trigger_payload: Value,
    #[serde(default)]
    pub final_output: Value,
    #[serde(default)]
    pub execution_logs: Vec<ExecutionLog>,
}

/// One node's log line within a sequence execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionLog {
    pub id: RecordId,
    #[serde(default)]
    pub node_name: String,
    #[serde(default)]
    pub node_type: String,
    pub status: ExecutionStatus,
    /// `success`, `error`, `warning` or `info`.
    #[serde(default)]
    pub log_level: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub output_data: Value,
}

/// Response of `sequences/{id}/execute/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecuteResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub execution_id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Workflows
// ─────────────────────────────────────────────────────────────────────────────

/// A multi-step workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// Body for creating or updating a workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowRequest {
    pub name: String,
    pub description: String,
    pub is_active: bool,
}

/// A DSL rule evaluated at a workflow step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowRule {
    pub id: RecordId,
    pub workflow: RecordId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub rule_definition: String,
    #[serde(default = "default_one")]
    pub trigger_step: u32,
    #[serde(default = "default_one")]
    pub execution_order: u32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_one() -> u32 {
    1
}

/// Body for creating or updating a workflow rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowRuleRequest {
    pub workflow: RecordId,
    pub name: String,
    pub description: String,
    pub rule_definition: String,
    pub trigger_step: u32,
    pub execution_order: u32,
    pub is_active: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Workflow executions
// ─────────────────────────────────────────────────────────────────────────────

/// Progress of a two-step workflow execution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowExecutionStatus {
    #[default]
    InProgress,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

impl WorkflowExecutionStatus {
    pub fn label(self) -> &'static str {
        match self {
            WorkflowExecutionStatus::InProgress => "In Progress",
            WorkflowExecutionStatus::Completed => "Completed",
            WorkflowExecutionStatus::Failed => "Failed",
            WorkflowExecutionStatus::Unknown => "Unknown",
        }
    }
}

/// One run of a workflow through its two data-entry steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowExecution {
    pub id: RecordId,
    pub workflow: RecordId,
    #[serde(default)]
    pub workflow_name: Option<String>,
    #[serde(default)]
    pub status: WorkflowExecutionStatus,
    #[serde(default = "default_one")]
    pub current_step: u32,
    #[serde(default)]
    pub irn: String,
    #[serde(default)]
    pub customer_id: String,
    #[serde(default)]
    pub stamp_group: String,
    /// Decimal amount; the server sends it as a string.
    #[serde(default)]
    pub stamp_amount: Option<String>,
    /// Step 2 documents.
    #[serde(default)]
    pub step2_data: Vec<Value>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub error_message: String,
}

/// Step 1 fields. Unset fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepOneData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub irn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stamp_group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stamp_amount: Option<String>,
}

impl StepOneData {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// A document row entered at step 2.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepTwoDocument {
    #[serde(default)]
    pub document_status: String,
    #[serde(default)]
    pub document_name: String,
    #[serde(default)]
    pub document_id: String,
    #[serde(default)]
    pub invitee_name: String,
    #[serde(default)]
    pub invitee_email: String,
}

/// Step 2 body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepTwoData {
    pub documents: Vec<StepTwoDocument>,
}

/// Result of a step update or transition.
///
/// Rule failures come back as an error response with `rule_errors`, not as
/// `success: false` here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub execution: Option<WorkflowExecution>,
    #[serde(default)]
    pub rule_results: Vec<Value>,
    #[serde(default)]
    pub updated_documents: Vec<Value>,
}

/// Outcome of evaluating one rule during a workflow execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleExecution {
    pub id: RecordId,
    pub workflow_execution: RecordId,
    pub workflow_rule: RecordId,
    #[serde(default)]
    pub rule_name: Option<String>,
    /// `success`, `error` or `warning`.
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub execution_result: Value,
    #[serde(default)]
    pub error_message: String,
    #[serde(default)]
    pub execution_time_ms: Option<u64>,
    #[serde(default)]
    pub context_data: Value,
    #[serde(default)]
    pub executed_at: Option<DateTime<Utc>>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Actions
// ─────────────────────────────────────────────────────────────────────────────

/// An outbound HTTP call owned by a connector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    pub id: RecordId,
    pub connector: RecordId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub http_method: String,
    #[serde(default)]
    pub endpoint_path: String,
    #[serde(default)]
    pub query_params: IndexMap<String, String>,
    #[serde(default)]
    pub headers: IndexMap<String, String>,
    #[serde(default)]
    pub request_body: Value,
}

/// Body for creating or updating an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub connector: RecordId,
    pub name: String,
    pub description: String,
    pub http_method: String,
    pub endpoint_path: String,
    pub query_params: IndexMap<String, String>,
    pub headers: IndexMap<String, String>,
    pub request_body: Value,
}

// ─────────────────────────────────────────────────────────────────────────────
// Async executions
// ─────────────────────────────────────────────────────────────────────────────

/// An action call the server is following up on asynchronously.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AsyncExecution {
    pub id: RecordId,
    pub execution_id: String,
    #[serde(default)]
    pub action_id: Option<RecordId>,
    #[serde(default)]
    pub async_type: Option<String>,
    pub status: ExecutionStatus,
    #[serde(default)]
    pub polling_attempts: u32,
    #[serde(default)]
    pub initial_called_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub initial_response: Value,
    #[serde(default)]
    pub last_polling_response: Value,
    #[serde(default)]
    pub final_response: Value,
}

/// Aggregate counters from `async-executions/stats/`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AsyncExecutionStats {
    #[serde(default)]
    pub total_executions: u64,
    #[serde(default)]
    pub completed: u64,
    #[serde(default)]
    pub failed: u64,
    #[serde(default)]
    pub polling: u64,
    #[serde(default)]
    pub timeout: u64,
    /// Percentage of executions that completed successfully.
    #[serde(default)]
    pub success_rate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_accepts_both_shapes() {
        let page: Listing<RecordId> = serde_json::from_str(r#"{"results": [1, 2], "count": 2}"#).unwrap();
        assert_eq!(page.into_items(), vec![1, 2]);

        let bare: Listing<RecordId> = serde_json::from_str("[3]").unwrap();
        assert_eq!(bare.into_items(), vec![3]);
    }

    #[test]
    fn test_execution_status_unknown_string() {
        let status: ExecutionStatus = serde_json::from_str(r#""exploded""#).unwrap();
        assert_eq!(status, ExecutionStatus::Unknown);
        assert!(!status.is_terminal());
        assert!(!status.is_active());
    }

    #[test]
    fn test_terminal_and_active_are_disjoint() {
        for status in ExecutionStatus::ALL {
            assert!(!(status.is_terminal() && status.is_active()), "{}", status);
            assert!(status.is_terminal() || status.is_active(), "{}", status);
        }
    }

    #[test]
    fn test_execution_status_from_str() {
        assert_eq!("timeout".parse::<ExecutionStatus>(), Ok(ExecutionStatus::Timeout));
        assert!("bogus".parse::<ExecutionStatus>().is_err());
    }

    #[test]
    fn test_resource_status_toggle() {
        assert_eq!(ResourceStatus::Active.toggled(), ResourceStatus::Inactive);
        assert_eq!(ResourceStatus::Inactive.toggled().label(), "Active");
    }

    #[test]
    fn test_test_payload_decodes() {
        let payload: TestPayload = serde_json::from_value(serde_json::json!({
            "timestamp": "2026-01-05T10:00:00Z",
            "method": "POST",
            "payload": {"a": 1}
        }))
        .unwrap();
        assert!(payload.headers.is_empty());
        assert_eq!(payload.payload["a"], 1);
    }

    #[test]
    fn test_workflow_execution_decodes() {
        let execution: WorkflowExecution = serde_json::from_value(serde_json::json!({
            "id": 11,
            "workflow": 2,
            "workflow_name": "Loan Application Processing",
            "status": "in_progress",
            "current_step": 2,
            "stamp_amount": "1000.00",
            "step2_data": [{"document_id": "DOC123"}]
        }))
        .unwrap();
        assert_eq!(execution.status, WorkflowExecutionStatus::InProgress);
        assert_eq!(execution.current_step, 2);
        assert_eq!(execution.stamp_amount.as_deref(), Some("1000.00"));

        let odd: WorkflowExecutionStatus = serde_json::from_str(r#""paused""#).unwrap();
        assert_eq!(odd, WorkflowExecutionStatus::Unknown);
    }

    #[test]
    fn test_step_one_skips_unset_fields() {
        let data = StepOneData {
            customer_id: Some("CUST123".into()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&data).unwrap(),
            serde_json::json!({"customer_id": "CUST123"})
        );
        assert!(StepOneData::default().is_empty());
    }

    #[test]
    fn test_duplicate_event_request() {
        let event: Event = serde_json::from_value(serde_json::json!({
            "id": 42,
            "name": "Order Created",
            "event_type": "system",
            "status": "inactive"
        }))
        .unwrap();

        let request = EventRequest::duplicate_of(&event);
        assert_eq!(request.name, "Order Created (Copy)");
        assert_eq!(request.event_type, "custom");
        assert_eq!(request.status, ResourceStatus::Inactive);
        assert_eq!(request.acknowledgement_status_code, 200);
    }

    #[test]
    fn test_success_envelope_keeps_extra_fields() {
        let env: SuccessEnvelope =
            serde_json::from_str(r#"{"success": true, "event_id": 9}"#).unwrap();
        assert!(env.success);
        assert_eq!(env.extra["event_id"], 9);
    }
}
