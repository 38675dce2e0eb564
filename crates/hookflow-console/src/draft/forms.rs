//! Drafts for each editable resource.

use serde_json::{Value, json};

use hookflow_client::{
    Action, ActionRequest, Event, EventRequest, RecordId, ResourceStatus, Sequence,
    SequenceRequest, Workflow, WorkflowRequest, WorkflowRule, WorkflowRuleRequest,
};

use super::Draft;
use super::error::DraftError;
use super::json_field::JsonField;
use super::key_value::KeyValueEditor;

fn require(field: &'static str, value: &str, message: &str) -> Result<String, DraftError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(DraftError::required(field, message))
    } else {
        Ok(trimmed.to_string())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Actions
// ─────────────────────────────────────────────────────────────────────────────

/// Draft of an outbound action.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionDraft {
    pub connector: RecordId,
    pub name: String,
    pub description: String,
    pub http_method: String,
    pub endpoint_path: String,
    pub query_params: KeyValueEditor,
    pub headers: KeyValueEditor,
    pub request_body: JsonField,
}

impl ActionDraft {
    /// Blank draft for a new action under `connector`.
    pub fn new(connector: RecordId) -> Self {
        Self {
            connector,
            name: String::new(),
            description: String::new(),
            http_method: "GET".to_string(),
            endpoint_path: String::new(),
            query_params: KeyValueEditor::new(),
            headers: KeyValueEditor::new(),
            request_body: request_body_field(&json!({})),
        }
    }

    /// Draft pre-filled from an existing action.
    pub fn from_action(action: &Action) -> Self {
        let body = if action.request_body.is_null() {
            json!({})
        } else {
            action.request_body.clone()
        };
        Self {
            connector: action.connector,
            name: action.name.clone(),
            description: action.description.clone(),
            http_method: action.http_method.clone(),
            endpoint_path: action.endpoint_path.clone(),
            query_params: KeyValueEditor::from_map(&action.query_params),
            headers: KeyValueEditor::from_map(&action.headers),
            request_body: request_body_field(&body),
        }
    }
}

fn request_body_field(initial: &Value) -> JsonField {
    JsonField::new("request_body", "Request Body", initial)
}

impl Draft for ActionDraft {
    type Request = ActionRequest;

    fn validate(&self) -> Result<ActionRequest, DraftError> {
        let request_body = self.request_body.parse()?;
        let name = require("name", &self.name, "Action name is required")?;

        Ok(ActionRequest {
            connector: self.connector,
            name,
            description: self.description.clone(),
            http_method: self.http_method.trim().to_uppercase(),
            endpoint_path: self.endpoint_path.clone(),
            query_params: self.query_params.to_map(),
            headers: self.headers.to_map(),
            request_body,
        })
    }

    fn failure_fallback(&self) -> &'static str {
        "Failed to save action"
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Events
// ─────────────────────────────────────────────────────────────────────────────

/// Shape offered to new events.
pub fn default_event_format() -> Value {
    json!({
        "cpId": "{{CP ID}}",
        "consentProfileId": "{{Consent profile ID}}",
        "purposes": ["purpose_001", "purpose_002", "purpose_003"],
        "customParameter": "{{Custom parameter}}"
    })
}

/// Acknowledgement body offered to new events.
pub fn sample_acknowledgement_payload() -> Value {
    json!({
        "status": "success",
        "message": "Event received successfully",
        "timestamp": "2024-01-01T00:00:00Z"
    })
}

/// Draft of an inbound event definition.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    pub name: String,
    pub description: String,
    pub event_type: String,
    pub event_format: JsonField,
    pub acknowledgement_enabled: bool,
    pub acknowledgement_type: String,
    pub acknowledgement_status_code: u16,
    pub acknowledgement_payload: JsonField,
    pub status: ResourceStatus,
}

impl Default for EventDraft {
    fn default() -> Self {
        Self::new()
    }
}

impl EventDraft {
    pub fn new() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            event_type: "custom".to_string(),
            event_format: event_format_field(&default_event_format()),
            acknowledgement_enabled: false,
            acknowledgement_type: "basic".to_string(),
            acknowledgement_status_code: 200,
            acknowledgement_payload: ack_payload_field(&sample_acknowledgement_payload()),
            status: ResourceStatus::Active,
        }
    }

    pub fn from_event(event: &Event) -> Self {
        let format = if event.event_format.is_null() {
            default_event_format()
        } else {
            event.event_format.clone()
        };
        let ack = if event.acknowledgement_payload.is_null() {
            sample_acknowledgement_payload()
        } else {
            event.acknowledgement_payload.clone()
        };
        Self {
            name: event.name.clone(),
            description: event.description.clone(),
            event_type: event.event_type.clone(),
            event_format: event_format_field(&format),
            acknowledgement_enabled: event.acknowledgement_enabled,
            acknowledgement_type: event.acknowledgement_type.clone(),
            acknowledgement_status_code: event.acknowledgement_status_code,
            acknowledgement_payload: ack_payload_field(&ack),
            status: event.status,
        }
    }

    fn custom_acknowledgement(&self) -> bool {
        self.acknowledgement_enabled && self.acknowledgement_type == "custom"
    }
}

fn event_format_field(initial: &Value) -> JsonField {
    JsonField::new("event_format", "Event Format", initial)
        .blank_as_empty_object()
        .with_invalid_message("Invalid JSON format in Event Format field")
}

fn ack_payload_field(initial: &Value) -> JsonField {
    JsonField::new("acknowledgement_payload", "Acknowledgement Payload", initial)
        .blank_as_empty_object()
        .with_invalid_message("Invalid JSON format in Acknowledgement Payload field")
}

impl Draft for EventDraft {
    type Request = EventRequest;

    fn validate(&self) -> Result<EventRequest, DraftError> {
        let name = require("name", &self.name, "Event name is required")?;
        let event_format = self.event_format.parse()?;

        // The payload only matters when a custom acknowledgement is sent.
        let acknowledgement_payload = if self.custom_acknowledgement() {
            self.acknowledgement_payload.parse()?
        } else {
            self.acknowledgement_payload.value().clone()
        };

        Ok(EventRequest {
            name,
            description: self.description.clone(),
            event_type: self.event_type.clone(),
            event_format,
            parameters: None,
            acknowledgement_enabled: self.acknowledgement_enabled,
            acknowledgement_type: self.acknowledgement_type.clone(),
            acknowledgement_status_code: self.acknowledgement_status_code,
            acknowledgement_payload,
            status: self.status,
        })
    }

    fn failure_fallback(&self) -> &'static str {
        "Failed to save event"
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sequences
// ─────────────────────────────────────────────────────────────────────────────

/// Draft of a sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceDraft {
    pub name: String,
    pub description: String,
    pub sequence_type: String,
    pub status: ResourceStatus,
    pub trigger_type: String,
    pub trigger_events: Vec<RecordId>,
    pub trigger_event_version: String,
}

impl Default for SequenceDraft {
    fn default() -> Self {
        Self::new()
    }
}

impl SequenceDraft {
    pub fn new() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            sequence_type: "custom".to_string(),
            status: ResourceStatus::Active,
            trigger_type: "event".to_string(),
            trigger_events: Vec::new(),
            trigger_event_version: "latest".to_string(),
        }
    }

    pub fn from_sequence(sequence: &Sequence) -> Self {
        Self {
            name: sequence.name.clone(),
            description: sequence.description.clone(),
            sequence_type: sequence.sequence_type.clone().unwrap_or_else(|| "custom".into()),
            status: sequence.status,
            trigger_type: sequence.trigger_type.clone().unwrap_or_else(|| "event".into()),
            trigger_events: sequence.trigger_events.clone(),
            trigger_event_version: sequence
                .trigger_event_version
                .clone()
                .unwrap_or_else(|| "latest".into()),
        }
    }

    /// Select or deselect a trigger event.
    pub fn toggle_trigger_event(&mut self, event: RecordId) {
        if let Some(pos) = self.trigger_events.iter().position(|id| *id == event) {
            self.trigger_events.remove(pos);
        } else {
            self.trigger_events.push(event);
        }
    }
}

impl Draft for SequenceDraft {
    type Request = SequenceRequest;

    fn validate(&self) -> Result<SequenceRequest, DraftError> {
        let name = require("name", &self.name, "Sequence name is required")?;
        if self.trigger_type == "event" && self.trigger_events.is_empty() {
            return Err(DraftError::required(
                "trigger_events",
                "Please select at least one trigger event",
            ));
        }

        Ok(SequenceRequest {
            name,
            description: self.description.clone(),
            sequence_type: self.sequence_type.clone(),
            status: self.status,
            trigger_type: self.trigger_type.clone(),
            trigger_events: self.trigger_events.clone(),
            trigger_event_version: self.trigger_event_version.clone(),
        })
    }

    fn failure_fallback(&self) -> &'static str {
        "Failed to save sequence"
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Workflows
// ─────────────────────────────────────────────────────────────────────────────

/// Draft of a workflow.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowDraft {
    pub name: String,
    pub description: String,
    pub is_active: bool,
}

impl Default for WorkflowDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            is_active: true,
        }
    }
}

impl WorkflowDraft {
    pub fn from_workflow(workflow: &Workflow) -> Self {
        Self {
            name: workflow.name.clone(),
            description: workflow.description.clone(),
            is_active: workflow.is_active,
        }
    }
}

impl Draft for WorkflowDraft {
    type Request = WorkflowRequest;

    fn validate(&self) -> Result<WorkflowRequest, DraftError> {
        Ok(WorkflowRequest {
            name: require("name", &self.name, "Workflow name is required")?,
            description: self.description.clone(),
            is_active: self.is_active,
        })
    }

    fn failure_fallback(&self) -> &'static str {
        "Failed to save workflow"
    }
}

/// Draft of a workflow rule.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowRuleDraft {
    pub workflow: RecordId,
    pub name: String,
    pub description: String,
    pub rule_definition: String,
    pub trigger_step: u32,
    pub execution_order: u32,
    pub is_active: bool,
}

impl WorkflowRuleDraft {
    pub fn new(workflow: RecordId) -> Self {
        Self {
            workflow,
            name: String::new(),
            description: String::new(),
            rule_definition: String::new(),
            trigger_step: 1,
            execution_order: 1,
            is_active: true,
        }
    }

    pub fn from_rule(rule: &WorkflowRule) -> Self {
        Self {
            workflow: rule.workflow,
            name: rule.name.clone(),
            description: rule.description.clone(),
            rule_definition: rule.rule_definition.clone(),
            trigger_step: rule.trigger_step,
            execution_order: rule.execution_order,
            is_active: rule.is_active,
        }
    }
}

impl Draft for WorkflowRuleDraft {
    type Request = WorkflowRuleRequest;

    fn validate(&self) -> Result<WorkflowRuleRequest, DraftError> {
        let name = require("name", &self.name, "Rule name is required")?;
        if self.rule_definition.trim().is_empty() {
            return Err(DraftError::required(
                "rule_definition",
                "Rule definition is required",
            ));
        }
        if self.trigger_step == 0 {
            return Err(DraftError::invalid(
                "trigger_step",
                "Trigger step must be at least 1",
            ));
        }
        if self.execution_order == 0 {
            return Err(DraftError::invalid(
                "execution_order",
                "Execution order must be at least 1",
            ));
        }

        Ok(WorkflowRuleRequest {
            workflow: self.workflow,
            name,
            description: self.description.clone(),
            rule_definition: self.rule_definition.clone(),
            trigger_step: self.trigger_step,
            execution_order: self.execution_order,
            is_active: self.is_active,
        })
    }

    fn failure_fallback(&self) -> &'static str {
        "Failed to save rule"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::{SubmitError, submit};
    use std::sync::atomic::{AtomicUsize, Ordering};

    use hookflow_client::Error;

    #[tokio::test]
    async fn test_invalid_request_body_never_reaches_save() {
        let mut draft = ActionDraft::new(3);
        draft.name = "Create order".into();
        draft.http_method = "POST".into();
        draft.request_body.edit("{invalid");

        let calls = AtomicUsize::new(0);
        let result = submit(&draft, |_request| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(()) }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        let err = result.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Invalid JSON in Request Body");
    }

    #[tokio::test]
    async fn test_action_submit_collapses_rows() {
        let mut draft = ActionDraft::new(3);
        draft.name = " Create order ".into();
        draft.http_method = "post".into();
        draft.headers.push("X-Api-Key", "abc");
        draft.headers.add_row();
        draft.request_body.edit(r#"{"sku": "A-1"}"#);

        let request = submit(&draft, |request| async move { Ok(request) })
            .await
            .unwrap();

        assert_eq!(request.name, "Create order");
        assert_eq!(request.http_method, "POST");
        assert_eq!(request.headers.len(), 1);
        assert!(request.query_params.is_empty());
        assert_eq!(request.request_body, json!({"sku": "A-1"}));
    }

    #[tokio::test]
    async fn test_action_submit_sends_headers_in_row_order() {
        let mut draft = ActionDraft::new(3);
        draft.name = "Notify".into();
        draft.http_method = "POST".into();
        draft.headers.push("X-Trace", "on");
        draft.headers.push("Authorization", "Bearer x");

        let request = submit(&draft, |request| async move { Ok(request) })
            .await
            .unwrap();

        let body = serde_json::to_string(&request.headers).unwrap();
        assert_eq!(body, r#"{"X-Trace":"on","Authorization":"Bearer x"}"#);
    }

    #[tokio::test]
    async fn test_server_rejection_uses_detail_or_fallback() {
        let mut draft = WorkflowDraft::default();
        draft.name = "Loyalty".into();

        let err = submit(&draft, |_| async {
            Err::<(), _>(Error::Api {
                status: 400,
                error: None,
                detail: Some("Name must be unique".into()),
                rule_errors: Vec::new(),
            })
        })
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Name must be unique");

        let err = submit(&draft, |_| async {
            Err::<(), _>(Error::Api {
                status: 500,
                error: None,
                detail: None,
                rule_errors: Vec::new(),
            })
        })
        .await
        .unwrap_err();
        assert!(matches!(err, SubmitError::Rejected { .. }));
        assert_eq!(err.to_string(), "Failed to save workflow");
    }

    #[test]
    fn test_event_requires_name() {
        let draft = EventDraft::new();
        assert_eq!(draft.validate().unwrap_err().to_string(), "Event name is required");
    }

    #[test]
    fn test_event_blank_format_is_empty_object() {
        let mut draft = EventDraft::new();
        draft.name = "Order Created".into();
        draft.event_format.edit("  ");
        assert_eq!(draft.validate().unwrap().event_format, json!({}));
    }

    #[test]
    fn test_event_ack_payload_checked_only_for_custom_ack() {
        let mut draft = EventDraft::new();
        draft.name = "Order Created".into();
        draft.acknowledgement_payload.edit("{broken");

        // Basic acknowledgement: the broken text is ignored
        let request = draft.validate().unwrap();
        assert_eq!(request.acknowledgement_payload, sample_acknowledgement_payload());

        draft.acknowledgement_enabled = true;
        draft.acknowledgement_type = "custom".into();
        assert_eq!(
            draft.validate().unwrap_err().to_string(),
            "Invalid JSON format in Acknowledgement Payload field"
        );
    }

    #[test]
    fn test_event_defaults() {
        let draft = EventDraft::new();
        assert_eq!(draft.event_format.value()["cpId"], "{{CP ID}}");
        assert_eq!(draft.acknowledgement_status_code, 200);
        assert_eq!(draft.event_type, "custom");
    }

    #[test]
    fn test_sequence_needs_trigger_event() {
        let mut draft = SequenceDraft::new();
        draft.name = "Welcome".into();
        assert_eq!(
            draft.validate().unwrap_err().to_string(),
            "Please select at least one trigger event"
        );

        draft.toggle_trigger_event(4);
        assert_eq!(draft.validate().unwrap().trigger_events, vec![4]);

        draft.toggle_trigger_event(4);
        draft.trigger_type = "manual".into();
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn test_rule_checks() {
        let mut draft = WorkflowRuleDraft::new(1);
        assert_eq!(draft.validate().unwrap_err().to_string(), "Rule name is required");

        draft.name = "Stamp minimum".into();
        let err = draft.validate().unwrap_err();
        assert_eq!(err.field(), "rule_definition");

        draft.rule_definition = "amount >= 100".into();
        draft.trigger_step = 0;
        assert!(matches!(draft.validate(), Err(DraftError::Invalid { .. })));

        draft.trigger_step = 2;
        let request = draft.validate().unwrap();
        assert_eq!(request.trigger_step, 2);
        assert_eq!(request.execution_order, 1);
    }
}
