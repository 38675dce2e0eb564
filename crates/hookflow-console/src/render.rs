//! Text rendering shared by the status views.

use chrono::{DateTime, Local, Utc};
use serde_json::Value;

use hookflow_client::{AsyncExecution, MissingDependencies, SequenceExecution, TestPayload};

use crate::poller::Display;

/// Whole seconds between two instants, or `N/A` when either is missing.
pub fn format_duration(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> String {
    match (start, end) {
        (Some(start), Some(end)) => {
            let ms = (end - start).num_milliseconds() as f64;
            format!("{}s", (ms / 1000.0).round() as i64)
        }
        _ => "N/A".to_string(),
    }
}

/// Local wall-clock time.
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

fn format_optional_timestamp(timestamp: Option<DateTime<Utc>>) -> String {
    timestamp.map(format_timestamp).unwrap_or_else(|| "N/A".to_string())
}

pub fn pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// First eight characters followed by an ellipsis.
pub fn short_id(id: &str) -> String {
    let prefix: String = id.chars().take(8).collect();
    format!("{}...", prefix)
}

/// Whether a JSON blob is worth showing: not null and not an empty container.
pub fn has_content(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}

fn push_json(lines: &mut Vec<String>, heading: &str, value: &Value) {
    lines.push(heading.to_string());
    lines.extend(pretty_json(value).lines().map(|line| format!("  {}", line)));
}

// ─────────────────────────────────────────────────────────────────────────────
// Event test payloads
// ─────────────────────────────────────────────────────────────────────────────

pub const NO_PAYLOAD_YET: &str = "No payload received yet";

pub fn test_payload_lines(display: &Display<TestPayload>) -> Vec<String> {
    match display {
        Display::Loading => vec!["Waiting for payload...".to_string()],
        Display::NoData => vec![
            NO_PAYLOAD_YET.to_string(),
            "The payload will appear here automatically when the endpoint is called".to_string(),
        ],
        Display::Snapshot(payload) => {
            let mut lines = vec![
                format!("Received at: {}", format_timestamp(payload.timestamp)),
                format!("Method: {}", payload.method),
            ];
            push_json(&mut lines, "Payload:", &payload.payload);
            if !payload.headers.is_empty() {
                lines.push("Headers:".to_string());
                lines.extend(
                    payload
                        .headers
                        .iter()
                        .map(|(name, value)| format!("  {}: {}", name, value)),
                );
            }
            lines
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sequence executions
// ─────────────────────────────────────────────────────────────────────────────

pub const NO_EXECUTION_YET: &str = "No execution found yet";

pub fn sequence_execution_lines(display: &Display<SequenceExecution>) -> Vec<String> {
    let execution = match display {
        Display::Loading => return vec!["Waiting for event trigger...".to_string()],
        Display::NoData => {
            return vec![
                NO_EXECUTION_YET.to_string(),
                "Trigger one of the event endpoints above to start the sequence execution"
                    .to_string(),
            ];
        }
        Display::Snapshot(execution) => execution,
    };

    let mut lines = vec![
        format!("Execution: {}", execution.execution_id),
        format!("Status: {}", execution.status),
        format!("Started: {}", format_optional_timestamp(execution.started_at)),
    ];
    if let Some(completed) = execution.completed_at {
        lines.push(format!("Completed: {}", format_timestamp(completed)));
    }
    if let Some(ms) = execution.duration_ms {
        lines.push(format!("Duration: {}ms", ms));
    }
    if let Some(trigger) = &execution.trigger_event {
        lines.push(format!("Triggered by: {}", trigger));
    }
    if let Some(error) = &execution.error_message {
        lines.push(format!("Error: {}", error));
    }
    if has_content(&execution.trigger_payload) {
        push_json(&mut lines, "Trigger payload:", &execution.trigger_payload);
    }
    if !execution.execution_logs.is_empty() {
        lines.push("Logs:".to_string());
        for log in &execution.execution_logs {
            let mut line = format!("  [{}] {} ({}): {}", log.status, log.node_name, log.node_type, log.message);
            if let Some(ms) = log.duration_ms {
                line.push_str(&format!(" {}ms", ms));
            }
            lines.push(line);
        }
    }
    if has_content(&execution.final_output) {
        push_json(&mut lines, "Final output:", &execution.final_output);
    }
    lines
}

// ─────────────────────────────────────────────────────────────────────────────
// Async executions
// ─────────────────────────────────────────────────────────────────────────────

pub fn async_execution_row(execution: &AsyncExecution) -> [String; 6] {
    [
        short_id(&execution.execution_id),
        execution.async_type.clone().unwrap_or_else(|| "N/A".to_string()),
        execution.status.to_string(),
        execution.polling_attempts.to_string(),
        format_duration(execution.initial_called_at, execution.completed_at),
        format_optional_timestamp(execution.created_at),
    ]
}

pub fn async_execution_detail_lines(execution: &AsyncExecution) -> Vec<String> {
    let mut lines = vec![
        format!("Execution: {}", execution.execution_id),
        format!("Status: {}", execution.status),
        format!(
            "Type: {}",
            execution.async_type.as_deref().unwrap_or("N/A")
        ),
        format!("Polling attempts: {}", execution.polling_attempts),
        format!(
            "Initial call: {}",
            format_optional_timestamp(execution.initial_called_at)
        ),
        format!(
            "Completed: {}",
            format_optional_timestamp(execution.completed_at)
        ),
        format!(
            "Duration: {}",
            format_duration(execution.initial_called_at, execution.completed_at)
        ),
    ];
    if let Some(error) = &execution.error_message {
        lines.push(format!("Error: {}", error));
    }
    for (heading, value) in [
        ("Initial response:", &execution.initial_response),
        ("Last polling response:", &execution.last_polling_response),
        ("Final response:", &execution.final_response),
    ] {
        if has_content(value) {
            push_json(&mut lines, heading, value);
        }
    }
    lines
}

// ─────────────────────────────────────────────────────────────────────────────
// Import dependencies
// ─────────────────────────────────────────────────────────────────────────────

/// Sections for the missing-dependency report; empty sections are omitted.
pub fn missing_dependency_sections(deps: &MissingDependencies) -> Vec<(&'static str, Vec<String>)> {
    let lists = [
        ("Missing events", "Event", &deps.lists.events),
        ("Missing connectors", "Connector", &deps.lists.connectors),
        ("Missing actions", "Action", &deps.lists.actions),
    ];

    lists
        .into_iter()
        .filter(|(_, _, records)| !records.is_empty())
        .map(|(heading, kind, records)| {
            let entries = records
                .iter()
                .map(|record| {
                    let mut entry = record.label(kind);
                    let mut notes = Vec::new();
                    if let Some(connector) = &record.connector {
                        notes.push(format!("connector: {}", connector));
                    }
                    if let Some(node) = &record.node {
                        notes.push(format!("node: {}", node));
                    }
                    if let Some(context) = &record.context {
                        notes.push(context.clone());
                    }
                    if !notes.is_empty() {
                        entry.push_str(&format!(" ({})", notes.join(", ")));
                    }
                    entry
                })
                .collect();
            (heading, entries)
        })
        .collect()
}
