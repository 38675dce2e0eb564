//! Status badges.
//!
//! Maps execution states and related values to a presentation tone that any
//! renderer (terminal colours, HTML classes) can translate.

use hookflow_client::{ExecutionStatus, ResourceStatus, WorkflowExecutionStatus};

/// Presentation tone of a badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tone {
    Success,
    Error,
    Warning,
    Info,
    Primary,
    Neutral,
}

/// How a status badge is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusStyle {
    pub tone: Tone,
    pub glyph: &'static str,
}

/// Badge for an execution status. Unknown statuses are neutral.
pub fn status_style(status: ExecutionStatus) -> StatusStyle {
    let (tone, glyph) = match status {
        ExecutionStatus::Completed => (Tone::Success, "✓"),
        ExecutionStatus::Failed => (Tone::Error, "✗"),
        ExecutionStatus::Timeout => (Tone::Warning, "⏱"),
        ExecutionStatus::Polling => (Tone::Info, "↻"),
        ExecutionStatus::Running => (Tone::Info, "▶"),
        ExecutionStatus::Initiated => (Tone::Primary, "▶"),
        ExecutionStatus::Pending => (Tone::Neutral, "…"),
        ExecutionStatus::Cancelled => (Tone::Neutral, "■"),
        ExecutionStatus::Unknown => (Tone::Neutral, "?"),
    };
    StatusStyle { tone, glyph }
}

/// Tone of an execution log line's `log_level`.
pub fn log_level_tone(level: &str) -> Tone {
    match level {
        "success" => Tone::Success,
        "error" => Tone::Error,
        "warning" => Tone::Warning,
        "info" => Tone::Info,
        _ => Tone::Neutral,
    }
}

/// Tone of an async execution success rate percentage.
pub fn success_rate_tone(rate: f64) -> Tone {
    if rate >= 90.0 {
        Tone::Success
    } else if rate >= 70.0 {
        Tone::Warning
    } else {
        Tone::Error
    }
}

/// Tone of an event or sequence activation badge.
pub fn resource_status_tone(status: ResourceStatus) -> Tone {
    match status {
        ResourceStatus::Active => Tone::Success,
        ResourceStatus::Inactive => Tone::Neutral,
    }
}

/// Tone of a workflow execution's progress badge.
pub fn workflow_execution_tone(status: WorkflowExecutionStatus) -> Tone {
    match status {
        WorkflowExecutionStatus::InProgress => Tone::Info,
        WorkflowExecutionStatus::Completed => Tone::Success,
        WorkflowExecutionStatus::Failed => Tone::Error,
        WorkflowExecutionStatus::Unknown => Tone::Neutral,
    }
}
