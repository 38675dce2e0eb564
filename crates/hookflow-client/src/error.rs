//! Client error types.
//!
//! The backend's error envelope carries a human message (`detail` or
//! `message`) and sometimes a machine discriminator in `error`. Two
//! discriminators change what the caller should do next, so they get their
//! own variants:
//!
//! - `name_conflict` -> [`Error::NameConflict`]
//! - `missing_dependencies` -> [`Error::MissingDependencies`]

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// `error` tag the backend uses when an imported name already exists.
pub const NAME_CONFLICT: &str = "name_conflict";

/// `error` tag the backend uses when an import references unknown records.
pub const MISSING_DEPENDENCIES: &str = "missing_dependencies";

/// Client error type.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Resource not found (HTTP 404).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Server returned an error response.
    #[error("API error ({status}): {}", .detail.as_deref().unwrap_or("no detail"))]
    Api {
        /// HTTP status code.
        status: u16,
        /// Machine-readable discriminator, when present.
        error: Option<String>,
        /// Human-readable message from `detail` or `message`.
        detail: Option<String>,
        /// Rule validation failures reported by workflow endpoints.
        rule_errors: Vec<String>,
    },

    /// An imported record's name collides with an existing one.
    #[error("Name conflict: {}", .0.message)]
    NameConflict(ConflictDetails),

    /// An imported record references records that do not exist.
    #[error("Missing dependencies: {}", .0.summary())]
    MissingDependencies(MissingDependencies),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_)) || matches!(self, Error::Api { status: 404, .. })
    }

    /// Check if this is a server error.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Error::Api { status, .. } if *status >= 500)
    }

    /// Check if this error should be routed to a resolution flow rather than
    /// shown as a generic failure.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::NameConflict(_) | Error::MissingDependencies(_))
    }

    /// Message to show the user.
    ///
    /// Uses the server's own wording when it sent one, otherwise `fallback`.
    pub fn display_message(&self, fallback: &str) -> String {
        match self {
            Error::Api { rule_errors, .. } if !rule_errors.is_empty() => {
                format!("Rule validation failed: {}", rule_errors.join(", "))
            }
            Error::Api {
                detail: Some(detail),
                ..
            } => detail.clone(),
            Error::NameConflict(details) => details.message.clone(),
            Error::MissingDependencies(deps) if !deps.message.is_empty() => deps.message.clone(),
            _ => fallback.to_string(),
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error envelope returned by the server.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorEnvelope {
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub rule_errors: Vec<String>,
    #[serde(default)]
    pub original_name: Option<String>,
    #[serde(default)]
    pub missing_dependencies: Option<DependencyLists>,
}

impl ErrorEnvelope {
    /// The human message, preferring `detail` over `message`.
    pub(crate) fn message_text(&self) -> Option<String> {
        self.detail.clone().or_else(|| self.message.clone())
    }

    /// Classify the envelope into an [`Error`].
    pub(crate) fn into_error(self, status: u16) -> Error {
        let message = self.message_text();
        match self.error.as_deref() {
            Some(NAME_CONFLICT) => Error::NameConflict(ConflictDetails {
                message: message.unwrap_or_else(|| "A record with this name already exists".into()),
                original_name: self.original_name,
            }),
            Some(MISSING_DEPENDENCIES) => Error::MissingDependencies(MissingDependencies {
                message: message.unwrap_or_default(),
                lists: self.missing_dependencies.unwrap_or_default(),
            }),
            _ => Error::Api {
                status,
                error: self.error,
                detail: message,
                rule_errors: self.rule_errors,
            },
        }
    }
}

/// Details of a `name_conflict` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictDetails {
    /// Server message explaining the conflict.
    pub message: String,
    /// The name that collided, if the server echoed it.
    pub original_name: Option<String>,
}

/// Details of a `missing_dependencies` response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingDependencies {
    /// Server message, possibly empty.
    pub message: String,
    /// What is missing.
    pub lists: DependencyLists,
}

impl MissingDependencies {
    /// One-line summary such as `2 events, 1 action`.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        for (count, noun) in [
            (self.lists.events.len(), "event"),
            (self.lists.connectors.len(), "connector"),
            (self.lists.actions.len(), "action"),
        ] {
            if count > 0 {
                let plural = if count == 1 { "" } else { "s" };
                parts.push(format!("{} {}{}", count, noun, plural));
            }
        }
        if parts.is_empty() {
            "none listed".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// Records an import refers to that the server could not find.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyLists {
    #[serde(default)]
    pub events: Vec<MissingRecord>,
    #[serde(default)]
    pub connectors: Vec<MissingRecord>,
    #[serde(default)]
    pub actions: Vec<MissingRecord>,
}

/// A single missing record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingRecord {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub name: Option<String>,
    /// Node of a sequence graph that references the record.
    #[serde(default)]
    pub node: Option<String>,
    /// Free-form location of the reference.
    #[serde(default)]
    pub context: Option<String>,
    /// Owning connector (actions only).
    #[serde(default)]
    pub connector: Option<String>,
}

impl MissingRecord {
    /// Display label: the name, or `<Kind> ID: <id>` when unnamed.
    pub fn label(&self, kind: &str) -> String {
        match (&self.name, &self.id) {
            (Some(name), _) if !name.is_empty() => name.clone(),
            (_, Some(serde_json::Value::String(id))) => format!("{} ID: {}", kind, id),
            (_, Some(id)) => format!("{} ID: {}", kind, id),
            (_, None) => format!("Unknown {}", kind.to_lowercase()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(json: serde_json::Value) -> ErrorEnvelope {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_name_conflict_tag() {
        let err = envelope(serde_json::json!({
            "error": "name_conflict",
            "message": "Event 'Order Created' already exists",
            "original_name": "Order Created"
        }))
        .into_error(409);

        match &err {
            Error::NameConflict(details) => {
                assert_eq!(details.original_name.as_deref(), Some("Order Created"));
            }
            other => panic!("expected NameConflict, got {:?}", other),
        }
        assert!(err.is_conflict());
        assert_eq!(
            err.display_message("Import failed"),
            "Event 'Order Created' already exists"
        );
    }

    #[test]
    fn test_missing_dependencies_tag() {
        let err = envelope(serde_json::json!({
            "error": "missing_dependencies",
            "message": "Sequence references unknown records",
            "missing_dependencies": {
                "events": [{"id": 7, "node": "trigger-1"}],
                "actions": [{"name": "Send Mail", "connector": "smtp"}]
            }
        }))
        .into_error(400);

        let Error::MissingDependencies(deps) = err else {
            panic!("expected MissingDependencies");
        };
        assert_eq!(deps.summary(), "1 event, 1 action");
        assert_eq!(deps.lists.events[0].label("Event"), "Event ID: 7");
        assert_eq!(deps.lists.actions[0].label("Action"), "Send Mail");
        assert!(deps.lists.connectors.is_empty());
    }

    #[test]
    fn test_unknown_tag_is_plain_api_error() {
        let err = envelope(serde_json::json!({
            "error": "something_else",
            "detail": "nope"
        }))
        .into_error(400);

        assert!(matches!(
            &err,
            Error::Api { status: 400, error: Some(tag), .. } if tag == "something_else"
        ));
        assert!(!err.is_conflict());
        assert_eq!(err.display_message("Failed to save action"), "nope");
    }

    #[test]
    fn test_detail_preferred_over_message() {
        let env = envelope(serde_json::json!({"detail": "d", "message": "m"}));
        assert_eq!(env.message_text().as_deref(), Some("d"));
    }

    #[test]
    fn test_rule_errors_message() {
        let err = envelope(serde_json::json!({
            "rule_errors": ["Customer ID is required", "Stamp amount must be at least 100"]
        }))
        .into_error(400);

        assert_eq!(
            err.display_message("Failed to complete step"),
            "Rule validation failed: Customer ID is required, Stamp amount must be at least 100"
        );
    }

    #[test]
    fn test_fallback_when_no_detail() {
        let err = Error::Api {
            status: 500,
            error: None,
            detail: None,
            rule_errors: Vec::new(),
        };
        assert!(err.is_server_error());
        assert_eq!(err.display_message("Failed to save event"), "Failed to save event");
    }

    #[test]
    fn test_not_found_predicate() {
        assert!(Error::NotFound("HTTP 404".into()).is_not_found());
        assert!(!Error::Config("x".into()).is_not_found());
    }
}
