//! Import documents and the name-conflict resolution loop.

use std::future::Future;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info};

use hookflow_client::{ConflictDetails, Error, MissingDependencies, SuccessEnvelope};

/// Key the server reads a replacement name from.
pub const NAME_OVERRIDE_KEY: &str = "name_override";

const IMPORT_FAILED: &str = "Import failed";

/// Local import failures. Nothing has been sent when one of these occurs.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Invalid JSON format")]
    InvalidJson(#[source] serde_json::Error),

    #[error("Import document must be a JSON object")]
    NotAnObject,

    #[error("Name cannot be empty")]
    EmptyName,
}

/// A parsed export document ready to post.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDocument {
    fields: Map<String, Value>,
}

impl ImportDocument {
    /// Parse file contents.
    pub fn from_text(text: &str) -> Result<Self, ImportError> {
        let value: Value = serde_json::from_str(text).map_err(ImportError::InvalidJson)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, ImportError> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            _ => Err(ImportError::NotAnObject),
        }
    }

    /// Name recorded in the document, if any.
    pub fn name(&self) -> Option<&str> {
        self.fields.get("name").and_then(Value::as_str)
    }

    /// Pretty-printed preview.
    pub fn preview(&self) -> String {
        serde_json::to_string_pretty(&self.fields).unwrap_or_default()
    }

    /// Body for the first attempt.
    pub fn body(&self) -> Value {
        Value::Object(self.fields.clone())
    }

    /// Body for a retry under `name`. The name is trimmed and must not be blank.
    pub fn body_with_name_override(&self, name: &str) -> Result<Value, ImportError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ImportError::EmptyName);
        }
        let mut fields = self.fields.clone();
        fields.insert(NAME_OVERRIDE_KEY.to_string(), Value::String(name.to_string()));
        Ok(Value::Object(fields))
    }
}

/// How one import attempt ended.
#[derive(Debug, Clone)]
pub enum ImportOutcome {
    Imported(SuccessEnvelope),
    /// The name is taken; ask for another one.
    NameConflict(ConflictDetails),
    /// Referenced records do not exist; list them.
    MissingDependencies(MissingDependencies),
    /// Anything else, with the message to show.
    Failed(String),
}

impl ImportOutcome {
    /// Classify the server's answer to an import request.
    pub fn from_result(result: hookflow_client::Result<SuccessEnvelope>) -> Self {
        match result {
            Ok(envelope) if envelope.success => ImportOutcome::Imported(envelope),
            Ok(envelope) => ImportOutcome::Failed(
                envelope
                    .message
                    .or(envelope.error)
                    .unwrap_or_else(|| IMPORT_FAILED.to_string()),
            ),
            Err(Error::NameConflict(details)) => ImportOutcome::NameConflict(details),
            Err(Error::MissingDependencies(deps)) => ImportOutcome::MissingDependencies(deps),
            Err(e) => ImportOutcome::Failed(e.display_message(IMPORT_FAILED)),
        }
    }
}

/// What the conflict dialog is asked to resolve.
#[derive(Debug, Clone)]
pub struct ConflictPrompt {
    pub details: ConflictDetails,
    /// Validation error from the previous answer, such as a blank name.
    pub error: Option<String>,
}

/// Import `document`, asking `resolve` for a new name on every conflict.
///
/// `resolve` returns `None` to cancel, in which case the conflict outcome is
/// returned. A blank answer is rejected locally and the prompt repeats.
pub async fn import_with_resolution<I, IFut, R, RFut>(
    document: &ImportDocument,
    mut import: I,
    mut resolve: R,
) -> ImportOutcome
where
    I: FnMut(Value) -> IFut,
    IFut: Future<Output = hookflow_client::Result<SuccessEnvelope>>,
    R: FnMut(ConflictPrompt) -> RFut,
    RFut: Future<Output = Option<String>>,
{
    let mut body = document.body();
    loop {
        let details = match ImportOutcome::from_result(import(body).await) {
            ImportOutcome::NameConflict(details) => details,
            other => return other,
        };
        info!(name = ?details.original_name, "import hit a name conflict");

        let mut error = None;
        body = loop {
            let prompt = ConflictPrompt {
                details: details.clone(),
                error: error.take(),
            };
            let Some(name) = resolve(prompt).await else {
                debug!("conflict resolution cancelled");
                return ImportOutcome::NameConflict(details);
            };
            match document.body_with_name_override(&name) {
                Ok(body) => break body,
                Err(e) => error = Some(e.to_string()),
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    use hookflow_client::DependencyLists;
    use parking_lot::Mutex;
    use serde_json::json;

    fn conflict() -> Error {
        Error::NameConflict(ConflictDetails {
            message: "An event named 'Order Created' already exists".into(),
            original_name: Some("Order Created".into()),
        })
    }

    fn imported() -> SuccessEnvelope {
        SuccessEnvelope {
            success: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_invalid_text() {
        let err = ImportDocument::from_text("{not json").unwrap_err();
        assert_eq!(err.to_string(), "Invalid JSON format");
        assert!(matches!(
            ImportDocument::from_text("[1]"),
            Err(ImportError::NotAnObject)
        ));
    }

    #[test]
    fn test_name_override_is_trimmed_and_required() {
        let doc = ImportDocument::from_text(r#"{"name": "Order Created"}"#).unwrap();
        assert_eq!(doc.name(), Some("Order Created"));

        let body = doc.body_with_name_override("  Order Created v2 ").unwrap();
        assert_eq!(body[NAME_OVERRIDE_KEY], "Order Created v2");
        assert_eq!(body["name"], "Order Created");

        assert_eq!(
            doc.body_with_name_override("   ").unwrap_err().to_string(),
            "Name cannot be empty"
        );
    }

    #[test]
    fn test_outcome_classification() {
        assert!(matches!(
            ImportOutcome::from_result(Ok(imported())),
            ImportOutcome::Imported(_)
        ));
        assert!(matches!(
            ImportOutcome::from_result(Err(Error::MissingDependencies(MissingDependencies {
                message: String::new(),
                lists: DependencyLists::default(),
            }))),
            ImportOutcome::MissingDependencies(_)
        ));

        let ImportOutcome::Failed(message) = ImportOutcome::from_result(Ok(SuccessEnvelope::default()))
        else {
            panic!("expected failure");
        };
        assert_eq!(message, "Import failed");
    }

    #[tokio::test]
    async fn test_conflict_loop_retries_with_override() {
        let doc = ImportDocument::from_text(r#"{"name": "Order Created", "version": 1}"#).unwrap();
        let responses = Mutex::new(VecDeque::from([Err(conflict()), Err(conflict()), Ok(imported())]));
        let bodies = Mutex::new(Vec::new());
        let answers = Mutex::new(VecDeque::from(["  ", "Order Created 2", "Order Created 3"]));
        let prompts = Mutex::new(Vec::new());

        let outcome = import_with_resolution(
            &doc,
            |body| {
                bodies.lock().push(body);
                let response = responses.lock().pop_front().unwrap();
                async move { response }
            },
            |prompt| {
                prompts.lock().push(prompt.error.clone());
                let answer = answers.lock().pop_front().map(str::to_string);
                async move { answer }
            },
        )
        .await;

        assert!(matches!(outcome, ImportOutcome::Imported(_)));

        let bodies = bodies.into_inner();
        assert_eq!(bodies.len(), 3);
        assert!(bodies[0].get(NAME_OVERRIDE_KEY).is_none());
        assert_eq!(bodies[1][NAME_OVERRIDE_KEY], "Order Created 2");
        assert_eq!(bodies[2][NAME_OVERRIDE_KEY], "Order Created 3");

        // The blank answer was rejected locally before any request
        let prompts = prompts.into_inner();
        assert_eq!(prompts[0], None);
        assert_eq!(prompts[1].as_deref(), Some("Name cannot be empty"));
        assert_eq!(prompts[2], None);
    }

    #[tokio::test]
    async fn test_cancel_returns_conflict() {
        let doc = ImportDocument::from_text(r#"{"name": "Order Created"}"#).unwrap();
        let outcome = import_with_resolution(
            &doc,
            |_| async { Err(conflict()) },
            |_| async { None },
        )
        .await;

        let ImportOutcome::NameConflict(details) = outcome else {
            panic!("expected conflict");
        };
        assert_eq!(details.original_name.as_deref(), Some("Order Created"));
    }
}
