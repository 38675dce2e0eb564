//! Raw-text JSON fields with live parsing.

use serde_json::{Map, Value};

use super::error::DraftError;

/// What blank text means for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlankPolicy {
    /// Blank is an empty object.
    EmptyObject,
    /// Blank must still parse, so it is rejected.
    Reject,
}

/// A JSON value edited as text.
///
/// Every edit is parsed. A successful parse replaces the live value; a failed
/// one leaves the last valid value in place and only the text changes.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonField {
    field: &'static str,
    text: String,
    value: Value,
    blank: BlankPolicy,
    invalid_message: String,
}

impl JsonField {
    /// Field showing `initial` pretty-printed.
    pub fn new(field: &'static str, label: &str, initial: &Value) -> Self {
        let text = serde_json::to_string_pretty(initial).unwrap_or_else(|_| initial.to_string());
        Self {
            field,
            text,
            value: initial.clone(),
            blank: BlankPolicy::Reject,
            invalid_message: format!("Invalid JSON in {}", label),
        }
    }

    /// Treat blank text as `{}`.
    pub fn blank_as_empty_object(mut self) -> Self {
        self.blank = BlankPolicy::EmptyObject;
        self
    }

    /// Replace the inline error text.
    pub fn with_invalid_message(mut self, message: impl Into<String>) -> Self {
        self.invalid_message = message.into();
        self
    }

    /// Replace the text. Returns whether it parsed.
    pub fn edit(&mut self, text: impl Into<String>) -> bool {
        self.text = text.into();
        match self.interpret() {
            Some(value) => {
                self.value = value;
                true
            }
            None => false,
        }
    }

    /// Current text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Last value that parsed.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Whether the current text parses.
    pub fn is_valid(&self) -> bool {
        self.interpret().is_some()
    }

    /// Parse the current text for submission.
    pub fn parse(&self) -> Result<Value, DraftError> {
        self.interpret().ok_or_else(|| DraftError::InvalidJson {
            field: self.field,
            message: self.invalid_message.clone(),
        })
    }

    fn interpret(&self) -> Option<Value> {
        if self.text.trim().is_empty() {
            return match self.blank {
                BlankPolicy::EmptyObject => Some(Value::Object(Map::new())),
                BlankPolicy::Reject => None,
            };
        }
        serde_json::from_str(&self.text).ok()
    }
}
