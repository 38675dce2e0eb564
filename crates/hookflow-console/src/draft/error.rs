//! Draft validation and submission errors.

use thiserror::Error;

/// A field-level validation failure. Displays as the message shown inline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    /// A required field is blank.
    #[error("{message}")]
    Required {
        field: &'static str,
        message: String,
    },

    /// A JSON field does not parse.
    #[error("{message}")]
    InvalidJson {
        field: &'static str,
        message: String,
    },

    /// A field holds a value outside its allowed range.
    #[error("{message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

impl DraftError {
    pub(crate) fn required(field: &'static str, message: impl Into<String>) -> Self {
        DraftError::Required {
            field,
            message: message.into(),
        }
    }

    pub(crate) fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        DraftError::Invalid {
            field,
            message: message.into(),
        }
    }

    /// Name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            DraftError::Required { field, .. }
            | DraftError::InvalidJson { field, .. }
            | DraftError::Invalid { field, .. } => field,
        }
    }
}

/// Why a submission did not go through.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The draft failed validation; nothing was sent.
    #[error("{0}")]
    Validation(#[from] DraftError),

    /// The server refused the save.
    #[error("{message}")]
    Rejected {
        /// Server wording, or the form's fallback.
        message: String,
        #[source]
        source: hookflow_client::Error,
    },
}

impl SubmitError {
    /// Whether the server was never contacted.
    pub fn is_validation(&self) -> bool {
        matches!(self, SubmitError::Validation(_))
    }
}
