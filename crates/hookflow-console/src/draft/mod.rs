//! Editable form drafts.
//!
//! A draft holds what the user is typing, including text that does not parse
//! yet. [`Draft::validate`] turns it into a request body or the first
//! field-level error, and [`submit`] only calls the save operation once
//! validation has passed.

mod error;
mod forms;
mod json_field;
mod key_value;

use std::future::Future;

use tracing::debug;

pub use error::{DraftError, SubmitError};
pub use forms::{
    ActionDraft, EventDraft, SequenceDraft, WorkflowDraft, WorkflowRuleDraft,
    default_event_format, sample_acknowledgement_payload,
};
pub use json_field::{BlankPolicy, JsonField};
pub use key_value::{KeyValueEditor, KeyValueRow};

/// A form that validates into a request body.
pub trait Draft {
    /// Body sent to the server.
    type Request;

    /// Check every field and build the request.
    fn validate(&self) -> Result<Self::Request, DraftError>;

    /// Message shown when the server rejects the save without saying why.
    fn failure_fallback(&self) -> &'static str;
}

/// Validate `draft` and pass the request to `save`.
///
/// `save` is not called when validation fails. A server rejection is turned
/// into the server's message, or the draft's fallback.
pub async fn submit<D, F, Fut, T>(draft: &D, save: F) -> Result<T, SubmitError>
where
    D: Draft,
    F: FnOnce(D::Request) -> Fut,
    Fut: Future<Output = hookflow_client::Result<T>>,
{
    let request = draft.validate().inspect_err(|e| {
        debug!(field = e.field(), error = %e, "draft rejected locally");
    })?;

    save(request).await.map_err(|source| SubmitError::Rejected {
        message: source.display_message(draft.failure_fallback()),
        source,
    })
}
