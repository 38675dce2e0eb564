//! Sequences API.

use serde_json::Value;

use crate::client::HookflowClient;
use crate::error::Result;
use crate::types::{
    ExecuteResponse, Listing, RecordId, Sequence, SequenceExecution, SequenceRequest,
    SequenceTestInfo, SuccessEnvelope,
};

/// Sequences API client.
pub struct SequencesApi {
    client: HookflowClient,
}

impl SequencesApi {
    pub(crate) fn new(client: HookflowClient) -> Self {
        Self { client }
    }

    /// List all sequences.
    pub async fn list(&self) -> Result<Vec<Sequence>> {
        let listing: Listing<Sequence> = self.client.get("sequences").await?;
        Ok(listing.into_items())
    }

    /// Get a sequence by ID.
    pub async fn get(&self, id: RecordId) -> Result<Sequence> {
        self.client.get(&format!("sequences/{}", id)).await
    }

    /// Create a new sequence.
    pub async fn create(&self, request: &SequenceRequest) -> Result<Sequence> {
        self.client.post("sequences", request).await
    }

    /// Replace a sequence.
    pub async fn update(&self, id: RecordId, request: &SequenceRequest) -> Result<Sequence> {
        self.client.put(&format!("sequences/{}", id), request).await
    }

    /// Delete a sequence.
    pub async fn delete(&self, id: RecordId) -> Result<()> {
        self.client.delete(&format!("sequences/{}", id)).await
    }

    /// Flip a sequence between active and inactive.
    pub async fn toggle_status(&self, id: RecordId) -> Result<SuccessEnvelope> {
        self.client
            .post_empty(&format!("sequences/{}/toggle-status", id))
            .await
    }

    /// Run a sequence with the given trigger payload.
    pub async fn execute(&self, id: RecordId, payload: &Value) -> Result<ExecuteResponse> {
        self.client
            .post(&format!("sequences/{}/execute", id), payload)
            .await
    }

    /// Test endpoints of the events that trigger this sequence.
    pub async fn test_info(&self, id: RecordId) -> Result<SequenceTestInfo> {
        self.client
            .get(&format!("sequences/{}/test-info", id))
            .await
    }

    /// Latest test execution, or `None` if the sequence has not run yet.
    pub async fn test_status(&self, id: RecordId) -> Result<Option<SequenceExecution>> {
        self.client
            .get_optional(&format!("sequences/{}/test-status", id))
            .await
    }

    /// Export a sequence as a portable JSON document.
    pub async fn export(&self, id: RecordId) -> Result<Value> {
        self.client.get(&format!("sequences/{}/export", id)).await
    }

    /// Import a previously exported sequence document.
    ///
    /// Unknown referenced records come back as
    /// [`crate::Error::MissingDependencies`].
    pub async fn import(&self, document: &Value) -> Result<SuccessEnvelope> {
        self.client.post("sequences/import", document).await
    }
}
