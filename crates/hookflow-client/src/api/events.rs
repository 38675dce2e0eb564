//! Events API.

use serde_json::Value;

use crate::client::HookflowClient;
use crate::error::Result;
use crate::types::{
    Event, EventRequest, Listing, RecordId, SamplePayload, SuccessEnvelope, TestEndpoint,
    TestPayload,
};

/// Events API client.
pub struct EventsApi {
    client: HookflowClient,
}

impl EventsApi {
    pub(crate) fn new(client: HookflowClient) -> Self {
        Self { client }
    }

    /// List all events.
    pub async fn list(&self) -> Result<Vec<Event>> {
        let listing: Listing<Event> = self.client.get("events").await?;
        Ok(listing.into_items())
    }

    /// Get an event by ID.
    pub async fn get(&self, id: RecordId) -> Result<Event> {
        self.client.get(&format!("events/{}", id)).await
    }

    /// Create a new event.
    pub async fn create(&self, request: &EventRequest) -> Result<Event> {
        self.client.post("events", request).await
    }

    /// Replace an event.
    pub async fn update(&self, id: RecordId, request: &EventRequest) -> Result<Event> {
        self.client.put(&format!("events/{}", id), request).await
    }

    /// Delete an event.
    pub async fn delete(&self, id: RecordId) -> Result<()> {
        self.client.delete(&format!("events/{}", id)).await
    }

    /// Flip an event between active and inactive.
    pub async fn toggle_status(&self, id: RecordId) -> Result<SuccessEnvelope> {
        self.client
            .post_empty(&format!("events/{}/toggle-status", id))
            .await
    }

    /// URL that accepts test deliveries for this event.
    pub async fn test_endpoint(&self, id: RecordId) -> Result<TestEndpoint> {
        self.client
            .get(&format!("events/{}/test-endpoint", id))
            .await
    }

    /// Example payload generated from the event format.
    pub async fn sample_payload(&self, id: RecordId) -> Result<SamplePayload> {
        self.client
            .get(&format!("events/{}/sample-payload", id))
            .await
    }

    /// Most recent test delivery, or `None` if nothing has arrived yet.
    pub async fn test_payload(&self, id: RecordId) -> Result<Option<TestPayload>> {
        self.client
            .get_optional(&format!("events/{}/test-payload", id))
            .await
    }

    /// Export an event as a portable JSON document.
    pub async fn export(&self, id: RecordId) -> Result<Value> {
        self.client.get(&format!("events/{}/export", id)).await
    }

    /// Import a previously exported event document.
    ///
    /// Name collisions come back as [`crate::Error::NameConflict`].
    pub async fn import(&self, document: &Value) -> Result<SuccessEnvelope> {
        self.client.post("events/import", document).await
    }
}
