//! Status views: what a test dialog or execution monitor holds while open.
//!
//! Each view starts its poller on open and stops it on close. Nothing is
//! kept between openings.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use hookflow_client::{
    AsyncExecution, AsyncExecutionStats, HookflowClient, ListAsyncExecutionsQuery, RecordId,
    Result as ClientResult, SequenceExecution, SequenceTestInfo, TestPayload,
};

use crate::detail::{DetailFetcher, DetailState};
use crate::poller::{self, PollConfig, PollHandle, Snapshot, StatusSource, TerminalPolicy};

impl Snapshot for TestPayload {}

impl Snapshot for SequenceExecution {
    fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sources
// ─────────────────────────────────────────────────────────────────────────────

/// Latest payload delivered to an event's test endpoint.
pub struct TestPayloadSource {
    client: HookflowClient,
    event_id: RecordId,
}

impl TestPayloadSource {
    pub fn new(client: HookflowClient, event_id: RecordId) -> Self {
        Self { client, event_id }
    }
}

#[async_trait]
impl StatusSource for TestPayloadSource {
    type Snapshot = TestPayload;

    async fn fetch(&self) -> ClientResult<Option<TestPayload>> {
        self.client.events().test_payload(self.event_id).await
    }

    fn failure_message(&self) -> String {
        "Failed to load test payload".to_string()
    }

    fn describe(&self) -> String {
        format!("event {} test payload", self.event_id)
    }
}

/// Latest test execution of a sequence.
pub struct SequenceStatusSource {
    client: HookflowClient,
    sequence_id: RecordId,
}

impl SequenceStatusSource {
    pub fn new(client: HookflowClient, sequence_id: RecordId) -> Self {
        Self {
            client,
            sequence_id,
        }
    }
}

#[async_trait]
impl StatusSource for SequenceStatusSource {
    type Snapshot = SequenceExecution;

    async fn fetch(&self) -> ClientResult<Option<SequenceExecution>> {
        self.client.sequences().test_status(self.sequence_id).await
    }

    fn failure_message(&self) -> String {
        "Failed to load execution status".to_string()
    }

    fn describe(&self) -> String {
        format!("sequence {} test status", self.sequence_id)
    }
}

/// Async executions and their aggregate counters, fetched together.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionsOverview {
    pub executions: Vec<AsyncExecution>,
    pub stats: AsyncExecutionStats,
}

impl ExecutionsOverview {
    /// Executions the server is still working on.
    pub fn active(&self) -> impl Iterator<Item = &AsyncExecution> {
        self.executions.iter().filter(|e| e.status.is_active())
    }
}

impl Snapshot for ExecutionsOverview {
    fn is_terminal(&self) -> bool {
        self.active().next().is_none()
    }
}

/// Async execution list plus stats.
pub struct ExecutionsSource {
    client: HookflowClient,
    query: ListAsyncExecutionsQuery,
}

impl ExecutionsSource {
    pub fn new(client: HookflowClient, query: ListAsyncExecutionsQuery) -> Self {
        Self { client, query }
    }
}

#[async_trait]
impl StatusSource for ExecutionsSource {
    type Snapshot = ExecutionsOverview;

    async fn fetch(&self) -> ClientResult<Option<ExecutionsOverview>> {
        let api = self.client.async_executions();
        let (executions, stats) = tokio::try_join!(
            api.list(&self.query),
            api.stats(self.query.workflow_execution_id)
        )?;
        Ok(Some(ExecutionsOverview { executions, stats }))
    }

    fn failure_message(&self) -> String {
        "Failed to load async executions".to_string()
    }

    fn describe(&self) -> String {
        match self.query.workflow_execution_id {
            Some(id) => format!("async executions of workflow execution {}", id),
            None => "async executions".to_string(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sessions
// ─────────────────────────────────────────────────────────────────────────────

/// An open event test dialog.
pub struct EventTestSession {
    event_id: RecordId,
    test_endpoint: Option<String>,
    sample_payload: Option<Value>,
    error: Option<String>,
    payloads: PollHandle<TestPayload>,
}

impl EventTestSession {
    /// Start polling for payloads and load the endpoint and sample.
    ///
    /// Test payloads have no terminal state, so polling runs until close.
    pub async fn open(client: &HookflowClient, event_id: RecordId, config: PollConfig) -> Self {
        let payloads = poller::spawn(
            TestPayloadSource::new(client.clone(), event_id),
            config.with_policy(TerminalPolicy::Continuous),
        );

        let events = client.events();
        let (endpoint, sample) =
            tokio::join!(events.test_endpoint(event_id), events.sample_payload(event_id));

        let (test_endpoint, error) = match endpoint {
            Ok(endpoint) => (Some(endpoint.test_endpoint), None),
            Err(e) => {
                warn!(event_id, error = %e, "failed to load test endpoint");
                (None, Some("Failed to load test endpoint".to_string()))
            }
        };
        let sample_payload = match sample {
            Ok(sample) => Some(sample.sample_payload),
            Err(e) => {
                warn!(event_id, error = %e, "failed to load sample payload");
                None
            }
        };

        Self {
            event_id,
            test_endpoint,
            sample_payload,
            error,
            payloads,
        }
    }

    pub fn event_id(&self) -> RecordId {
        self.event_id
    }

    pub fn test_endpoint(&self) -> Option<&str> {
        self.test_endpoint.as_deref()
    }

    pub fn sample_payload(&self) -> Option<&Value> {
        self.sample_payload.as_ref()
    }

    /// Error raised while opening, separate from the poller's banner.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn payloads(&self) -> &PollHandle<TestPayload> {
        &self.payloads
    }

    pub async fn close(self) {
        self.payloads.close().await;
    }
}

/// An open sequence test dialog.
pub struct SequenceTestSession {
    sequence_id: RecordId,
    test_info: Option<SequenceTestInfo>,
    error: Option<String>,
    executions: PollHandle<SequenceExecution>,
}

impl SequenceTestSession {
    /// Start polling the latest execution and load the trigger endpoints.
    pub async fn open(client: &HookflowClient, sequence_id: RecordId, config: PollConfig) -> Self {
        let executions = poller::spawn(
            SequenceStatusSource::new(client.clone(), sequence_id),
            config,
        );

        let (test_info, error) = match client.sequences().test_info(sequence_id).await {
            Ok(info) => (Some(info), None),
            Err(e) => {
                warn!(sequence_id, error = %e, "failed to load test information");
                (None, Some("Failed to load test information".to_string()))
            }
        };

        Self {
            sequence_id,
            test_info,
            error,
            executions,
        }
    }

    pub fn sequence_id(&self) -> RecordId {
        self.sequence_id
    }

    pub fn test_info(&self) -> Option<&SequenceTestInfo> {
        self.test_info.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn executions(&self) -> &PollHandle<SequenceExecution> {
        &self.executions
    }

    pub async fn close(self) {
        self.executions.close().await;
    }
}

/// An open async execution monitor with its detail pane.
pub struct ExecutionsMonitor {
    client: HookflowClient,
    overview: PollHandle<ExecutionsOverview>,
    details: DetailFetcher<AsyncExecution>,
}

impl ExecutionsMonitor {
    /// Start polling. With the default policy, automatic refresh stops once
    /// no execution is active.
    pub fn open(client: &HookflowClient, query: ListAsyncExecutionsQuery, config: PollConfig) -> Self {
        let overview = poller::spawn(ExecutionsSource::new(client.clone(), query), config);
        Self {
            client: client.clone(),
            overview,
            details: DetailFetcher::new(),
        }
    }

    pub fn overview(&self) -> &PollHandle<ExecutionsOverview> {
        &self.overview
    }

    /// Load one execution into the detail pane, replacing any earlier request.
    pub async fn show_details(&self, id: RecordId) -> DetailState<AsyncExecution> {
        let api = self.client.async_executions();
        self.details
            .load(id, || api.status(id), "Failed to load execution details")
            .await;
        self.details.state()
    }

    pub fn hide_details(&self) {
        self.details.clear();
    }

    pub async fn close(self) {
        self.details.clear();
        self.overview.close().await;
    }
}
