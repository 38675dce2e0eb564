//! Console state for the hookflow automation API.
//!
//! This crate holds everything a hookflow front end needs between the HTTP
//! client and the screen:
//!
//! - [`poller`]: lifecycle-bound status polling with single-flight fetches
//! - [`detail`]: one-shot detail loads where the newest request wins
//! - [`draft`]: form drafts with live JSON parsing and total validation
//! - [`import`]: import documents and the name-conflict loop
//! - [`views`]: the test dialogs and execution monitor built from the above
//! - [`status`] and [`render`]: presentation helpers
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use hookflow_client::HookflowClient;
//! use hookflow_console::{EventTestSession, PollConfig, render};
//!
//! # async fn example(client: HookflowClient) {
//! let session = EventTestSession::open(&client, 42, PollConfig::every(Duration::from_secs(2))).await;
//! let mut updates = session.payloads().subscribe();
//! while updates.changed().await.is_ok() {
//!     for line in render::test_payload_lines(&updates.borrow().display) {
//!         println!("{}", line);
//!     }
//! }
//! session.close().await;
//! # }
//! ```

pub mod detail;
pub mod draft;
pub mod import;
pub mod poller;
pub mod render;
pub mod status;
pub mod views;

pub use detail::{DetailFetcher, DetailState};
pub use draft::{Draft, DraftError, SubmitError, submit};
pub use import::{ConflictPrompt, ImportDocument, ImportError, ImportOutcome, import_with_resolution};
pub use poller::{
    Display, Phase, PollConfig, PollHandle, PollState, Snapshot, StatusSource, TerminalPolicy,
};
pub use status::{StatusStyle, Tone, status_style};
pub use views::{
    EventTestSession, ExecutionsMonitor, ExecutionsOverview, SequenceTestSession,
};
