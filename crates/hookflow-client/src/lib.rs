//! HTTP client SDK for the hookflow automation API.
//!
//! This crate provides a typed client for the REST API behind the hookflow
//! console: events, sequences, workflows, workflow rules, workflow
//! executions, actions and async executions.
//!
//! # Example
//!
//! ```no_run
//! use hookflow_client::{HookflowClient, Result};
//!
//! # async fn example() -> Result<()> {
//! let client = HookflowClient::builder()
//!     .base_url("http://localhost:8000/api")
//!     .build()?;
//!
//! // A 404 from a polling target is "nothing yet", not an error
//! match client.events().test_payload(42).await? {
//!     Some(payload) => println!("{} at {}", payload.method, payload.timestamp),
//!     None => println!("No payload received yet"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Structured errors
//!
//! The server tags some failures with an `error` discriminator. Those become
//! dedicated variants ([`Error::NameConflict`], [`Error::MissingDependencies`])
//! so callers can branch into a resolution flow instead of a generic failure.

pub mod api;
pub mod client;
pub mod error;
pub mod types;

pub use client::{ClientBuilder, DEFAULT_BASE_URL, HookflowClient};
pub use error::{
    ConflictDetails, DependencyLists, Error, MISSING_DEPENDENCIES, MissingDependencies,
    MissingRecord, NAME_CONFLICT, Result,
};
pub use types::*;

// Re-export API types that are commonly used with query methods
pub use api::{
    ListActionsQuery, ListAsyncExecutionsQuery, ListRuleExecutionsQuery, ListWorkflowRulesQuery,
};
