//! API endpoint implementations.

mod actions;
mod async_executions;
mod events;
mod sequences;
mod workflow_executions;
mod workflow_rules;
mod workflows;

pub use actions::{ActionsApi, ListActionsQuery};
pub use async_executions::{AsyncExecutionsApi, ListAsyncExecutionsQuery};
pub use events::EventsApi;
pub use sequences::SequencesApi;
pub use workflow_executions::{
    ListRuleExecutionsQuery, RuleExecutionsApi, WorkflowExecutionsApi,
};
pub use workflow_rules::{ListWorkflowRulesQuery, WorkflowRulesApi};
pub use workflows::WorkflowsApi;
