//! Workflows command - workflows and their rules.

use anyhow::{Context as _, Result, bail};
use clap::{Args, Subcommand};
use console::style;
use serde_json::Value;

use hookflow_client::{
    ListRuleExecutionsQuery, RecordId, StepOneData, StepResponse, StepTwoData, StepTwoDocument,
    WorkflowExecution, WorkflowRequest, WorkflowRuleRequest,
};
use hookflow_console::draft::{WorkflowDraft, WorkflowRuleDraft, submit};
use hookflow_console::render::{format_duration, pretty_json};
use hookflow_console::status::{log_level_tone, workflow_execution_tone};

use super::output;
use super::Context;

/// Arguments for the workflows command.
#[derive(Args, Debug)]
pub struct WorkflowsArgs {
    #[command(subcommand)]
    pub command: WorkflowsCommand,
}

#[derive(Subcommand, Debug)]
pub enum WorkflowsCommand {
    /// List workflows
    List,

    /// Show a workflow and its rules
    Show {
        /// Workflow ID
        id: RecordId,
    },

    /// Create a workflow
    Create(WorkflowFields),

    /// Update a workflow
    Update {
        /// Workflow ID
        id: RecordId,

        #[command(flatten)]
        fields: WorkflowFields,
    },

    /// Delete a workflow
    Delete {
        /// Workflow ID
        id: RecordId,
    },

    /// Manage workflow rules
    #[command(subcommand)]
    Rules(RulesCommand),

    /// Start a new execution of a workflow at step 1
    Run {
        /// Workflow ID
        id: RecordId,
    },

    /// Inspect and advance workflow executions
    #[command(subcommand)]
    Runs(RunsCommand),
}

#[derive(Args, Debug)]
pub struct WorkflowFields {
    /// Workflow name
    #[arg(long)]
    pub name: Option<String>,

    /// Description
    #[arg(long)]
    pub description: Option<String>,

    /// Active flag
    #[arg(long)]
    pub active: Option<bool>,
}

#[derive(Subcommand, Debug)]
pub enum RulesCommand {
    /// List the rules of a workflow
    List {
        /// Workflow ID
        workflow: RecordId,
    },

    /// Create a rule
    Create {
        /// Workflow ID
        #[arg(long)]
        workflow: RecordId,

        #[command(flatten)]
        fields: RuleFields,
    },

    /// Update a rule
    Update {
        /// Rule ID
        id: RecordId,

        #[command(flatten)]
        fields: RuleFields,
    },

    /// Delete a rule
    Delete {
        /// Rule ID
        id: RecordId,
    },

    /// Evaluate a rule against sample data
    Test {
        /// Rule ID
        id: RecordId,

        /// Sample context as JSON text
        #[arg(long)]
        data: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum RunsCommand {
    /// List workflow executions
    List,

    /// Show an execution and its rule outcomes
    Show {
        /// Execution ID
        id: RecordId,
    },

    /// Save step 1 fields, or run the step 1 rules and move to step 2
    Step1 {
        /// Execution ID
        id: RecordId,

        #[command(flatten)]
        fields: StepOneFields,

        /// Run the step 1 rules and proceed to step 2
        #[arg(long)]
        proceed: bool,
    },

    /// Save step 2 documents, or run the step 2 rules and complete
    Step2 {
        /// Execution ID
        id: RecordId,

        /// Documents as a JSON array
        #[arg(long)]
        documents: Option<String>,

        /// Run the step 2 rules and complete the workflow
        #[arg(long)]
        complete: bool,
    },
}

#[derive(Args, Debug)]
pub struct StepOneFields {
    #[arg(long)]
    pub irn: Option<String>,

    #[arg(long)]
    pub customer_id: Option<String>,

    #[arg(long)]
    pub stamp_group: Option<String>,

    /// Decimal amount, e.g. 1000.00
    #[arg(long)]
    pub stamp_amount: Option<String>,
}

impl From<StepOneFields> for StepOneData {
    fn from(fields: StepOneFields) -> Self {
        StepOneData {
            irn: fields.irn,
            customer_id: fields.customer_id,
            stamp_group: fields.stamp_group,
            stamp_amount: fields.stamp_amount,
        }
    }
}

#[derive(Args, Debug)]
pub struct RuleFields {
    /// Rule name
    #[arg(long)]
    pub name: Option<String>,

    /// Description
    #[arg(long)]
    pub description: Option<String>,

    /// Rule expression
    #[arg(long)]
    pub definition: Option<String>,

    /// Step after which the rule is evaluated (1-based)
    #[arg(long)]
    pub trigger_step: Option<u32>,

    /// Evaluation order among rules of the same step (1-based)
    #[arg(long)]
    pub order: Option<u32>,

    /// Active flag
    #[arg(long)]
    pub active: Option<bool>,
}

impl RuleFields {
    fn apply(self, draft: &mut WorkflowRuleDraft) {
        if let Some(name) = self.name {
            draft.name = name;
        }
        if let Some(description) = self.description {
            draft.description = description;
        }
        if let Some(definition) = self.definition {
            draft.rule_definition = definition;
        }
        if let Some(step) = self.trigger_step {
            draft.trigger_step = step;
        }
        if let Some(order) = self.order {
            draft.execution_order = order;
        }
        if let Some(active) = self.active {
            draft.is_active = active;
        }
    }
}

/// Run the workflows command.
pub async fn run(args: WorkflowsArgs, ctx: &Context) -> Result<()> {
    match args.command {
        WorkflowsCommand::List => cmd_list(ctx).await,
        WorkflowsCommand::Show { id } => cmd_show(id, ctx).await,
        WorkflowsCommand::Create(fields) => cmd_save(None, fields, ctx).await,
        WorkflowsCommand::Update { id, fields } => cmd_save(Some(id), fields, ctx).await,
        WorkflowsCommand::Delete { id } => cmd_delete(id, ctx).await,
        WorkflowsCommand::Rules(command) => run_rules(command, ctx).await,
        WorkflowsCommand::Run { id } => cmd_run(id, ctx).await,
        WorkflowsCommand::Runs(command) => run_runs(command, ctx).await,
    }
}

async fn cmd_list(ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let workflows = client.workflows().list().await.context("Failed to load workflows")?;

    if ctx.json_output {
        return output::print_json(&workflows);
    }
    if workflows.is_empty() {
        output::dim("No workflows found");
        return Ok(());
    }

    output::heading("Workflows");
    for workflow in &workflows {
        let state = if workflow.is_active {
            style("active").green()
        } else {
            style("inactive").dim()
        };
        println!(
            "{:>5}  {:<32} {}",
            style(workflow.id).cyan(),
            output::truncate(&workflow.name, 32),
            state
        );
    }
    Ok(())
}

async fn cmd_show(id: RecordId, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let (workflows, workflow_rules) = (client.workflows(), client.workflow_rules());
    let (workflow, rules) =
        tokio::try_join!(workflows.get(id), workflow_rules.list_for_workflow(id))
            .context("Failed to load workflow")?;

    if ctx.json_output {
        return output::print_json(&serde_json::json!({
            "workflow": workflow,
            "rules": rules,
        }));
    }

    output::heading(&workflow.name);
    println!("  ID:     {}", workflow.id);
    println!("  Active: {}", workflow.is_active);
    if !workflow.description.is_empty() {
        println!("  {}", workflow.description);
    }
    println!();
    print_rules(&rules);
    Ok(())
}

async fn cmd_save(id: Option<RecordId>, fields: WorkflowFields, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let mut draft = match id {
        Some(id) => WorkflowDraft::from_workflow(
            &client.workflows().get(id).await.context("Failed to load workflow")?,
        ),
        None => WorkflowDraft::default(),
    };
    if let Some(name) = fields.name {
        draft.name = name;
    }
    if let Some(description) = fields.description {
        draft.description = description;
    }
    if let Some(active) = fields.active {
        draft.is_active = active;
    }

    let workflows = client.workflows();
    let saved = submit(&draft, |request: WorkflowRequest| async move {
        match id {
            Some(id) => workflows.update(id, &request).await,
            None => workflows.create(&request).await,
        }
    })
    .await?;

    if ctx.json_output {
        output::print_json(&saved)
    } else {
        output::success(format!("Workflow \"{}\" saved (id {})", saved.name, saved.id));
        Ok(())
    }
}

async fn cmd_delete(id: RecordId, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    client
        .workflows()
        .delete(id)
        .await
        .map_err(|e| anyhow::anyhow!(e.display_message("Failed to delete workflow")))?;
    if !ctx.json_output {
        output::success(format!("Workflow {} deleted", id));
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Rules
// ─────────────────────────────────────────────────────────────────────────────

async fn run_rules(command: RulesCommand, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let rules = client.workflow_rules();

    match command {
        RulesCommand::List { workflow } => {
            let list = rules
                .list_for_workflow(workflow)
                .await
                .context("Failed to load rules")?;
            if ctx.json_output {
                return output::print_json(&list);
            }
            print_rules(&list);
            Ok(())
        }
        RulesCommand::Create { workflow, fields } => {
            let mut draft = WorkflowRuleDraft::new(workflow);
            fields.apply(&mut draft);
            let saved = submit(&draft, |request: WorkflowRuleRequest| async move {
                rules.create(&request).await
            })
            .await?;
            report_saved(&saved, ctx)
        }
        RulesCommand::Update { id, fields } => {
            let existing = rules.get(id).await.context("Failed to load rule")?;
            let mut draft = WorkflowRuleDraft::from_rule(&existing);
            fields.apply(&mut draft);
            let saved = submit(&draft, |request: WorkflowRuleRequest| async move {
                rules.update(id, &request).await
            })
            .await?;
            report_saved(&saved, ctx)
        }
        RulesCommand::Delete { id } => {
            rules
                .delete(id)
                .await
                .map_err(|e| anyhow::anyhow!(e.display_message("Failed to delete rule")))?;
            if !ctx.json_output {
                output::success(format!("Rule {} deleted", id));
            }
            Ok(())
        }
        RulesCommand::Test { id, data } => {
            let data: Value = match serde_json::from_str(data.trim()) {
                Ok(value) => value,
                Err(_) => bail!("Invalid JSON in test data"),
            };
            let result = rules
                .test_rule(id, &data)
                .await
                .map_err(|e| anyhow::anyhow!(e.display_message("Failed to test rule")))?;
            if ctx.json_output {
                output::print_json(&result)
            } else {
                println!("{}", pretty_json(&result));
                Ok(())
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Executions
// ─────────────────────────────────────────────────────────────────────────────

async fn cmd_run(id: RecordId, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let execution = client
        .workflows()
        .create_execution(id)
        .await
        .map_err(|e| anyhow::anyhow!(e.display_message("Failed to initialize workflow execution")))?;

    if ctx.json_output {
        return output::print_json(&execution);
    }
    output::success(format!("Execution {} started at step 1", execution.id));
    print_execution(&execution);
    Ok(())
}

/// Parse the `--documents` JSON array.
fn parse_documents(text: &str) -> Result<Vec<StepTwoDocument>> {
    match serde_json::from_str(text.trim()) {
        Ok(documents) => Ok(documents),
        Err(_) => bail!("Invalid JSON in documents"),
    }
}

async fn run_runs(command: RunsCommand, ctx: &Context) -> Result<()> {
    match command {
        RunsCommand::List => {
            let client = ctx.client()?;
            let executions = client
                .workflow_executions()
                .list()
                .await
                .context("Failed to load workflow executions")?;
            if ctx.json_output {
                return output::print_json(&executions);
            }
            if executions.is_empty() {
                output::dim("No workflow executions found");
                return Ok(());
            }
            output::heading("Workflow executions");
            for execution in &executions {
                println!(
                    "{:>5}  {:<32} step {}  {}",
                    style(execution.id).cyan(),
                    output::truncate(execution.workflow_name.as_deref().unwrap_or("-"), 32),
                    execution.current_step,
                    execution_badge(execution)
                );
            }
            Ok(())
        }
        RunsCommand::Show { id } => {
            let client = ctx.client()?;
            let query = ListRuleExecutionsQuery {
                workflow_execution_id: Some(id),
            };
            let (executions, rule_executions) =
                (client.workflow_executions(), client.rule_executions());
            let (execution, outcomes) =
                tokio::try_join!(executions.get(id), rule_executions.list(&query))
                    .context("Failed to load workflow execution")?;

            if ctx.json_output {
                return output::print_json(&serde_json::json!({
                    "execution": execution,
                    "rule_executions": outcomes,
                }));
            }
            print_execution(&execution);
            println!();
            if outcomes.is_empty() {
                output::dim("No rule executions");
                return Ok(());
            }
            println!("{}", style("Rule executions").bold());
            for outcome in &outcomes {
                let status = output::tone_style(log_level_tone(&outcome.status))
                    .apply_to(&outcome.status);
                let took = outcome
                    .execution_time_ms
                    .map(|ms| format!("{} ms", ms))
                    .unwrap_or_else(|| "N/A".to_string());
                println!(
                    "  {:<28} {:<8} {}",
                    output::truncate(outcome.rule_name.as_deref().unwrap_or("-"), 28),
                    status,
                    style(took).dim()
                );
                if !outcome.error_message.is_empty() {
                    println!("    {}", style(&outcome.error_message).red());
                }
            }
            Ok(())
        }
        RunsCommand::Step1 {
            id,
            fields,
            proceed,
        } => {
            let data = StepOneData::from(fields);
            if !proceed && data.is_empty() {
                bail!("Nothing to update; pass step 1 fields or --proceed");
            }
            let client = ctx.client()?;
            let executions = client.workflow_executions();
            let (result, fallback) = if proceed {
                let spinner = output::spinner("Running step 1 rules...", ctx.json_output);
                let result = executions.proceed_to_step2(id, &data).await;
                spinner.finish_and_clear();
                (result, "Failed to proceed to step 2")
            } else {
                (executions.update_step1(id, &data).await, "Failed to update step 1")
            };
            report_step(result, fallback, ctx)
        }
        RunsCommand::Step2 {
            id,
            documents,
            complete,
        } => {
            let documents = match documents.as_deref() {
                Some(text) => parse_documents(text)?,
                None if complete => Vec::new(),
                None => bail!("--documents is required unless --complete is given"),
            };
            let data = StepTwoData { documents };
            let client = ctx.client()?;
            let executions = client.workflow_executions();
            let (result, fallback) = if complete {
                let spinner = output::spinner("Running step 2 rules...", ctx.json_output);
                let result = executions.complete_workflow(id, &data).await;
                spinner.finish_and_clear();
                (result, "Failed to complete workflow")
            } else {
                (executions.update_step2(id, &data).await, "Failed to update step 2")
            };
            report_step(result, fallback, ctx)
        }
    }
}

/// Print a step response, turning rule failures into the error message.
fn report_step(
    result: hookflow_client::Result<StepResponse>,
    fallback: &str,
    ctx: &Context,
) -> Result<()> {
    let response = result.map_err(|e| anyhow::anyhow!(e.display_message(fallback)))?;
    if !response.success {
        bail!("{}", response.error.as_deref().unwrap_or(fallback));
    }
    if ctx.json_output {
        return output::print_json(&response);
    }
    output::success(response.message.as_deref().unwrap_or("Saved"));
    if let Some(execution) = &response.execution {
        print_execution(execution);
    }
    if !response.rule_results.is_empty() {
        println!("  Rules run: {}", response.rule_results.len());
    }
    Ok(())
}

fn execution_badge(execution: &WorkflowExecution) -> String {
    output::tone_style(workflow_execution_tone(execution.status))
        .apply_to(execution.status.label())
        .to_string()
}

fn print_execution(execution: &WorkflowExecution) {
    let title = match &execution.workflow_name {
        Some(name) => format!("{} - Execution {}", name, execution.id),
        None => format!("Execution {}", execution.id),
    };
    output::heading(&title);
    println!("  Status:   {}", execution_badge(execution));
    println!("  Step:     {}", execution.current_step);
    println!(
        "  Duration: {}",
        format_duration(execution.started_at, execution.completed_at)
    );
    for (label, value) in [
        ("IRN", &execution.irn),
        ("Customer", &execution.customer_id),
        ("Stamp group", &execution.stamp_group),
    ] {
        if !value.is_empty() {
            println!("  {:<9} {}", format!("{}:", label), value);
        }
    }
    if let Some(amount) = &execution.stamp_amount {
        println!("  Amount:   {}", amount);
    }
    if !execution.step2_data.is_empty() {
        println!("  Documents: {}", execution.step2_data.len());
    }
    if !execution.error_message.is_empty() {
        output::banner(&execution.error_message);
    }
}

fn report_saved(rule: &hookflow_client::WorkflowRule, ctx: &Context) -> Result<()> {
    if ctx.json_output {
        output::print_json(rule)
    } else {
        output::success(format!("Rule \"{}\" saved (id {})", rule.name, rule.id));
        Ok(())
    }
}

fn print_rules(rules: &[hookflow_client::WorkflowRule]) {
    if rules.is_empty() {
        output::dim("No rules");
        return;
    }
    println!("{}", style("Rules").bold());
    let mut sorted: Vec<_> = rules.iter().collect();
    sorted.sort_by_key(|rule| (rule.trigger_step, rule.execution_order));
    for rule in sorted {
        println!(
            "  {:>5}  step {} #{}  {:<28} {}",
            style(rule.id).cyan(),
            rule.trigger_step,
            rule.execution_order,
            output::truncate(&rule.name, 28),
            style(&rule.rule_definition).dim()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_documents() {
        let documents =
            parse_documents(r#"[{"document_id": "DOC123", "invitee_email": "a@b.c"}]"#).unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].document_id, "DOC123");
        assert!(documents[0].document_name.is_empty());

        let err = parse_documents("{nope").unwrap_err();
        assert_eq!(err.to_string(), "Invalid JSON in documents");
    }
}
