//! Executions command - monitor async action executions.

use anyhow::{Context as _, Result, bail};
use clap::{Args, Subcommand};
use console::style;

use hookflow_client::{
    AsyncExecution, AsyncExecutionStats, ExecutionStatus, ListAsyncExecutionsQuery, RecordId,
};
use hookflow_console::render::{async_execution_detail_lines, async_execution_row};
use hookflow_console::status::success_rate_tone;
use hookflow_console::{
    DetailFetcher, DetailState, Display, ExecutionsMonitor, ExecutionsOverview, status_style,
};

use super::output::{self, status_badge, tone_style};
use super::watch::{WatchOptions, watch};
use super::Context;

const COLUMNS: [&str; 6] = ["EXECUTION", "TYPE", "STATUS", "ATTEMPTS", "DURATION", "CREATED"];

/// Arguments for the executions command.
#[derive(Args, Debug)]
pub struct ExecutionsArgs {
    #[command(subcommand)]
    pub command: ExecutionsCommand,
}

#[derive(Subcommand, Debug)]
pub enum ExecutionsCommand {
    /// List async executions
    List(FilterArgs),

    /// Show aggregate counters and success rate
    Stats {
        /// Only count executions of this workflow execution
        #[arg(long)]
        workflow_execution: Option<RecordId>,
    },

    /// Show one execution with its responses
    Show {
        /// Execution record ID
        id: RecordId,
    },

    /// Follow executions until none are active
    Watch {
        #[command(flatten)]
        filter: FilterArgs,

        /// Polling interval in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Keep refreshing after every execution has finished
        #[arg(long)]
        follow: bool,
    },
}

#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// Filter by status (pending, initiated, polling, running, completed, failed, timeout, cancelled)
    #[arg(long)]
    pub status: Option<ExecutionStatus>,

    /// Filter by workflow execution
    #[arg(long)]
    pub workflow_execution: Option<RecordId>,

    /// Filter by action
    #[arg(long)]
    pub action: Option<RecordId>,
}

impl FilterArgs {
    fn query(&self) -> ListAsyncExecutionsQuery {
        ListAsyncExecutionsQuery {
            workflow_execution_id: self.workflow_execution,
            status: self.status,
            action_id: self.action,
        }
    }
}

/// Run the executions command.
pub async fn run(args: ExecutionsArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ExecutionsCommand::List(filter) => cmd_list(&filter, ctx).await,
        ExecutionsCommand::Stats { workflow_execution } => cmd_stats(workflow_execution, ctx).await,
        ExecutionsCommand::Show { id } => cmd_show(id, ctx).await,
        ExecutionsCommand::Watch {
            filter,
            interval_ms,
            follow,
        } => cmd_watch(&filter, interval_ms, follow, ctx).await,
    }
}

async fn cmd_list(filter: &FilterArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let spinner = output::spinner("Loading executions...", ctx.json_output);
    let result = client.async_executions().list(&filter.query()).await;
    spinner.finish_and_clear();
    let executions = result.context("Failed to load async executions")?;

    if ctx.json_output {
        return output::print_json(&executions);
    }
    for line in table_lines(&executions) {
        println!("{}", line);
    }
    Ok(())
}

async fn cmd_stats(workflow_execution: Option<RecordId>, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let stats = client
        .async_executions()
        .stats(workflow_execution)
        .await
        .context("Failed to load execution stats")?;

    if ctx.json_output {
        return output::print_json(&stats);
    }
    output::heading("Async executions");
    for line in stats_lines(&stats) {
        println!("{}", line);
    }
    Ok(())
}

async fn cmd_show(id: RecordId, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let api = client.async_executions();
    let details = DetailFetcher::new();
    details
        .load(id, || api.status(id), "Failed to load execution details")
        .await;

    match details.state() {
        DetailState::Loaded { value, .. } => {
            if ctx.json_output {
                return output::print_json(&value);
            }
            output::heading(&format!("Execution {}", value.id));
            println!("  {}", status_badge(value.status));
            for line in async_execution_detail_lines(&value) {
                println!("{}", line);
            }
            Ok(())
        }
        DetailState::Failed { message, .. } => bail!(message),
        DetailState::Idle | DetailState::Loading { .. } => bail!("Failed to load execution details"),
    }
}

async fn cmd_watch(
    filter: &FilterArgs,
    interval_ms: Option<u64>,
    follow: bool,
    ctx: &Context,
) -> Result<()> {
    let client = ctx.client()?;
    let monitor = ExecutionsMonitor::open(&client, filter.query(), ctx.executions_poll(interval_ms));

    let options = WatchOptions {
        exit_on_settle: !follow,
        once: false,
    };
    let result = watch(monitor.overview(), ctx, options, overview_lines).await;
    monitor.close().await;
    result
}

fn overview_lines(display: &Display<ExecutionsOverview>) -> Vec<String> {
    match display {
        Display::Loading => vec!["Loading executions...".to_string()],
        Display::NoData => vec!["No async executions found".to_string()],
        Display::Snapshot(overview) => {
            let mut lines = stats_lines(&overview.stats);
            lines.push(String::new());
            lines.extend(table_lines(&overview.executions));
            lines
        }
    }
}

fn stats_lines(stats: &AsyncExecutionStats) -> Vec<String> {
    let rate = tone_style(success_rate_tone(stats.success_rate))
        .apply_to(format!("{:.1}%", stats.success_rate));
    vec![
        format!(
            "Total: {}  Completed: {}  Failed: {}  Polling: {}  Timeout: {}",
            stats.total_executions, stats.completed, stats.failed, stats.polling, stats.timeout
        ),
        format!("Success rate: {}", rate),
    ]
}

fn table_lines(executions: &[AsyncExecution]) -> Vec<String> {
    if executions.is_empty() {
        return vec!["No async executions found".to_string()];
    }

    let mut lines = vec![
        style(format!(
            "{:<12} {:<12} {:<14} {:>8}  {:<9} {}",
            COLUMNS[0], COLUMNS[1], COLUMNS[2], COLUMNS[3], COLUMNS[4], COLUMNS[5]
        ))
        .dim()
        .to_string(),
    ];
    for execution in executions {
        let [id, kind, _, attempts, duration, created] = async_execution_row(execution);
        // Pad before styling so escape codes do not skew the columns
        let badge_style = status_style(execution.status);
        let badge = tone_style(badge_style.tone)
            .apply_to(format!("{:<14}", format!("{} {}", badge_style.glyph, execution.status)));
        lines.push(format!(
            "{:<12} {:<12} {} {:>8}  {:<9} {}",
            id, kind, badge, attempts, duration, created
        ));
    }
    lines
}
