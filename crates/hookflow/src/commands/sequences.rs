//! Sequences command - event-triggered sequences, manual runs and test runs.

use std::path::PathBuf;

use anyhow::{Context as _, Result, bail};
use clap::{Args, Subcommand};
use console::style;
use serde_json::json;
use tracing::warn;

use hookflow_client::{RecordId, ResourceStatus, SequenceRequest};
use hookflow_console::draft::{SequenceDraft, submit};
use hookflow_console::render;
use hookflow_console::status::resource_status_tone;
use hookflow_console::SequenceTestSession;

use super::import::{self, Resource};
use super::output::{self, tone_style};
use super::watch::{WatchOptions, watch};
use super::Context;

/// Arguments for the sequences command.
#[derive(Args, Debug)]
pub struct SequencesArgs {
    #[command(subcommand)]
    pub command: SequencesCommand,
}

#[derive(Subcommand, Debug)]
pub enum SequencesCommand {
    /// List sequences
    List,

    /// Show one sequence
    Show {
        /// Sequence ID
        id: RecordId,
    },

    /// Create a sequence
    Create(SequenceFields),

    /// Update a sequence
    Update {
        /// Sequence ID
        id: RecordId,

        #[command(flatten)]
        fields: SequenceFields,
    },

    /// Delete a sequence
    Delete {
        /// Sequence ID
        id: RecordId,
    },

    /// Activate or deactivate a sequence
    Toggle {
        /// Sequence ID
        id: RecordId,
    },

    /// Run an active sequence once with a test payload
    Execute {
        /// Sequence ID
        id: RecordId,
    },

    /// Show trigger endpoints and follow the latest test execution
    Test {
        /// Sequence ID
        id: RecordId,

        /// Polling interval in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Keep following after the execution finishes
        #[arg(long)]
        follow: bool,

        /// Exit after the first response
        #[arg(long)]
        once: bool,
    },

    /// Export a sequence as JSON
    Export {
        /// Sequence ID
        id: RecordId,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import a sequence from a JSON export
    Import {
        /// Export file
        file: PathBuf,

        /// Name to use if the original name is taken
        #[arg(long)]
        rename: Option<String>,
    },
}

/// Editable sequence fields.
#[derive(Args, Debug)]
pub struct SequenceFields {
    /// Sequence name
    #[arg(long)]
    pub name: Option<String>,

    /// Description
    #[arg(long)]
    pub description: Option<String>,

    /// Trigger event ID; repeat to select several. Replaces the current selection.
    #[arg(long = "trigger-event")]
    pub trigger_events: Vec<RecordId>,

    /// Trigger event version
    #[arg(long)]
    pub trigger_version: Option<String>,

    /// Create or leave the sequence inactive
    #[arg(long)]
    pub inactive: bool,
}

impl SequenceFields {
    fn apply(self, draft: &mut SequenceDraft) {
        if let Some(name) = self.name {
            draft.name = name;
        }
        if let Some(description) = self.description {
            draft.description = description;
        }
        if !self.trigger_events.is_empty() {
            draft.trigger_events.clear();
            for event in self.trigger_events {
                if !draft.trigger_events.contains(&event) {
                    draft.toggle_trigger_event(event);
                }
            }
        }
        if let Some(version) = self.trigger_version {
            draft.trigger_event_version = version;
        }
        if self.inactive {
            draft.status = ResourceStatus::Inactive;
        }
    }
}

/// Run the sequences command.
pub async fn run(args: SequencesArgs, ctx: &Context) -> Result<()> {
    match args.command {
        SequencesCommand::List => cmd_list(ctx).await,
        SequencesCommand::Show { id } => cmd_show(id, ctx).await,
        SequencesCommand::Create(fields) => cmd_save(None, fields, ctx).await,
        SequencesCommand::Update { id, fields } => cmd_save(Some(id), fields, ctx).await,
        SequencesCommand::Delete { id } => cmd_delete(id, ctx).await,
        SequencesCommand::Toggle { id } => cmd_toggle(id, ctx).await,
        SequencesCommand::Execute { id } => cmd_execute(id, ctx).await,
        SequencesCommand::Test {
            id,
            interval_ms,
            follow,
            once,
        } => cmd_test(id, interval_ms, follow, once, ctx).await,
        SequencesCommand::Export { id, output } => {
            import::export(Resource::Sequence, id, output, ctx).await
        }
        SequencesCommand::Import { file, rename } => {
            import::import(Resource::Sequence, &file, rename, ctx).await
        }
    }
}

async fn cmd_list(ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let sequences = client.sequences().list().await.context("Failed to load sequences")?;

    if ctx.json_output {
        return output::print_json(&sequences);
    }
    if sequences.is_empty() {
        output::dim("No sequences found");
        return Ok(());
    }

    output::heading("Sequences");
    for sequence in &sequences {
        let status =
            tone_style(resource_status_tone(sequence.status)).apply_to(sequence.status.label());
        let triggers = sequence
            .trigger_events
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        println!(
            "{:>5}  {:<32} {:<10} triggers: {}",
            style(sequence.id).cyan(),
            output::truncate(&sequence.name, 32),
            status,
            if triggers.is_empty() { "-".to_string() } else { triggers }
        );
    }
    Ok(())
}

async fn cmd_show(id: RecordId, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let sequence = client.sequences().get(id).await.context("Failed to load sequence")?;

    if ctx.json_output {
        return output::print_json(&sequence);
    }

    output::heading(&sequence.name);
    println!("  ID:             {}", sequence.id);
    println!("  Status:         {}", sequence.status.label());
    if !sequence.description.is_empty() {
        println!("  Description:    {}", sequence.description);
    }
    println!(
        "  Trigger:        {}",
        sequence.trigger_type.as_deref().unwrap_or("event")
    );
    println!("  Trigger events: {:?}", sequence.trigger_events);
    if let Some(version) = &sequence.trigger_event_version {
        println!("  Event version:  {}", version);
    }
    if let Some(created) = sequence.created_at {
        println!("  Created:        {}", render::format_timestamp(created));
    }
    Ok(())
}

async fn cmd_save(id: Option<RecordId>, fields: SequenceFields, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let mut draft = match id {
        Some(id) => SequenceDraft::from_sequence(
            &client.sequences().get(id).await.context("Failed to load sequence")?,
        ),
        None => SequenceDraft::new(),
    };
    fields.apply(&mut draft);

    let sequences = client.sequences();
    let saved = submit(&draft, |request: SequenceRequest| async move {
        match id {
            Some(id) => sequences.update(id, &request).await,
            None => sequences.create(&request).await,
        }
    })
    .await?;

    if ctx.json_output {
        output::print_json(&saved)
    } else {
        output::success(format!("Sequence \"{}\" saved (id {})", saved.name, saved.id));
        Ok(())
    }
}

async fn cmd_delete(id: RecordId, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    client
        .sequences()
        .delete(id)
        .await
        .map_err(|e| anyhow::anyhow!(e.display_message("Failed to delete sequence")))?;
    if !ctx.json_output {
        output::success(format!("Sequence {} deleted", id));
    }
    Ok(())
}

async fn cmd_toggle(id: RecordId, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let sequences = client.sequences();
    let before = sequences.get(id).await.context("Failed to load sequence")?;
    sequences
        .toggle_status(id)
        .await
        .map_err(|_| anyhow::anyhow!("Failed to update sequence status"))?;

    let verb = match before.status.toggled() {
        ResourceStatus::Active => "activated",
        ResourceStatus::Inactive => "deactivated",
    };
    if !ctx.json_output {
        output::success(format!("Sequence {} successfully!", verb));
    }
    Ok(())
}

async fn cmd_execute(id: RecordId, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let sequences = client.sequences();
    let sequence = sequences.get(id).await.context("Failed to load sequence")?;
    if sequence.status != ResourceStatus::Active {
        bail!("Sequence must be active to execute");
    }

    let payload = json!({
        "test": true,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });
    let response = match sequences.execute(id, &payload).await {
        Ok(response) => response,
        Err(e) => {
            warn!(sequence = id, error = %e, "execute request failed");
            bail!("Failed to execute sequence");
        }
    };

    if ctx.json_output {
        return output::print_json(&response);
    }
    if response.success {
        output::success(format!(
            "Sequence executed successfully! Execution ID: {}",
            response.execution_id.as_deref().unwrap_or("-")
        ));
        Ok(())
    } else {
        bail!(
            "Execution failed: {}",
            response.error.as_deref().unwrap_or("unknown error")
        )
    }
}

async fn cmd_test(
    id: RecordId,
    interval_ms: Option<u64>,
    follow: bool,
    once: bool,
    ctx: &Context,
) -> Result<()> {
    let client = ctx.client()?;
    let session = SequenceTestSession::open(&client, id, ctx.test_poll(interval_ms)).await;

    if !ctx.json_output {
        output::heading(&format!("Test sequence {}", id));
        if let Some(error) = session.error() {
            output::banner(error);
        }
        if let Some(info) = session.test_info() {
            if info.trigger_events.is_empty() {
                output::dim("No trigger events configured");
            }
            for trigger in &info.trigger_events {
                println!(
                    "  {} ({}): {}",
                    style(&trigger.event_name).bold(),
                    trigger.event_id,
                    style(&trigger.test_endpoint).cyan()
                );
            }
        }
        println!();
        output::dim("Send a payload to a trigger endpoint; the latest execution appears below.");
        println!();
    }

    let options = WatchOptions {
        exit_on_settle: !follow,
        once,
    };
    let result = watch(
        session.executions(),
        ctx,
        options,
        render::sequence_execution_lines,
    )
    .await;
    session.close().await;
    result
}
