//! Events command - webhook event definitions and test endpoints.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use console::style;

use hookflow_client::{EventRequest, RecordId, ResourceStatus};
use hookflow_console::draft::{EventDraft, submit};
use hookflow_console::render::{self, pretty_json};
use hookflow_console::status::resource_status_tone;
use hookflow_console::EventTestSession;

use super::import::{self, Resource};
use super::output::{self, tone_style};
use super::watch::{WatchOptions, watch};
use super::Context;

/// Arguments for the events command.
#[derive(Args, Debug)]
pub struct EventsArgs {
    #[command(subcommand)]
    pub command: EventsCommand,
}

#[derive(Subcommand, Debug)]
pub enum EventsCommand {
    /// List events
    List,

    /// Show one event
    Show {
        /// Event ID
        id: RecordId,
    },

    /// Create an event
    Create(EventFields),

    /// Update an event
    Update {
        /// Event ID
        id: RecordId,

        #[command(flatten)]
        fields: EventFields,
    },

    /// Create a copy named "<name> (Copy)"
    Duplicate {
        /// Event ID
        id: RecordId,
    },

    /// Delete an event
    Delete {
        /// Event ID
        id: RecordId,
    },

    /// Activate or deactivate an event
    Toggle {
        /// Event ID
        id: RecordId,
    },

    /// Show the test endpoint and follow payloads delivered to it
    Test {
        /// Event ID
        id: RecordId,

        /// Polling interval in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Exit after the first response
        #[arg(long)]
        once: bool,
    },

    /// Export an event as JSON
    Export {
        /// Event ID
        id: RecordId,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import an event from a JSON export
    Import {
        /// Export file
        file: PathBuf,

        /// Name to use if the original name is taken
        #[arg(long)]
        rename: Option<String>,
    },
}

/// Editable event fields. Unset flags keep the current (or default) value.
#[derive(Args, Debug)]
pub struct EventFields {
    /// Event name
    #[arg(long)]
    pub name: Option<String>,

    /// Description
    #[arg(long)]
    pub description: Option<String>,

    /// Event format as JSON text (blank means {})
    #[arg(long)]
    pub format: Option<String>,

    /// Send an acknowledgement response
    #[arg(long)]
    pub ack: Option<bool>,

    /// Acknowledgement type: basic or custom
    #[arg(long)]
    pub ack_type: Option<String>,

    /// Acknowledgement HTTP status code
    #[arg(long)]
    pub ack_status: Option<u16>,

    /// Custom acknowledgement payload as JSON text
    #[arg(long)]
    pub ack_payload: Option<String>,

    /// Create or leave the event inactive
    #[arg(long)]
    pub inactive: bool,
}

impl EventFields {
    fn apply(self, draft: &mut EventDraft) {
        if let Some(name) = self.name {
            draft.name = name;
        }
        if let Some(description) = self.description {
            draft.description = description;
        }
        if let Some(format) = self.format {
            draft.event_format.edit(format);
        }
        if let Some(ack) = self.ack {
            draft.acknowledgement_enabled = ack;
        }
        if let Some(ack_type) = self.ack_type {
            draft.acknowledgement_type = ack_type;
        }
        if let Some(status) = self.ack_status {
            draft.acknowledgement_status_code = status;
        }
        if let Some(payload) = self.ack_payload {
            draft.acknowledgement_payload.edit(payload);
        }
        if self.inactive {
            draft.status = ResourceStatus::Inactive;
        }
    }
}

/// Run the events command.
pub async fn run(args: EventsArgs, ctx: &Context) -> Result<()> {
    match args.command {
        EventsCommand::List => cmd_list(ctx).await,
        EventsCommand::Show { id } => cmd_show(id, ctx).await,
        EventsCommand::Create(fields) => cmd_save(None, fields, ctx).await,
        EventsCommand::Update { id, fields } => cmd_save(Some(id), fields, ctx).await,
        EventsCommand::Duplicate { id } => cmd_duplicate(id, ctx).await,
        EventsCommand::Delete { id } => cmd_delete(id, ctx).await,
        EventsCommand::Toggle { id } => cmd_toggle(id, ctx).await,
        EventsCommand::Test {
            id,
            interval_ms,
            once,
        } => cmd_test(id, interval_ms, once, ctx).await,
        EventsCommand::Export { id, output } => {
            import::export(Resource::Event, id, output, ctx).await
        }
        EventsCommand::Import { file, rename } => {
            import::import(Resource::Event, &file, rename, ctx).await
        }
    }
}

async fn cmd_list(ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let events = client.events().list().await.context("Failed to load events")?;

    if ctx.json_output {
        return output::print_json(&events);
    }
    if events.is_empty() {
        output::dim("No events found");
        return Ok(());
    }

    output::heading("Events");
    for event in &events {
        let status = tone_style(resource_status_tone(event.status)).apply_to(event.status.label());
        println!(
            "{:>5}  {:<32} {:<8} {}",
            style(event.id).cyan(),
            output::truncate(&event.name, 32),
            event.event_type,
            status
        );
    }
    Ok(())
}

async fn cmd_show(id: RecordId, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let event = client.events().get(id).await.context("Failed to load event")?;

    if ctx.json_output {
        return output::print_json(&event);
    }

    output::heading(&event.name);
    println!("  ID:          {}", event.id);
    println!("  Type:        {}", event.event_type);
    println!("  Status:      {}", event.status.label());
    if !event.description.is_empty() {
        println!("  Description: {}", event.description);
    }
    println!(
        "  Ack:         {}",
        if event.acknowledgement_enabled {
            format!("{} ({})", event.acknowledgement_type, event.acknowledgement_status_code)
        } else {
            "disabled".to_string()
        }
    );
    println!();
    println!("{}", style("Event format").bold());
    println!("{}", pretty_json(&event.event_format));
    Ok(())
}

async fn cmd_save(id: Option<RecordId>, fields: EventFields, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let mut draft = match id {
        Some(id) => EventDraft::from_event(&client.events().get(id).await.context("Failed to load event")?),
        None => EventDraft::new(),
    };
    fields.apply(&mut draft);

    let events = client.events();
    let saved = submit(&draft, |request: EventRequest| async move {
        match id {
            Some(id) => events.update(id, &request).await,
            None => events.create(&request).await,
        }
    })
    .await?;

    if ctx.json_output {
        output::print_json(&saved)
    } else {
        output::success(format!("Event \"{}\" saved (id {})", saved.name, saved.id));
        Ok(())
    }
}

async fn cmd_duplicate(id: RecordId, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let original = client.events().get(id).await.context("Failed to load event")?;
    let copy = client
        .events()
        .create(&EventRequest::duplicate_of(&original))
        .await
        .map_err(|e| anyhow::anyhow!(e.display_message("Failed to duplicate event")))?;

    if ctx.json_output {
        output::print_json(&copy)
    } else {
        output::success(format!("Event duplicated successfully! New id {}", copy.id));
        Ok(())
    }
}

async fn cmd_delete(id: RecordId, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    client
        .events()
        .delete(id)
        .await
        .map_err(|e| anyhow::anyhow!(e.display_message("Failed to delete event")))?;
    if !ctx.json_output {
        output::success(format!("Event {} deleted", id));
    }
    Ok(())
}

async fn cmd_toggle(id: RecordId, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let events = client.events();
    let before = events.get(id).await.context("Failed to load event")?;
    events
        .toggle_status(id)
        .await
        .map_err(|_| anyhow::anyhow!("Failed to update event status"))?;

    let verb = match before.status.toggled() {
        ResourceStatus::Active => "activated",
        ResourceStatus::Inactive => "deactivated",
    };
    if !ctx.json_output {
        output::success(format!("Event {} successfully!", verb));
    }
    Ok(())
}

async fn cmd_test(id: RecordId, interval_ms: Option<u64>, once: bool, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let session = EventTestSession::open(&client, id, ctx.test_poll(interval_ms)).await;

    if !ctx.json_output {
        output::heading(&format!("Test event {}", id));
        if let Some(error) = session.error() {
            output::banner(error);
        }
        if let Some(endpoint) = session.test_endpoint() {
            println!("Test endpoint: {}", style(endpoint).cyan());
        }
        if let Some(sample) = session.sample_payload() {
            println!();
            println!("{}", style("Sample payload").bold());
            println!("{}", pretty_json(sample));
        }
        println!();
        output::dim("Send a request to the endpoint; payloads appear below. Ctrl+C to stop.");
        println!();
    }

    let options = WatchOptions {
        exit_on_settle: false,
        once,
    };
    let result = watch(session.payloads(), ctx, options, render::test_payload_lines).await;
    session.close().await;
    result
}
