//! Actions command - outbound HTTP calls owned by connectors.

use anyhow::{Context as _, Result, bail};
use clap::{Args, Subcommand};
use console::style;
use serde_json::Value;

use hookflow_client::{ActionRequest, ListActionsQuery, RecordId};
use hookflow_console::draft::{ActionDraft, KeyValueEditor, submit};
use hookflow_console::render::pretty_json;

use super::output;
use super::Context;

/// Arguments for the actions command.
#[derive(Args, Debug)]
pub struct ActionsArgs {
    #[command(subcommand)]
    pub command: ActionsCommand,
}

#[derive(Subcommand, Debug)]
pub enum ActionsCommand {
    /// List actions
    List {
        /// Only actions of this connector
        #[arg(long)]
        connector: Option<RecordId>,
    },

    /// Show one action
    Show {
        /// Action ID
        id: RecordId,
    },

    /// Create an action under a connector
    Create {
        /// Owning connector ID
        #[arg(long)]
        connector: RecordId,

        #[command(flatten)]
        fields: ActionFields,
    },

    /// Update an action
    Update {
        /// Action ID
        id: RecordId,

        #[command(flatten)]
        fields: ActionFields,
    },

    /// Delete an action
    Delete {
        /// Action ID
        id: RecordId,
    },

    /// Call an action once and print the result
    Test {
        /// Action ID
        id: RecordId,

        /// Override values as JSON text
        #[arg(long)]
        data: Option<String>,
    },
}

/// Editable action fields.
#[derive(Args, Debug)]
pub struct ActionFields {
    /// Action name
    #[arg(long)]
    pub name: Option<String>,

    /// Description
    #[arg(long)]
    pub description: Option<String>,

    /// HTTP method
    #[arg(long)]
    pub method: Option<String>,

    /// Path appended to the connector base URL
    #[arg(long)]
    pub path: Option<String>,

    /// Header as KEY=VALUE; repeat for several. Replaces the current headers.
    #[arg(long = "header", value_parser = parse_key_value)]
    pub headers: Vec<(String, String)>,

    /// Query parameter as KEY=VALUE; repeat for several. Replaces the current parameters.
    #[arg(long = "query", value_parser = parse_key_value)]
    pub query_params: Vec<(String, String)>,

    /// Request body as JSON text
    #[arg(long)]
    pub body: Option<String>,
}

fn parse_key_value(s: &str) -> std::result::Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))
}

fn editor_from(pairs: Vec<(String, String)>) -> KeyValueEditor {
    let mut editor = KeyValueEditor::new();
    for (key, value) in pairs {
        editor.push(key, value);
    }
    editor
}

impl ActionFields {
    fn apply(self, draft: &mut ActionDraft) {
        if let Some(name) = self.name {
            draft.name = name;
        }
        if let Some(description) = self.description {
            draft.description = description;
        }
        if let Some(method) = self.method {
            draft.http_method = method;
        }
        if let Some(path) = self.path {
            draft.endpoint_path = path;
        }
        if !self.headers.is_empty() {
            draft.headers = editor_from(self.headers);
        }
        if !self.query_params.is_empty() {
            draft.query_params = editor_from(self.query_params);
        }
        if let Some(body) = self.body {
            draft.request_body.edit(body);
        }
    }
}

/// Run the actions command.
pub async fn run(args: ActionsArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ActionsCommand::List { connector } => cmd_list(connector, ctx).await,
        ActionsCommand::Show { id } => cmd_show(id, ctx).await,
        ActionsCommand::Create { connector, fields } => {
            let mut draft = ActionDraft::new(connector);
            fields.apply(&mut draft);
            cmd_save(None, draft, ctx).await
        }
        ActionsCommand::Update { id, fields } => {
            let client = ctx.client()?;
            let action = client.actions().get(id).await.context("Failed to load action")?;
            let mut draft = ActionDraft::from_action(&action);
            fields.apply(&mut draft);
            cmd_save(Some(id), draft, ctx).await
        }
        ActionsCommand::Delete { id } => cmd_delete(id, ctx).await,
        ActionsCommand::Test { id, data } => cmd_test(id, data, ctx).await,
    }
}

async fn cmd_list(connector: Option<RecordId>, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let actions = client
        .actions()
        .list(ListActionsQuery {
            connector_id: connector,
        })
        .await
        .context("Failed to load actions")?;

    if ctx.json_output {
        return output::print_json(&actions);
    }
    if actions.is_empty() {
        output::dim("No actions found");
        return Ok(());
    }

    output::heading("Actions");
    for action in &actions {
        println!(
            "{:>5}  {:<28} {:<7} {}",
            style(action.id).cyan(),
            output::truncate(&action.name, 28),
            action.http_method,
            style(&action.endpoint_path).dim()
        );
    }
    Ok(())
}

async fn cmd_show(id: RecordId, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let action = client.actions().get(id).await.context("Failed to load action")?;

    if ctx.json_output {
        return output::print_json(&action);
    }

    output::heading(&action.name);
    println!("  ID:        {}", action.id);
    println!("  Connector: {}", action.connector);
    println!("  Request:   {} {}", action.http_method, action.endpoint_path);
    if !action.description.is_empty() {
        println!("  Description: {}", action.description);
    }
    for (title, map) in [("Headers", &action.headers), ("Query parameters", &action.query_params)] {
        if map.is_empty() {
            continue;
        }
        println!();
        println!("{}", style(title).bold());
        for (key, value) in map {
            println!("  {}: {}", key, value);
        }
    }
    println!();
    println!("{}", style("Request body").bold());
    println!("{}", pretty_json(&action.request_body));
    Ok(())
}

async fn cmd_save(id: Option<RecordId>, draft: ActionDraft, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let actions = client.actions();
    let saved = submit(&draft, |request: ActionRequest| async move {
        match id {
            Some(id) => actions.update(id, &request).await,
            None => actions.create(&request).await,
        }
    })
    .await?;

    if ctx.json_output {
        output::print_json(&saved)
    } else {
        output::success(format!("Action \"{}\" saved (id {})", saved.name, saved.id));
        Ok(())
    }
}

async fn cmd_delete(id: RecordId, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    client
        .actions()
        .delete(id)
        .await
        .map_err(|e| anyhow::anyhow!(e.display_message("Failed to delete action")))?;
    if !ctx.json_output {
        output::success(format!("Action {} deleted", id));
    }
    Ok(())
}

async fn cmd_test(id: RecordId, data: Option<String>, ctx: &Context) -> Result<()> {
    let overrides: Value = match data.as_deref().map(str::trim) {
        None | Some("") => Value::Object(Default::default()),
        Some(text) => match serde_json::from_str(text) {
            Ok(value) => value,
            Err(_) => bail!("Invalid JSON in test data"),
        },
    };

    let client = ctx.client()?;
    let spinner = output::spinner("Calling action...", ctx.json_output);
    let result = client.actions().test(id, &overrides).await;
    spinner.finish_and_clear();
    let result = result.map_err(|e| anyhow::anyhow!(e.display_message("Action test failed")))?;

    if ctx.json_output {
        output::print_json(&result)
    } else {
        println!("{}", pretty_json(&result));
        Ok(())
    }
}
