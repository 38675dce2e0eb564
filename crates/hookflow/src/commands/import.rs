//! Shared import/export handling for events and sequences.

use std::io::{BufRead, IsTerminal};
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result, bail};
use console::{Term, style};
use serde_json::Value;
use tracing::{debug, info};

use hookflow_client::{HookflowClient, RecordId, SuccessEnvelope};
use hookflow_console::render::missing_dependency_sections;
use hookflow_console::{ConflictPrompt, ImportDocument, ImportOutcome, import_with_resolution};

use super::Context;
use super::output;

/// Which resource an import or export targets.
#[derive(Debug, Clone, Copy)]
pub enum Resource {
    Event,
    Sequence,
}

impl Resource {
    fn label(self) -> &'static str {
        match self {
            Resource::Event => "Event",
            Resource::Sequence => "Sequence",
        }
    }

    async fn import(self, client: &HookflowClient, body: &Value) -> hookflow_client::Result<SuccessEnvelope> {
        match self {
            Resource::Event => client.events().import(body).await,
            Resource::Sequence => client.sequences().import(body).await,
        }
    }

    async fn export(self, client: &HookflowClient, id: RecordId) -> hookflow_client::Result<Value> {
        match self {
            Resource::Event => client.events().export(id).await,
            Resource::Sequence => client.sequences().export(id).await,
        }
    }
}

/// Write an export document to `output` or stdout.
pub async fn export(resource: Resource, id: RecordId, output: Option<PathBuf>, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let document = resource
        .export(&client, id)
        .await
        .with_context(|| format!("Failed to export {}", resource.label().to_lowercase()))?;

    match output {
        Some(path) => {
            std::fs::write(&path, serde_json::to_string_pretty(&document)?)
                .with_context(|| format!("writing {}", path.display()))?;
            if !ctx.json_output {
                output::success(format!("{} exported to {}", resource.label(), path.display()));
            }
        }
        None => output::print_json(&document)?,
    }
    Ok(())
}

/// Import a document, prompting for a new name on conflicts.
///
/// `rename` answers the first conflict without prompting. Further conflicts
/// prompt when stdin is a terminal and cancel otherwise.
pub async fn import(resource: Resource, file: &Path, rename: Option<String>, ctx: &Context) -> Result<()> {
    let text = std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let document = ImportDocument::from_text(&text)?;
    if ctx.verbose {
        output::dim(document.preview());
    }

    let client = ctx.client()?;
    let mut preset = rename;
    let interactive = std::io::stdin().is_terminal();

    let outcome = import_with_resolution(
        &document,
        |body| {
            let client = client.clone();
            async move { resource.import(&client, &body).await }
        },
        |prompt| {
            let preset = preset.take();
            async move {
                match preset {
                    Some(name) if prompt.error.is_none() => Some(name),
                    _ if interactive => ask_for_name(prompt).await,
                    _ => None,
                }
            }
        },
    )
    .await;

    report(resource, outcome, ctx)
}

/// Prompt on the terminal for a replacement name.
///
/// A blank answer is passed on so the resolution loop re-asks with
/// `Name cannot be empty`. End of input (Ctrl+D) or a terminal error cancels.
async fn ask_for_name(prompt: ConflictPrompt) -> Option<String> {
    let answer = tokio::task::spawn_blocking(move || {
        let term = Term::stderr();
        if let Some(error) = &prompt.error {
            term.write_line(&format!("{} {}", style("Error:").red(), error))?;
        } else {
            term.write_line(&format!(
                "{} {}",
                style("Name conflict:").yellow(),
                prompt.details.message
            ))?;
        }
        let suggestion = prompt
            .details
            .original_name
            .as_deref()
            .map(|name| format!(" (was \"{}\")", name))
            .unwrap_or_default();
        term.write_str(&format!("New name{} (Ctrl+D to cancel): ", suggestion))?;
        read_name(&mut std::io::stdin().lock())
    })
    .await;

    match answer {
        Ok(Ok(name)) => name,
        Ok(Err(e)) => {
            debug!(error = %e, "rename prompt failed");
            None
        }
        Err(e) => {
            debug!(error = %e, "rename prompt task failed");
            None
        }
    }
}

/// One answer line without its line ending. `None` at end of input.
fn read_name(input: &mut impl BufRead) -> std::io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

fn report(resource: Resource, outcome: ImportOutcome, ctx: &Context) -> Result<()> {
    match outcome {
        ImportOutcome::Imported(envelope) => {
            info!(resource = resource.label(), "import succeeded");
            if ctx.json_output {
                output::print_json(&envelope)?;
            } else {
                output::success(format!("{} imported successfully", resource.label()));
            }
            Ok(())
        }
        ImportOutcome::NameConflict(details) => {
            bail!("Import cancelled: {}", details.message)
        }
        ImportOutcome::MissingDependencies(deps) => {
            if ctx.json_output {
                output::print_json(&deps)?;
            } else {
                output::heading("Missing Dependencies");
                if !deps.message.is_empty() {
                    println!("{}", deps.message);
                }
                for (section, entries) in missing_dependency_sections(&deps) {
                    println!();
                    println!("{}", style(section).bold());
                    for entry in entries {
                        println!("  • {}", entry);
                    }
                }
                println!();
                output::dim("Create or import the missing records, then retry.");
            }
            bail!("Import failed: missing dependencies ({})", deps.summary())
        }
        ImportOutcome::Failed(message) => bail!(message),
    }
}
