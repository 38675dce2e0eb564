//! Config command - client contexts and polling defaults.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};
use serde_json::json;

use hookflow_config::{self, AuthConfig, Context as ClientContext};

use super::output;

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the client configuration
    Show,

    /// Show configuration file path
    Path,

    /// Show the current context name
    CurrentContext,

    /// List available contexts
    GetContexts,

    /// Switch to a different context
    UseContext {
        /// Context name to switch to
        name: String,
    },

    /// Create or update a context
    SetContext {
        /// Context name
        name: String,

        /// API root (e.g., http://localhost:8000/api/)
        #[arg(long)]
        server: Option<String>,

        /// Request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Read a bearer token from this environment variable
        #[arg(long, conflicts_with = "api_key_file")]
        token_env: Option<String>,

        /// Read an API key from this file
        #[arg(long)]
        api_key_file: Option<PathBuf>,
    },

    /// Delete a context
    DeleteContext {
        /// Context name to delete
        name: String,
    },
}

/// Run the config command.
pub async fn run(args: ConfigArgs, json_output: bool) -> Result<()> {
    match args.command {
        ConfigCommand::Show => cmd_show(json_output),
        ConfigCommand::Path => cmd_path(),
        ConfigCommand::CurrentContext => cmd_current_context(json_output),
        ConfigCommand::GetContexts => cmd_get_contexts(json_output),
        ConfigCommand::UseContext { name } => cmd_use_context(&name),
        ConfigCommand::SetContext {
            name,
            server,
            timeout,
            token_env,
            api_key_file,
        } => {
            let auth = match (token_env, api_key_file) {
                (Some(var), _) => Some(AuthConfig::bearer_env(var)),
                (None, Some(path)) => Some(AuthConfig::api_key_file(path)),
                (None, None) => None,
            };
            cmd_set_context(&name, server, timeout, auth)
        }
        ConfigCommand::DeleteContext { name } => cmd_delete_context(&name),
    }
}

fn cmd_show(json_output: bool) -> Result<()> {
    let config = hookflow_config::load_client_config()?;
    if json_output {
        return output::print_json(&config);
    }
    print!("{}", config.to_yaml()?);
    Ok(())
}

fn cmd_path() -> Result<()> {
    match hookflow_config::client_config_path() {
        Some(path) => println!("{}", path.display()),
        None => eprintln!("Could not determine config directory"),
    }
    Ok(())
}

fn cmd_current_context(json_output: bool) -> Result<()> {
    let config = hookflow_config::load_client_config()?;

    if json_output {
        return output::print_json(&json!({ "current_context": config.current_context }));
    }
    match &config.current_context {
        Some(name) => println!("{}", name),
        None => println!(
            "No current context set. Use 'hookflow config use-context <name>' to set one."
        ),
    }
    Ok(())
}

fn cmd_get_contexts(json_output: bool) -> Result<()> {
    let config = hookflow_config::load_client_config()?;

    if json_output {
        return output::print_json(&config.contexts);
    }
    if config.contexts.is_empty() {
        println!("No contexts configured.");
        println!();
        println!("Create one with:");
        println!("  hookflow config set-context local --server=http://localhost:8000/api/");
        return Ok(());
    }

    let current = config.current_context.as_deref();

    println!("CURRENT   NAME            SERVER");
    for ctx in &config.contexts {
        let marker = if current == Some(ctx.name.as_str()) {
            "*"
        } else {
            " "
        };
        println!("{}         {:<15} {}", marker, ctx.name, ctx.server);
    }
    Ok(())
}

fn cmd_use_context(name: &str) -> Result<()> {
    let mut config = hookflow_config::load_client_config()?;

    config.use_context(name)?;
    hookflow_config::save_client_config(&config)?;

    println!("Switched to context \"{}\".", name);
    Ok(())
}

fn cmd_set_context(
    name: &str,
    server: Option<String>,
    timeout: Option<u64>,
    auth: Option<AuthConfig>,
) -> Result<()> {
    let mut config = hookflow_config::load_client_config()?;

    match config.get_context_mut(name) {
        Some(ctx) => {
            if let Some(url) = server {
                ctx.server = url;
            }
            if let Some(t) = timeout {
                ctx.timeout = Some(t);
            }
            if auth.is_some() {
                ctx.auth = auth;
            }
            println!("Context \"{}\" modified.", name);
        }
        None => {
            // Creating a new context requires a server
            let server_url = server
                .ok_or_else(|| anyhow::anyhow!("--server is required when creating a new context"))?;

            let mut ctx = ClientContext::new(name, server_url);
            if let Some(t) = timeout {
                ctx = ctx.with_timeout(t);
            }
            if let Some(auth) = auth {
                ctx = ctx.with_auth(auth);
            }
            config.set_context(ctx);
            println!("Context \"{}\" created.", name);
        }
    }

    // The first context becomes current
    if config.current_context.is_none() && config.contexts.len() == 1 {
        config.current_context = Some(name.to_string());
        println!("Context \"{}\" set as current context.", name);
    }

    hookflow_config::save_client_config(&config)?;
    Ok(())
}

fn cmd_delete_context(name: &str) -> Result<()> {
    let mut config = hookflow_config::load_client_config()?;

    match config.remove_context(name) {
        Some(_) => {
            hookflow_config::save_client_config(&config)?;
            println!("Context \"{}\" deleted.", name);
            if config.current_context.is_none() {
                println!(
                    "Note: No current context. Use 'hookflow config use-context <name>' to set one."
                );
            }
        }
        None => println!("Context \"{}\" not found.", name),
    }
    Ok(())
}
