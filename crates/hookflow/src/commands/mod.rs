//! CLI command handlers.

pub mod actions;
pub mod config;
pub mod events;
pub mod executions;
pub mod import;
pub mod output;
pub mod sequences;
pub mod watch;
pub mod workflows;

use std::time::Duration;

use anyhow::{Context as _, Result};
use tracing::debug;

use hookflow_client::{DEFAULT_BASE_URL, HookflowClient};
use hookflow_config::{ClientConfig, PollingDefaults};
use hookflow_console::{PollConfig, TerminalPolicy};

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// API root to connect to.
    pub server_url: String,
    /// Bearer credential from the selected context.
    pub auth_token: Option<String>,
    /// Request timeout.
    pub timeout: Duration,
    /// Polling intervals and terminal policy.
    pub polling: PollingDefaults,
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
}

impl Context {
    /// Resolve the server from flags and `client.yaml`.
    ///
    /// Precedence: `--server` (or `HOOKFLOW_SERVER_URL`), then `--context`,
    /// then the current context, then the local default.
    pub fn resolve(
        server: Option<String>,
        context: Option<&str>,
        json_output: bool,
        verbose: bool,
    ) -> Result<Self> {
        let config = hookflow_config::load_client_config().context("loading client config")?;
        Self::from_config(&config, server, context, json_output, verbose)
    }

    fn from_config(
        config: &ClientConfig,
        server: Option<String>,
        context: Option<&str>,
        json_output: bool,
        verbose: bool,
    ) -> Result<Self> {
        let selected = match context {
            Some(name) => Some(
                config
                    .get_context(name)
                    .ok_or_else(|| anyhow::anyhow!("context '{}' not found", name))?,
            ),
            None => config.current(),
        };

        let server_url = server
            .or_else(|| selected.map(|c| c.server.clone()))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let auth_token = match selected {
            Some(ctx) => ctx.resolve_token()?,
            None => None,
        };
        debug!(server = %server_url, context = ?selected.map(|c| &c.name), "resolved server");

        Ok(Self {
            server_url,
            auth_token,
            timeout: config.timeout_for(selected),
            polling: config.defaults.polling.clone(),
            json_output,
            verbose,
        })
    }

    /// Build an API client for this context.
    pub fn client(&self) -> Result<HookflowClient> {
        let mut builder = HookflowClient::builder()
            .base_url(&self.server_url)
            .timeout(self.timeout);
        if let Some(token) = &self.auth_token {
            builder = builder.auth_token(token);
        }
        builder
            .build()
            .with_context(|| format!("invalid server URL '{}'", self.server_url))
    }

    fn terminal_policy(&self) -> TerminalPolicy {
        if self.polling.stop_on_terminal {
            TerminalPolicy::StopOnTerminal
        } else {
            TerminalPolicy::Continuous
        }
    }

    /// Polling for event test payloads and sequence test runs.
    pub fn test_poll(&self, interval_ms: Option<u64>) -> PollConfig {
        let interval = interval_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| self.polling.test_payload_interval());
        PollConfig::every(interval).with_policy(self.terminal_policy())
    }

    /// Polling for the async execution monitor.
    pub fn executions_poll(&self, interval_ms: Option<u64>) -> PollConfig {
        let interval = interval_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| self.polling.executions_interval());
        PollConfig::every(interval).with_policy(self.terminal_policy())
    }
}
