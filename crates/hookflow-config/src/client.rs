//! Client configuration for connecting to hookflow servers.
//!
//! Implements a kubeconfig-style configuration with named contexts:
//!
//! ```yaml
//! api-version: v1
//! kind: ClientConfig
//!
//! current-context: local
//!
//! contexts:
//!   - name: local
//!     server: http://localhost:8000/api
//!   - name: staging
//!     server: https://hooks.staging.example.com/api
//!     auth:
//!       type: bearer
//!       token-env: HOOKFLOW_STAGING_TOKEN
//!
//! defaults:
//!   timeout: 30
//!   polling:
//!     test-payload-ms: 2000
//!     executions-ms: 5000
//!     stop-on-terminal: true
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Client Config
// ─────────────────────────────────────────────────────────────────────────────

/// API version for the client config file format.
pub const API_VERSION: &str = "v1";

/// Kind identifier for client config files.
pub const KIND: &str = "ClientConfig";

/// Default config filename.
const CLIENT_CONFIG_FILE: &str = "client.yaml";

/// Shortest polling interval accepted from config.
pub const MIN_POLL_INTERVAL_MS: u64 = 250;

/// Root client configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClientConfig {
    /// API version (always "v1" currently).
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Config kind (always "ClientConfig").
    #[serde(default = "default_kind")]
    pub kind: String,

    /// Name of the current/default context.
    #[serde(default)]
    pub current_context: Option<String>,

    /// Named connection contexts.
    #[serde(default)]
    pub contexts: Vec<Context>,

    /// Default settings applied to all contexts.
    #[serde(default)]
    pub defaults: ClientDefaults,
}

fn default_api_version() -> String {
    API_VERSION.to_string()
}

fn default_kind() -> String {
    KIND.to_string()
}

impl ClientConfig {
    /// Create an empty client config.
    pub fn new() -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            ..Default::default()
        }
    }

    /// Parse from a YAML string and validate it.
    pub fn from_yaml(yaml_str: &str) -> Result<Self> {
        let config: Self =
            serde_yaml::from_str(yaml_str).map_err(|e| ConfigError::ParseYaml(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to a YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::ParseYaml(e.to_string()))
    }

    /// Reject settings the console cannot run with.
    pub fn validate(&self) -> Result<()> {
        self.defaults.polling.validate()
    }

    /// Get the current context, if set and valid.
    pub fn current(&self) -> Option<&Context> {
        self.current_context
            .as_ref()
            .and_then(|name| self.get_context(name))
    }

    /// Get a context by name.
    pub fn get_context(&self, name: &str) -> Option<&Context> {
        self.contexts.iter().find(|c| c.name == name)
    }

    /// Get a mutable context by name.
    pub fn get_context_mut(&mut self, name: &str) -> Option<&mut Context> {
        self.contexts.iter_mut().find(|c| c.name == name)
    }

    /// Add or update a context.
    pub fn set_context(&mut self, context: Context) {
        if let Some(existing) = self.get_context_mut(&context.name) {
            *existing = context;
        } else {
            self.contexts.push(context);
        }
    }

    /// Remove a context by name.
    pub fn remove_context(&mut self, name: &str) -> Option<Context> {
        let pos = self.contexts.iter().position(|c| c.name == name)?;
        if self.current_context.as_deref() == Some(name) {
            self.current_context = None;
        }
        Some(self.contexts.remove(pos))
    }

    /// Set the current context by name.
    ///
    /// Returns an error if the context doesn't exist.
    pub fn use_context(&mut self, name: &str) -> Result<()> {
        if self.get_context(name).is_some() {
            self.current_context = Some(name.to_string());
            Ok(())
        } else {
            Err(ConfigError::ContextNotFound(name.to_string()))
        }
    }

    /// List all context names.
    pub fn context_names(&self) -> Vec<&str> {
        self.contexts.iter().map(|c| c.name.as_str()).collect()
    }

    /// Get the server URL for the current context.
    pub fn current_server_url(&self) -> Option<String> {
        self.current().map(|c| c.server.clone())
    }

    /// Request timeout for a context, falling back to the defaults.
    pub fn timeout_for(&self, context: Option<&Context>) -> Duration {
        let secs = context
            .and_then(|c| c.timeout)
            .unwrap_or(self.defaults.timeout);
        Duration::from_secs(secs)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Context
// ─────────────────────────────────────────────────────────────────────────────

/// A named connection context (server + auth bundle).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Context {
    /// Unique name for this context.
    pub name: String,

    /// API root (e.g., "http://localhost:8000/api").
    pub server: String,

    /// Authentication configuration.
    #[serde(default)]
    pub auth: Option<AuthConfig>,

    /// Request timeout override (seconds).
    #[serde(default)]
    pub timeout: Option<u64>,
}

impl Context {
    /// Create a new context with just a name and server URL.
    pub fn new(name: impl Into<String>, server: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            server: server.into(),
            auth: None,
            timeout: None,
        }
    }

    /// Set the auth configuration.
    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: u64) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Resolve the credential for this context, if any.
    pub fn resolve_token(&self) -> Result<Option<String>> {
        match &self.auth {
            Some(auth) => auth.resolve(),
            None => Ok(None),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Authentication
// ─────────────────────────────────────────────────────────────────────────────

/// Authentication configuration for a context.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum AuthConfig {
    /// No authentication.
    None,

    /// API key authentication.
    #[serde(rename_all = "kebab-case")]
    ApiKey {
        /// Path to file containing the API key.
        key_file: Option<PathBuf>,
        /// Environment variable containing the API key.
        key_env: Option<String>,
    },

    /// Bearer token authentication.
    #[serde(rename_all = "kebab-case")]
    Bearer {
        /// Path to file containing the bearer token.
        token_file: Option<PathBuf>,
        /// Environment variable containing the token.
        token_env: Option<String>,
    },
}

impl AuthConfig {
    /// Create API key auth referencing a file.
    pub fn api_key_file(path: impl Into<PathBuf>) -> Self {
        Self::ApiKey {
            key_file: Some(path.into()),
            key_env: None,
        }
    }

    /// Create API key auth referencing an environment variable.
    pub fn api_key_env(var: impl Into<String>) -> Self {
        Self::ApiKey {
            key_file: None,
            key_env: Some(var.into()),
        }
    }

    /// Create bearer auth referencing an environment variable.
    pub fn bearer_env(var: impl Into<String>) -> Self {
        Self::Bearer {
            token_file: None,
            token_env: Some(var.into()),
        }
    }

    /// Resolve the actual credential value.
    ///
    /// The file wins over the environment variable when both are set.
    pub fn resolve(&self) -> Result<Option<String>> {
        let (file, env) = match self {
            AuthConfig::None => return Ok(None),
            AuthConfig::ApiKey { key_file, key_env } => (key_file, key_env),
            AuthConfig::Bearer {
                token_file,
                token_env,
            } => (token_file, token_env),
        };

        if let Some(path) = file {
            let expanded = expand_path(path);
            if expanded.exists() {
                let secret = std::fs::read_to_string(&expanded)
                    .map_err(|e| ConfigError::ReadFile {
                        path: expanded.display().to_string(),
                        source: e,
                    })?
                    .trim()
                    .to_string();
                return Ok(Some(secret));
            }
        }
        if let Some(var) = env
            && let Ok(secret) = std::env::var(var)
        {
            return Ok(Some(secret));
        }
        Ok(None)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Defaults
// ─────────────────────────────────────────────────────────────────────────────

/// Default settings applied to all contexts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ClientDefaults {
    /// Default request timeout in seconds.
    pub timeout: u64,

    /// Status polling settings.
    pub polling: PollingDefaults,
}

impl Default for ClientDefaults {
    fn default() -> Self {
        Self {
            timeout: 30,
            polling: PollingDefaults::default(),
        }
    }
}

/// How often the console refreshes status views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PollingDefaults {
    /// Interval for event test-payload and sequence test-status views.
    pub test_payload_ms: u64,

    /// Interval for the async executions view.
    pub executions_ms: u64,

    /// Stop refreshing once an execution reaches a terminal state.
    pub stop_on_terminal: bool,
}

impl Default for PollingDefaults {
    fn default() -> Self {
        Self {
            test_payload_ms: 2000,
            executions_ms: 5000,
            stop_on_terminal: true,
        }
    }
}

impl PollingDefaults {
    /// Interval for test-payload and test-status views.
    pub fn test_payload_interval(&self) -> Duration {
        Duration::from_millis(self.test_payload_ms)
    }

    /// Interval for the async executions view.
    pub fn executions_interval(&self) -> Duration {
        Duration::from_millis(self.executions_ms)
    }

    fn validate(&self) -> Result<()> {
        for (name, got_ms) in [
            ("test-payload-ms", self.test_payload_ms),
            ("executions-ms", self.executions_ms),
        ] {
            if got_ms < MIN_POLL_INTERVAL_MS {
                return Err(ConfigError::IntervalTooShort {
                    name: name.to_string(),
                    min_ms: MIN_POLL_INTERVAL_MS,
                    got_ms,
                });
            }
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Loading / Saving
// ─────────────────────────────────────────────────────────────────────────────

/// Get the path to the client config file.
pub fn client_config_path() -> Option<PathBuf> {
    crate::xdg_config_dir().map(|d| d.join(CLIENT_CONFIG_FILE))
}

/// Load the client configuration.
///
/// Returns a default config if the file doesn't exist.
pub fn load_client_config() -> Result<ClientConfig> {
    load_client_config_from(client_config_path().as_deref())
}

/// Load client config from a specific path.
pub fn load_client_config_from(path: Option<&Path>) -> Result<ClientConfig> {
    let Some(path) = path else {
        return Ok(ClientConfig::new());
    };

    if !path.exists() {
        return Ok(ClientConfig::new());
    }

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.display().to_string(),
        source: e,
    })?;

    ClientConfig::from_yaml(&contents)
}

/// Save the client configuration.
pub fn save_client_config(config: &ClientConfig) -> Result<()> {
    let path = client_config_path()
        .ok_or_else(|| ConfigError::Other("Could not determine config directory".to_string()))?;
    save_client_config_to(config, &path)
}

/// Save client config to a specific path.
pub fn save_client_config_to(config: &ClientConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::WriteFile {
            path: parent.display().to_string(),
            source: e,
        })?;
    }

    let contents = config.to_yaml()?;
    std::fs::write(path, contents).map_err(|e| ConfigError::WriteFile {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Expand ~ to home directory in paths.
fn expand_path(path: &Path) -> PathBuf {
    if let Some(s) = path.to_str()
        && let Some(rest) = s.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    path.to_path_buf()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config() {
        let config = ClientConfig::new();
        assert_eq!(config.api_version, API_VERSION);
        assert_eq!(config.kind, KIND);
        assert!(config.current_context.is_none());
        assert!(config.contexts.is_empty());
        assert_eq!(config.defaults.polling, PollingDefaults::default());
    }

    #[test]
    fn test_parse_full_yaml() {
        let yaml = r#"
api-version: v1
kind: ClientConfig
current-context: staging

contexts:
  - name: local
    server: http://localhost:8000/api

  - name: staging
    server: https://hooks.staging.example.com/api
    auth:
      type: bearer
      token-env: HOOKFLOW_STAGING_TOKEN
    timeout: 60

defaults:
  timeout: 15
  polling:
    test-payload-ms: 1000
    stop-on-terminal: false
"#;
        let config = ClientConfig::from_yaml(yaml).unwrap();

        assert_eq!(config.current_context.as_deref(), Some("staging"));
        assert_eq!(config.contexts.len(), 2);

        let local = config.get_context("local").unwrap();
        assert!(local.auth.is_none());
        assert_eq!(config.timeout_for(Some(local)), Duration::from_secs(15));

        let staging = config.current().unwrap();
        assert_eq!(config.timeout_for(Some(staging)), Duration::from_secs(60));
        match &staging.auth {
            Some(AuthConfig::Bearer { token_env, .. }) => {
                assert_eq!(token_env.as_deref(), Some("HOOKFLOW_STAGING_TOKEN"));
            }
            _ => panic!("Expected Bearer auth"),
        }

        let polling = &config.defaults.polling;
        assert_eq!(polling.test_payload_interval(), Duration::from_millis(1000));
        // Unset keys keep their defaults
        assert_eq!(polling.executions_interval(), Duration::from_millis(5000));
        assert!(!polling.stop_on_terminal);
    }

    #[test]
    fn test_interval_too_short_rejected() {
        let yaml = r#"
defaults:
  polling:
    executions-ms: 10
"#;
        let err = ClientConfig::from_yaml(yaml).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::IntervalTooShort { got_ms: 10, .. }
        ));
    }

    #[test]
    fn test_set_and_remove_context() {
        let mut config = ClientConfig::new();
        config.set_context(Context::new("local", "http://localhost:8000/api"));
        config.set_context(Context::new("local", "http://localhost:9000/api"));
        assert_eq!(config.contexts.len(), 1);
        assert_eq!(config.contexts[0].server, "http://localhost:9000/api");

        config.use_context("local").unwrap();
        config.remove_context("local");
        assert!(config.current_context.is_none());
        assert!(config.remove_context("local").is_none());
    }

    #[test]
    fn test_use_missing_context() {
        let mut config = ClientConfig::new();
        let err = config.use_context("nonexistent").unwrap_err();
        assert!(matches!(err, ConfigError::ContextNotFound(_)));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("client.yaml");

        let mut config = ClientConfig::new();
        config.set_context(
            Context::new("local", "http://localhost:8000/api")
                .with_auth(AuthConfig::api_key_file("~/.config/hookflow/local.key"))
                .with_timeout(5),
        );
        config.current_context = Some("local".to_string());

        save_client_config_to(&config, &path).unwrap();
        let loaded = load_client_config_from(Some(&path)).unwrap();

        assert_eq!(loaded.current_context, config.current_context);
        assert_eq!(loaded.context_names(), vec!["local"]);
        assert_eq!(loaded.contexts[0].timeout, Some(5));
    }

    #[test]
    fn test_load_missing_file_gives_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_client_config_from(Some(&dir.path().join("absent.yaml"))).unwrap();
        assert!(config.contexts.is_empty());
    }

    #[test]
    fn test_auth_file_wins_over_env() {
        let dir = tempfile::tempdir().unwrap();
        let key = dir.path().join("key");
        std::fs::write(&key, "from-file\n").unwrap();

        let auth = AuthConfig::ApiKey {
            key_file: Some(key),
            key_env: Some("HOOKFLOW_TEST_UNUSED_KEY".to_string()),
        };
        assert_eq!(auth.resolve().unwrap().as_deref(), Some("from-file"));
    }

    #[test]
    fn test_auth_env_resolve() {
        // SAFETY: Test is single-threaded, env var is test-specific
        unsafe {
            std::env::set_var("HOOKFLOW_TEST_BEARER", "secret123");
        }
        let context = Context::new("t", "http://x").with_auth(AuthConfig::bearer_env("HOOKFLOW_TEST_BEARER"));
        assert_eq!(context.resolve_token().unwrap().as_deref(), Some("secret123"));
        // SAFETY: Cleanup test env var
        unsafe {
            std::env::remove_var("HOOKFLOW_TEST_BEARER");
        }
    }

    #[test]
    fn test_auth_none_resolve() {
        assert!(AuthConfig::None.resolve().unwrap().is_none());
        assert!(Context::new("t", "http://x").resolve_token().unwrap().is_none());
    }

    #[test]
    fn test_expand_path() {
        let path = PathBuf::from("~/test/file.key");
        let expanded = expand_path(&path);
        if dirs::home_dir().is_some() {
            assert!(!expanded.to_str().unwrap().starts_with("~/"));
        }

        let path2 = PathBuf::from("/absolute/path");
        assert_eq!(expand_path(&path2), path2);
    }
}
