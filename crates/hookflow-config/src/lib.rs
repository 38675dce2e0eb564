//! Client configuration for the hookflow console.
//!
//! Kubeconfig-style configuration with named contexts:
//! - Named connection contexts (server + auth)
//! - `current-context` for default selection
//! - API key or bearer auth read from a file or environment variable
//! - Defaults for request timeouts and status polling

pub mod client;
pub mod error;
pub mod paths;

pub use client::{
    AuthConfig, ClientConfig, ClientDefaults, Context, PollingDefaults, client_config_path,
    load_client_config, load_client_config_from, save_client_config, save_client_config_to,
};
pub use error::{ConfigError, Result};
pub use paths::{CONFIG_DIR_ENV, xdg_config_dir};
