//! Config directory resolution.

use std::path::PathBuf;

/// Environment variable that overrides the config directory.
pub const CONFIG_DIR_ENV: &str = "HOOKFLOW_CONFIG_DIR";

/// Application directory name under the platform config dir.
const APP_NAME: &str = "hookflow";

/// Directory holding `client.yaml` and `logs/`.
///
/// `$HOOKFLOW_CONFIG_DIR` wins when set and non-empty, otherwise the platform
/// config dir (`~/.config/hookflow` on Linux).
pub fn xdg_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV)
        && !dir.is_empty()
    {
        return Some(PathBuf::from(dir));
    }
    dirs::config_dir().map(|d| d.join(APP_NAME))
}
