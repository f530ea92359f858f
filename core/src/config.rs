// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;
use std::path::{Path, PathBuf};

use cadence_prompts::PromptsConfig;

use crate::notification::NotificationContent;
use crate::schedule::ScheduledTime;

/// The name of the application.
pub const APP_NAME: &str = "cadence";

/// Configuration of the reminders engine.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct Config {
    /// Directory for storing application state. The database is opened in memory when unset.
    #[serde(default)]
    pub state_dir: Option<PathBuf>,

    /// Reminder time used for blogs without a stored time.
    #[serde(default)]
    pub default_time: Option<ScheduledTime>,

    /// Content of reminder notifications.
    #[serde(default)]
    pub notification: NotificationContent,

    /// Blogging prompts sync. Prompts are disabled when absent.
    #[serde(default)]
    pub prompts: Option<PromptsSection>,
}

/// The `[prompts]` section of the configuration.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct PromptsSection {
    /// Whether the blogging prompts feature is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Remote prompt settings service.
    #[serde(flatten)]
    pub remote: PromptsConfig,
}

const fn default_true() -> bool {
    true
}

impl Config {
    /// Normalize the configuration.
    pub fn normalize(&mut self) -> Result<(), Box<dyn Error>> {
        match &self.state_dir {
            Some(a) => {
                self.state_dir = Some(
                    expand_path(a)
                        .map_err(|e| format!("Failed to expand state directory path: {e}"))?,
                );
            }

            None => match get_state_dir() {
                Ok(a) => self.state_dir = Some(a.join(APP_NAME)),
                Err(e) => tracing::warn!(err = %e, "failed to get state directory"),
            },
        }

        Ok(())
    }

    /// The reminder time of blogs without a stored time.
    pub fn default_time(&self) -> ScheduledTime {
        self.default_time.unwrap_or_default()
    }
}

/// Handle tilde (~) and environment variables in the path
fn expand_path(path: &Path) -> Result<PathBuf, Box<dyn Error>> {
    if path.is_absolute() {
        return Ok(path.to_owned());
    }

    let path = path.to_str().ok_or("Invalid path")?;

    // Handle tilde and home directory
    let home_prefixes: &[&str] = if cfg!(unix) {
        &["~/", "$HOME/", "${HOME}/"]
    } else {
        &[r"~\", "~/", r"%UserProfile%\", r"%UserProfile%/"]
    };
    for prefix in home_prefixes {
        if let Some(stripped) = path.strip_prefix(prefix) {
            return Ok(get_home_dir()?.join(stripped));
        }
    }

    // Handle config directories
    let config_prefixes: &[&str] = if cfg!(unix) {
        &["$XDG_CONFIG_HOME/", "${XDG_CONFIG_HOME}/"]
    } else {
        &[r"%LOCALAPPDATA%\", "%LOCALAPPDATA%/"]
    };
    for prefix in config_prefixes {
        if let Some(stripped) = path.strip_prefix(prefix) {
            return Ok(get_config_dir()?.join(stripped));
        }
    }

    Ok(path.into())
}

fn get_home_dir() -> Result<PathBuf, Box<dyn Error>> {
    dirs::home_dir().ok_or_else(|| "User-specific home directory not found".into())
}

fn get_config_dir() -> Result<PathBuf, Box<dyn Error>> {
    #[cfg(unix)]
    let config_dir = xdg::BaseDirectories::new().get_config_home();
    #[cfg(not(unix))]
    let config_dir = dirs::config_dir();
    config_dir.ok_or_else(|| "User-specific config directory not found".into())
}

fn get_state_dir() -> Result<PathBuf, Box<dyn Error>> {
    #[cfg(unix)]
    let state_dir = xdg::BaseDirectories::new().get_state_home();
    #[cfg(not(unix))]
    let state_dir = dirs::data_dir();
    state_dir.ok_or_else(|| "User-specific state directory not found".into())
}
