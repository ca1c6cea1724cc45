use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};
use updinfo_platform::AppPaths;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_channel")]
    pub channel: String,

    /// Overrides the version the running build reports.
    #[serde(default)]
    pub current_version: Option<String>,

    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    #[serde(default = "default_wrap_width")]
    pub wrap_width: usize,

    #[serde(default)]
    pub debug_logging: bool,

    #[serde(default = "default_max_log_size_bytes")]
    pub max_log_size_bytes: u64,

    #[serde(default = "default_wait_timeout")]
    pub wait_timeout_secs: u64,
}

fn default_endpoint() -> String {
    "https://updates.updinfo.dev/info.json".to_string()
}

fn default_channel() -> String {
    "stable".to_string()
}

fn default_http_timeout() -> u64 {
    10
}

fn default_wrap_width() -> usize {
    80
}

fn default_max_log_size_bytes() -> u64 {
    5 * 1024 * 1024
}

fn default_wait_timeout() -> u64 {
    30
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            channel: default_channel(),
            current_version: None,
            http_timeout_secs: default_http_timeout(),
            wrap_width: default_wrap_width(),
            debug_logging: false,
            max_log_size_bytes: default_max_log_size_bytes(),
            wait_timeout_secs: default_wait_timeout(),
        }
    }
}

impl Settings {
    pub fn load(paths: &AppPaths) -> Self {
        Self::load_from_path(&paths.settings_file())
    }

    /// Missing or unreadable files fall back to defaults.
    fn load_from_path(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|error| {
                warn!("Ignoring invalid settings file {}: {error}", path.display());
                Self::default()
            }),
            Err(error) => {
                warn!("Could not read settings file {}: {error}", path.display());
                Self::default()
            }
        }
    }
}
