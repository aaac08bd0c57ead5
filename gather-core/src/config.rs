//! Global gather configuration.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{GatherError, GatherResult};

const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

/// Which backend the app talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// In-process backend; nothing survives a restart.
    #[default]
    Memory,
    Firebase,
}

impl FromStr for BackendKind {
    type Err = GatherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(BackendKind::Memory),
            "firebase" => Ok(BackendKind::Firebase),
            other => Err(GatherError::Config(format!(
                "unknown backend '{other}' (expected 'memory' or 'firebase')"
            ))),
        }
    }
}

/// Static project settings for the Firebase backend, as found in the web app config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirebaseConfig {
    pub api_key: String,
    pub project_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_bucket: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messaging_sender_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,

    /// How often live queries re-read their collection.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl FirebaseConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Global configuration at ~/.config/gather/config.toml
///
/// Every key can be overridden from the environment, e.g.
/// `GATHER__BACKEND=firebase` or `GATHER__FIREBASE__API_KEY=...`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GatherConfig {
    #[serde(default)]
    pub backend: BackendKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firebase: Option<FirebaseConfig>,
}

impl GatherConfig {
    pub fn config_path() -> GatherResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| GatherError::Config("Could not determine config directory".into()))?
            .join("gather");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, creating a commented default file on first run.
    pub fn load() -> GatherResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    /// Load from an explicit file plus `GATHER__*` environment overrides.
    pub fn load_from(path: &Path) -> GatherResult<Self> {
        Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix("GATHER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| GatherError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| GatherError::Config(e.to_string()))
    }

    pub fn save(&self, path: &Path) -> GatherResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| GatherError::Config(e.to_string()))?;

        std::fs::write(path, content)
            .map_err(|e| GatherError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> GatherResult<()> {
        let contents = format!(
            "\
# gather configuration

# Backend to use: \"memory\" (nothing is persisted) or \"firebase\"
# backend = \"memory\"

# Firebase project settings (from the web app config in the Firebase console):
# [firebase]
# api_key = \"...\"
# project_id = \"my-project\"
# auth_domain = \"my-project.firebaseapp.com\"
# poll_interval_ms = {DEFAULT_POLL_INTERVAL_MS}
# request_timeout_secs = {DEFAULT_REQUEST_TIMEOUT_SECS}
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                GatherError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| GatherError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
