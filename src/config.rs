//! Configuration management for arenachat
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{ArenaError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Main configuration structure for arenachat
///
/// Holds everything the client needs: where the battle arena server lives,
/// where conversation threads are persisted, and chat behavior knobs.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Battle arena server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Local thread storage settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Chat behavior settings
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Battle arena server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the arena server (the `/api/...` routes hang off this)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    ///
    /// Battles fan out to several models and have the judges rate each
    /// other, so a single request can legitimately take over a minute.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout() -> u64 {
    180
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

/// Local thread storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Override for the sled database directory
    ///
    /// When unset, the platform data directory is used
    /// (e.g. `~/.local/share/arenachat/threads` on Linux).
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Chat behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Validity window for the pending-thread-id token, in milliseconds
    ///
    /// When a turn is submitted with no active thread, the freshly created
    /// thread id is reused by any further turn arriving inside this window,
    /// so the user message and the assistant reply of one conversation
    /// start land in the same thread. The right bound is workload-dependent;
    /// it is a tunable, not a constant.
    #[serde(default = "default_pending_window_ms")]
    pub pending_window_ms: u64,

    /// How many past turns to send as conversation history with each battle
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

fn default_pending_window_ms() -> u64 {
    2000
}

fn default_history_limit() -> usize {
    20
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            pending_window_ms: default_pending_window_ms(),
            history_limit: default_history_limit(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `server_override` - Optional server base URL from the CLI
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, server_override: Option<&str>) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::debug!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();

        if let Some(base_url) = server_override {
            config.server.base_url = base_url.to_string();
        }

        Ok(config)
    }

    /// Parse configuration from a YAML file
    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ArenaError::Config(format!("Failed to read {}: {}", path, e)))?;
        let config: Config = serde_yaml::from_str(&contents)
            .map_err(|e| ArenaError::Config(format!("Failed to parse {}: {}", path, e)))?;
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_vars(&mut self) {
        if let Ok(base_url) = std::env::var("ARENACHAT_SERVER") {
            self.server.base_url = base_url;
        }

        if let Ok(timeout) = std::env::var("ARENACHAT_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.server.timeout_seconds = value;
            }
        }

        if let Ok(path) = std::env::var("ARENACHAT_STORAGE_PATH") {
            self.storage.path = Some(PathBuf::from(path));
        }

        if let Ok(window) = std::env::var("ARENACHAT_PENDING_WINDOW_MS") {
            if let Ok(value) = window.parse() {
                self.chat.pending_window_ms = value;
            }
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if the server URL does not parse or a knob is zero
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.server.base_url).map_err(|e| {
            ArenaError::Config(format!(
                "Invalid server base_url '{}': {}",
                self.server.base_url, e
            ))
        })?;

        if self.server.timeout_seconds == 0 {
            return Err(ArenaError::Config(
                "server.timeout_seconds must be greater than zero".to_string(),
            )
            .into());
        }

        if self.chat.pending_window_ms == 0 {
            return Err(ArenaError::Config(
                "chat.pending_window_ms must be greater than zero".to_string(),
            )
            .into());
        }

        Ok(())
    }
}
