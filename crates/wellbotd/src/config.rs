//! Configuration management for wellbotd.
//!
//! Loads settings from `$WELLBOTD_CONFIG`, then `./wellbotd.toml`, or uses defaults.
//! `WELLBOT_API_KEY` and `OPENROUTER_API_KEY` override the file.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};
use wellbot_common::mask_secret;

/// Env var naming an explicit config file
pub const CONFIG_ENV: &str = "WELLBOTD_CONFIG";

/// Config file looked up in the working directory
pub const DEFAULT_CONFIG_PATH: &str = "wellbotd.toml";

pub const API_KEY_ENV: &str = "WELLBOT_API_KEY";
pub const RELAY_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Shared secret expected in `x-api-key`. Placeholder, not a credential system.
    #[serde(default = "default_api_key")]
    pub api_key: String,

    /// Maximum request body in bytes
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

fn default_listen_addr() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_api_key() -> String {
    "API_KEY".to_string()
}

fn default_body_limit() -> usize {
    64 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            api_key: default_api_key(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

/// Feedback store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SQLite file path
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "feedback.db".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Diagnosis relay configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Listen address for `/diagnose`; equal to `server.listen_addr` shares one listener
    #[serde(default = "default_relay_listen_addr")]
    pub listen_addr: String,

    /// Chat-completion endpoint
    #[serde(default = "default_relay_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_relay_model")]
    pub model: String,

    #[serde(default = "default_relay_temperature")]
    pub temperature: f32,

    #[serde(default = "default_relay_max_tokens")]
    pub max_tokens: u32,

    /// Upstream timeout in seconds
    #[serde(default = "default_relay_timeout")]
    pub timeout_secs: u64,

    /// Bearer key for the endpoint; normally supplied via `OPENROUTER_API_KEY`
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_relay_listen_addr() -> String {
    "127.0.0.1:5001".to_string()
}

fn default_relay_endpoint() -> String {
    "https://openrouter.ai/api/v1/chat/completions".to_string()
}

fn default_relay_model() -> String {
    "mistralai/mistral-7b-instruct:free".to_string()
}

fn default_relay_temperature() -> f32 {
    0.5
}

fn default_relay_max_tokens() -> u32 {
    800
}

fn default_relay_timeout() -> u64 {
    30
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_relay_listen_addr(),
            endpoint: default_relay_endpoint(),
            model: default_relay_model(),
            temperature: default_relay_temperature(),
            max_tokens: default_relay_max_tokens(),
            timeout_secs: default_relay_timeout(),
            api_key: None,
        }
    }
}

/// Full daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub relay: RelayConfig,
}

impl Config {
    /// Load config from file, or return defaults, then apply env overrides
    pub fn load() -> Self {
        let explicit = std::env::var(CONFIG_ENV).ok();
        let loaded = match explicit.as_deref() {
            Some(path) => Self::load_from_path(path),
            None => Self::load_from_path(DEFAULT_CONFIG_PATH),
        };

        let mut config = loaded.unwrap_or_else(|e| {
            warn!("Config not found, using defaults: {}", e);
            Config::default()
        });
        config.apply_env();
        config
    }

    /// Load config from specific path
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                info!("Shared secret taken from {}: {}", API_KEY_ENV, mask_secret(&key));
                self.server.api_key = key.trim().to_string();
            }
        }
        if let Ok(key) = std::env::var(RELAY_KEY_ENV) {
            if !key.trim().is_empty() {
                self.relay.api_key = Some(key.trim().to_string());
            }
        }
    }

    /// Serialize defaults for a starter config file
    pub fn default_toml() -> Result<String> {
        Ok(toml::to_string_pretty(&Config::default())?)
    }
}
