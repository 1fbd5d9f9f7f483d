//! Client configuration.
//!
//! Loads `$WELLBOTCTL_CONFIG`, then `~/.config/wellbot/wellbotctl.toml`, or uses defaults.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::storage::LocalStore;

pub const CONFIG_ENV: &str = "WELLBOTCTL_CONFIG";
pub const CONFIG_FILE: &str = "wellbotctl.toml";

/// Placeholder secret sent to the feedback service. It does not match the
/// daemon's built-in default; one of the two must be configured.
pub const DEFAULT_FEEDBACK_KEY: &str = "wellbot-client-key";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    #[serde(default = "default_diagnose_url")]
    pub diagnose_url: String,

    #[serde(default = "default_feedback_url")]
    pub feedback_url: String,

    #[serde(default = "default_translate_url")]
    pub translate_url: String,

    /// Value for the `x-api-key` header on feedback calls
    #[serde(default = "default_feedback_key")]
    pub feedback_api_key: String,
}

fn default_diagnose_url() -> String {
    "http://localhost:5001/diagnose".to_string()
}

fn default_feedback_url() -> String {
    "http://localhost:5000/api/feedback".to_string()
}

fn default_translate_url() -> String {
    "https://libretranslate.com/translate".to_string()
}

fn default_feedback_key() -> String {
    DEFAULT_FEEDBACK_KEY.to_string()
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            diagnose_url: default_diagnose_url(),
            feedback_url: default_feedback_url(),
            translate_url: default_translate_url(),
            feedback_api_key: default_feedback_key(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Text-to-speech program, invoked as `<program> -v <voice> <text>`
    #[serde(default = "default_speech_program")]
    pub program: String,
}

fn default_speech_program() -> String {
    "espeak-ng".to_string()
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            program: default_speech_program(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Overrides the local storage file under the user data directory
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub endpoints: EndpointConfig,

    #[serde(default)]
    pub speech: SpeechConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

impl ClientConfig {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("wellbot").join(CONFIG_FILE))
    }

    pub fn load() -> Self {
        let path = std::env::var(CONFIG_ENV)
            .ok()
            .map(PathBuf::from)
            .or_else(Self::default_path);

        let config = match path {
            Some(path) => Self::load_from_path(&path).unwrap_or_else(|e| {
                warn!("Config not found at {}, using defaults: {}", path.display(), e);
                ClientConfig::default()
            }),
            None => ClientConfig::default(),
        };

        if config.endpoints.feedback_api_key == DEFAULT_FEEDBACK_KEY {
            warn!(
                "Using built-in feedback key; set endpoints.feedback_api_key to match the daemon"
            );
        }
        config
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config: ClientConfig = toml::from_str(&content)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn local_store(&self) -> LocalStore {
        match &self.storage.path {
            Some(path) => LocalStore::new(path),
            None => LocalStore::default_location(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.endpoints.diagnose_url, "http://localhost:5001/diagnose");
        assert_eq!(config.endpoints.feedback_url, "http://localhost:5000/api/feedback");
        assert_eq!(config.endpoints.feedback_api_key, DEFAULT_FEEDBACK_KEY);
        assert_eq!(config.speech.program, "espeak-ng");
    }

    #[test]
    fn test_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[endpoints]\nfeedback_api_key = \"API_KEY\"\n[storage]\npath = \"/tmp/wb.json\""
        )
        .unwrap();

        let config = ClientConfig::load_from_path(file.path()).unwrap();
        assert_eq!(config.endpoints.feedback_api_key, "API_KEY");
        assert_eq!(config.endpoints.translate_url, "https://libretranslate.com/translate");
        assert_eq!(config.local_store().path(), Path::new("/tmp/wb.json"));
    }
}
