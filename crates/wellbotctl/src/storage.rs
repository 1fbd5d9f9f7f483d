//! Local key/value storage, the client's stand-in for browser storage.
//!
//! One JSON object per file; the `diagnosis` key mirrors the last result so
//! `show` survives a restart.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use wellbot_common::{DiagnosisResult, WellbotError, DIAGNOSIS_STORAGE_KEY};

pub const STORAGE_FILE: &str = "local_storage.json";

#[derive(Debug, Clone)]
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `$XDG_DATA_HOME/wellbot/local_storage.json`, or the working directory
    pub fn default_location() -> Self {
        let base = dirs::data_dir()
            .map(|d| d.join("wellbot"))
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(base.join(STORAGE_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Map<String, Value>, WellbotError> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let text = fs::read_to_string(&self.path)
            .map_err(|e| WellbotError::Storage(format!("{}: {}", self.path.display(), e)))?;
        if text.trim().is_empty() {
            return Ok(Map::new());
        }
        serde_json::from_str(&text)
            .map_err(|e| WellbotError::Storage(format!("{}: {}", self.path.display(), e)))
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, WellbotError> {
        let map = self.read_all()?;
        match map.get(key) {
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| WellbotError::Storage(format!("bad value for {}: {}", key, e))),
            None => Ok(None),
        }
    }

    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), WellbotError> {
        // a corrupt file is replaced rather than blocking every write
        let mut map = self.read_all().unwrap_or_else(|e| {
            warn!("Discarding unreadable local storage: {}", e);
            Map::new()
        });
        map.insert(key.to_string(), serde_json::to_value(value)?);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| WellbotError::Storage(e.to_string()))?;
        }
        let text = serde_json::to_string_pretty(&Value::Object(map))?;
        fs::write(&self.path, text).map_err(|e| WellbotError::Storage(e.to_string()))?;
        debug!("Stored {} in {}", key, self.path.display());
        Ok(())
    }

    pub fn save_diagnosis(&self, result: &DiagnosisResult) -> Result<(), WellbotError> {
        self.set(DIAGNOSIS_STORAGE_KEY, result)
    }

    pub fn load_diagnosis(&self) -> Result<Option<DiagnosisResult>, WellbotError> {
        self.get(DIAGNOSIS_STORAGE_KEY)
    }
}
