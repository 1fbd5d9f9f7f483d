//! Error types for WellBot.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WellbotError {
    /// Required user input is missing or out of range.
    #[error("{0}")]
    Validation(String),

    #[error("Unauthorized: Invalid API key")]
    Unauthorized,

    /// External diagnosis or translation service failed or answered garbage.
    #[error("{0}")]
    Upstream(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl WellbotError {
    /// Short machine-readable kind, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            WellbotError::Validation(_) => "validation",
            WellbotError::Unauthorized => "unauthorized",
            WellbotError::Upstream(_) => "upstream",
            WellbotError::Storage(_) => "storage",
            WellbotError::Io(_) => "io",
            WellbotError::Json(_) => "json",
        }
    }
}

pub type Result<T> = std::result::Result<T, WellbotError>;
