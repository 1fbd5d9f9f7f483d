//! Presentation languages and the translation wire format.

use serde::{Deserialize, Serialize};

/// Source language of every diagnosis
pub const SOURCE_LANG: &str = "en";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "hi")]
    Hindi,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Hindi => "hi",
        }
    }

    /// Locale handed to the speech engine
    pub fn speech_locale(&self) -> &'static str {
        match self {
            Self::English => "en-US",
            Self::Hindi => "hi-IN",
        }
    }

    pub fn is_source(&self) -> bool {
        self.code() == SOURCE_LANG
    }

    pub fn toggled(&self) -> Self {
        match self {
            Self::English => Self::Hindi,
            Self::Hindi => Self::English,
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "en" | "en-us" | "english" => Some(Self::English),
            "hi" | "hi-in" | "hindi" => Some(Self::Hindi),
            _ => None,
        }
    }

    /// Labels used when reading a result aloud
    pub fn speech_labels(&self) -> (&'static str, &'static str) {
        match self {
            Self::English => ("Diagnosis", "Recommendations"),
            Self::Hindi => ("निदान", "सिफारिशें"),
        }
    }

    /// Section headings for rendered results
    pub fn headings(&self) -> (&'static str, &'static str) {
        match self {
            Self::English => ("Diagnosis", "Recommendations"),
            Self::Hindi => ("निदान", "इसे कैसे ठीक करें"),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Request body of a LibreTranslate-compatible endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslateRequest {
    pub q: String,
    pub source: String,
    pub target: String,
    pub format: String,
}

impl TranslateRequest {
    pub fn new(text: &str, target: Language) -> Self {
        Self {
            q: text.to_string(),
            source: SOURCE_LANG.to_string(),
            target: target.code().to_string(),
            format: "text".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateResponse {
    pub translated_text: String,
}
