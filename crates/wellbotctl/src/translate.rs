//! Machine translation client (LibreTranslate-compatible).

use async_trait::async_trait;
use tracing::debug;
use wellbot_common::{Language, TranslateRequest, TranslateResponse, WellbotError};

#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate English `text` into `target`
    async fn translate(&self, text: &str, target: Language) -> Result<String, WellbotError>;
}

pub struct LibreTranslateClient {
    client: reqwest::Client,
    url: String,
}

impl LibreTranslateClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl Translator for LibreTranslateClient {
    async fn translate(&self, text: &str, target: Language) -> Result<String, WellbotError> {
        debug!("Translating {} chars to {}", text.len(), target);

        let resp = self
            .client
            .post(&self.url)
            .header("accept", "application/json")
            .json(&TranslateRequest::new(text, target))
            .send()
            .await
            .map_err(|e| WellbotError::Upstream(format!("Translation request failed: {}", e)))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(WellbotError::Upstream(format!(
                "Translation failed ({}): {}",
                status, body
            )));
        }

        let parsed: TranslateResponse = resp
            .json()
            .await
            .map_err(|e| WellbotError::Upstream(format!("Malformed translation: {}", e)))?;
        Ok(parsed.translated_text)
    }
}
