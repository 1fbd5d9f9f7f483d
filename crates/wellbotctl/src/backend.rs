//! Diagnosis service client.
//!
//! One POST per submission, no retry and no client-side timeout.

use async_trait::async_trait;
use tracing::{debug, error};
use wellbot_common::{
    DiagnosisReply, DiagnosisRequest, DiagnosisResult, ErrorBody, WellbotError,
};

/// Anything that can answer a diagnosis request
#[async_trait]
pub trait DiagnosisBackend: Send + Sync {
    async fn diagnose(&self, request: &DiagnosisRequest) -> Result<DiagnosisResult, WellbotError>;
}

/// HTTP client for a `/diagnose` endpoint
pub struct HttpDiagnosisClient {
    client: reqwest::Client,
    url: String,
}

impl HttpDiagnosisClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl DiagnosisBackend for HttpDiagnosisClient {
    async fn diagnose(&self, request: &DiagnosisRequest) -> Result<DiagnosisResult, WellbotError> {
        debug!("Sending diagnosis request to {}: {:?}", self.url, request);

        let resp = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| WellbotError::Upstream(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| WellbotError::Upstream(e.to_string()))?;

        if !status.is_success() {
            error!("Diagnosis backend answered {}: {}", status, text);
            let message = match serde_json::from_str::<ErrorBody>(&text) {
                Ok(body) => body.error,
                Err(_) if text.trim().is_empty() => status.to_string(),
                Err(_) => text,
            };
            return Err(WellbotError::Upstream(message));
        }

        interpret_reply(&text)
    }
}

/// Decode a 2xx body. An `error` field means failure even on success status.
pub fn interpret_reply(body: &str) -> Result<DiagnosisResult, WellbotError> {
    let reply: DiagnosisReply = serde_json::from_str(body)
        .map_err(|e| WellbotError::Upstream(format!("Malformed diagnosis response: {}", e)))?;

    match reply {
        DiagnosisReply::Error { error } => Err(WellbotError::Upstream(error)),
        DiagnosisReply::Result(result) => Ok(result),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_field_on_success_is_failure() {
        let err = interpret_reply(r#"{"error": "x"}"#).unwrap_err();
        assert_eq!(err.to_string(), "x");
    }

    #[test]
    fn test_result_body() {
        let result =
            interpret_reply(r#"{"diagnosis": "**Gout**", "recommendations": "Hydrate"}"#).unwrap();
        assert_eq!(result.recommendations, "Hydrate");
    }

    #[test]
    fn test_malformed_body_is_upstream_error() {
        let err = interpret_reply("<html>").unwrap_err();
        assert_eq!(err.kind(), "upstream");
    }
}
