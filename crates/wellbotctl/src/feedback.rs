//! Feedback form and the HTTP client for `/api/feedback`.

use async_trait::async_trait;
use tracing::{debug, warn};
use wellbot_common::{
    mask_secret, strip_emphasis, DiagnosisResult, ErrorBody, FeedbackAck, FeedbackRecord,
    FeedbackSubmission, WellbotError, API_KEY_HEADER,
};

pub const DEFAULT_RATING: i64 = 3;
pub const MSG_SUBMIT_FAILED: &str = "Failed to submit feedback";
pub const MSG_THANKS: &str = "Thank you for your feedback!";

/// Ratings form, prefilled at the midpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackForm {
    pub usefulness: i64,
    pub accuracy: i64,
    pub comments: String,
    /// Result the feedback refers to, if the form was opened from one
    pub context: Option<DiagnosisResult>,
}

impl Default for FeedbackForm {
    fn default() -> Self {
        Self {
            usefulness: DEFAULT_RATING,
            accuracy: DEFAULT_RATING,
            comments: String::new(),
            context: None,
        }
    }
}

impl FeedbackForm {
    /// Form opened from a diagnosis view
    pub fn for_result(diagnosis: String, recommendations: String) -> Self {
        Self {
            context: Some(DiagnosisResult::new(diagnosis, recommendations)),
            ..Self::default()
        }
    }

    /// What is being rated: the condition name, else the plain diagnosis text
    pub fn subject(&self) -> Option<String> {
        let result = self.context.as_ref()?;
        Some(match result.condition_parts().condition {
            Some(condition) => condition.to_string(),
            None => strip_emphasis(&result.diagnosis),
        })
    }

    pub fn to_submission(&self) -> FeedbackSubmission {
        FeedbackSubmission::new(self.usefulness, self.accuracy, self.comments.clone())
    }
}

#[async_trait]
pub trait FeedbackSink: Send + Sync {
    async fn submit(&self, form: &FeedbackForm) -> Result<FeedbackAck, WellbotError>;
    async fn list(&self) -> Result<Vec<FeedbackRecord>, WellbotError>;
}

pub struct FeedbackClient {
    client: reqwest::Client,
    url: String,
    api_key: String,
}

impl FeedbackClient {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            api_key: api_key.into(),
        }
    }

    /// Error text from an `{"error": …}` body, else the generic message
    async fn failure(resp: reqwest::Response) -> WellbotError {
        let status = resp.status();
        let message = match resp.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => MSG_SUBMIT_FAILED.to_string(),
        };
        warn!("Feedback endpoint answered {}: {}", status, message);
        if status == reqwest::StatusCode::UNAUTHORIZED {
            WellbotError::Unauthorized
        } else if status.is_client_error() {
            WellbotError::Validation(message)
        } else {
            WellbotError::Upstream(message)
        }
    }
}

#[async_trait]
impl FeedbackSink for FeedbackClient {
    async fn submit(&self, form: &FeedbackForm) -> Result<FeedbackAck, WellbotError> {
        debug!(
            "Submitting feedback to {} with key {}",
            self.url,
            mask_secret(&self.api_key)
        );

        let resp = self
            .client
            .post(&self.url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&form.to_submission())
            .send()
            .await
            .map_err(|e| WellbotError::Upstream(format!("{}: {}", MSG_SUBMIT_FAILED, e)))?;

        if !resp.status().is_success() {
            return Err(Self::failure(resp).await);
        }

        resp.json()
            .await
            .map_err(|e| WellbotError::Upstream(format!("Malformed feedback reply: {}", e)))
    }

    async fn list(&self) -> Result<Vec<FeedbackRecord>, WellbotError> {
        let resp = self
            .client
            .get(&self.url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| WellbotError::Upstream(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(Self::failure(resp).await);
        }

        resp.json()
            .await
            .map_err(|e| WellbotError::Upstream(format!("Malformed feedback list: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_defaults_to_midpoint() {
        let form = FeedbackForm::default();
        assert_eq!((form.usefulness, form.accuracy), (3, 3));
        assert!(form.context.is_none());
    }

    #[test]
    fn test_handoff_form_keeps_ratings_default() {
        let form = FeedbackForm::for_result("d".into(), "r".into());
        assert_eq!(form.usefulness, DEFAULT_RATING);
        assert_eq!(form.context.unwrap().recommendations, "r");
    }

    #[test]
    fn test_subject_names_the_condition() {
        let form = FeedbackForm::for_result("Likely **Gout** in the toe".into(), "r".into());
        assert_eq!(form.subject().as_deref(), Some("Gout"));

        let form = FeedbackForm::for_result("General strain".into(), "r".into());
        assert_eq!(form.subject().as_deref(), Some("General strain"));

        assert!(FeedbackForm::default().subject().is_none());
    }

    #[test]
    fn test_submission_carries_ratings() {
        let mut form = FeedbackForm::default();
        form.usefulness = 5;
        form.comments = "clear".into();
        let valid = form.to_submission().validate().unwrap();
        assert_eq!(valid.usefulness, 5);
        assert_eq!(valid.accuracy, 3);
    }
}
