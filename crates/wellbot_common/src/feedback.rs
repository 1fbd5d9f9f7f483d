//! Feedback wire types and validation.
//!
//! A submission arrives with both ratings optional; only a validated
//! `ValidFeedback` may reach the store.

use crate::error::{Result, WellbotError};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Lowest accepted rating
pub const RATING_MIN: i64 = 1;
/// Highest accepted rating
pub const RATING_MAX: i64 = 5;

pub const MSG_REQUIRED: &str = "Usefulness and accuracy are required";
pub const MSG_SAVED: &str = "Feedback saved successfully";
pub const MSG_SAVE_FAILED: &str = "Failed to save feedback";
pub const MSG_LIST_FAILED: &str = "Failed to retrieve feedback";

/// A stored feedback row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub id: i64,
    pub usefulness: i64,
    pub accuracy: i64,
    pub comments: Option<String>,
    pub timestamp: NaiveDateTime,
}

/// Feedback body as posted by a client
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedbackSubmission {
    #[serde(default)]
    pub usefulness: Option<i64>,
    #[serde(default)]
    pub accuracy: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

/// Feedback that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidFeedback {
    pub usefulness: i64,
    pub accuracy: i64,
    pub comments: Option<String>,
}

impl FeedbackSubmission {
    pub fn new(usefulness: i64, accuracy: i64, comments: impl Into<String>) -> Self {
        Self {
            usefulness: Some(usefulness),
            accuracy: Some(accuracy),
            comments: Some(comments.into()),
        }
    }

    /// Both ratings must be present, non-zero and within 1..=5.
    pub fn validate(self) -> Result<ValidFeedback> {
        let usefulness = required_rating(self.usefulness)?;
        let accuracy = required_rating(self.accuracy)?;

        Ok(ValidFeedback {
            usefulness,
            accuracy,
            comments: self.comments,
        })
    }
}

fn required_rating(value: Option<i64>) -> Result<i64> {
    match value {
        Some(v) if (RATING_MIN..=RATING_MAX).contains(&v) => Ok(v),
        _ => Err(WellbotError::Validation(MSG_REQUIRED.to_string())),
    }
}

/// Success acknowledgment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackAck {
    pub message: String,
}

impl FeedbackAck {
    pub fn saved() -> Self {
        Self {
            message: MSG_SAVED.to_string(),
        }
    }
}

/// Error body shared by every JSON endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_usefulness_rejected_regardless_of_accuracy() {
        for accuracy in [None, Some(0), Some(1), Some(5)] {
            let sub = FeedbackSubmission {
                usefulness: Some(0),
                accuracy,
                comments: None,
            };
            assert!(matches!(sub.validate(), Err(WellbotError::Validation(_))));
        }
    }

    #[test]
    fn test_missing_accuracy_rejected() {
        let sub = FeedbackSubmission {
            usefulness: Some(3),
            accuracy: None,
            comments: Some("ok".to_string()),
        };
        let err = sub.validate().unwrap_err();
        assert_eq!(err.to_string(), MSG_REQUIRED);
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert!(FeedbackSubmission::new(6, 3, "").validate().is_err());
        assert!(FeedbackSubmission::new(3, -1, "").validate().is_err());
    }

    #[test]
    fn test_valid_submission() {
        let valid = FeedbackSubmission::new(4, 5, "helpful").validate().unwrap();
        assert_eq!(valid.usefulness, 4);
        assert_eq!(valid.accuracy, 5);
        assert_eq!(valid.comments.as_deref(), Some("helpful"));
    }

    #[test]
    fn test_submission_deserializes_with_missing_fields() {
        let sub: FeedbackSubmission = serde_json::from_str(r#"{"accuracy": 2}"#).unwrap();
        assert!(sub.usefulness.is_none());
        assert_eq!(sub.accuracy, Some(2));
    }
}
