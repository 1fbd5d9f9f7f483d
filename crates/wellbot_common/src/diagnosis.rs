//! Diagnosis request/response contract.
//!
//! The `/diagnose` service receives a `DiagnosisRequest` and answers either
//! with a `DiagnosisResult` or with `{"error": "..."}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const FALLBACK_UNSPECIFIED: &str = "unspecified";
pub const FALLBACK_UNKNOWN: &str = "unknown";
pub const FALLBACK_NONE: &str = "none";
pub const DEFAULT_SEVERITY: u8 = 1;
pub const MAX_SEVERITY: u8 = 10;

pub const NO_DIAGNOSIS: &str = "No diagnosis available";
pub const NO_RECOMMENDATIONS: &str = "No recommendations available";

/// Symptom form as filled by the user. Empty strings mean "not answered".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SymptomForm {
    pub pain_type: String,
    pub duration: String,
    pub severity: u8,
    pub additional: String,
    pub extra_details: String,
    pub medical_history: String,
    pub age: String,
    pub gender: String,
    pub follow_up_answer: String,
}

/// Payload sent to the diagnosis service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisRequest {
    pub locations: Vec<String>,
    pub pain_type: String,
    pub duration: String,
    pub severity: u8,
    pub additional: String,
    pub extra_details: String,
    pub medical_history: String,
    pub age: String,
    pub gender: String,
    pub follow_up_answer: String,
}

/// Only an empty answer is replaced; whitespace is passed through untouched.
fn or_fallback(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

/// Render any JSON scalar as answer text; null and absent mean "not answered".
fn lenient_text(body: &Value, key: &str) -> String {
    match body.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn lenient_severity(body: &Value) -> u8 {
    let raw = match body.get("severity") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match raw {
        Some(v) if v >= 1.0 => v.min(f64::from(MAX_SEVERITY)) as u8,
        _ => DEFAULT_SEVERITY,
    }
}

impl SymptomForm {
    /// Read a `/diagnose` body without rejecting odd field types.
    pub fn from_json(body: &Value) -> Self {
        Self {
            pain_type: lenient_text(body, "painType"),
            duration: lenient_text(body, "duration"),
            severity: lenient_severity(body),
            additional: lenient_text(body, "additional"),
            extra_details: lenient_text(body, "extraDetails"),
            medical_history: lenient_text(body, "medicalHistory"),
            age: lenient_text(body, "age"),
            gender: lenient_text(body, "gender"),
            follow_up_answer: lenient_text(body, "followUpAnswer"),
        }
    }

    /// Build the wire payload, substituting literal fallbacks for empty answers.
    pub fn to_request(&self, locations: Vec<String>) -> DiagnosisRequest {
        let severity = if self.severity == 0 {
            DEFAULT_SEVERITY
        } else {
            self.severity.min(MAX_SEVERITY)
        };

        DiagnosisRequest {
            locations,
            pain_type: or_fallback(&self.pain_type, FALLBACK_UNSPECIFIED),
            duration: or_fallback(&self.duration, FALLBACK_UNKNOWN),
            severity,
            additional: or_fallback(&self.additional, FALLBACK_NONE),
            extra_details: or_fallback(&self.extra_details, FALLBACK_NONE),
            medical_history: or_fallback(&self.medical_history, FALLBACK_NONE),
            age: or_fallback(&self.age, FALLBACK_UNSPECIFIED),
            gender: or_fallback(&self.gender, FALLBACK_UNSPECIFIED),
            follow_up_answer: or_fallback(&self.follow_up_answer, FALLBACK_UNSPECIFIED),
        }
    }
}

/// Diagnosis text plus recommendations, read-only once received
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosisResult {
    pub diagnosis: String,
    pub recommendations: String,
}

impl DiagnosisResult {
    pub fn new(diagnosis: impl Into<String>, recommendations: impl Into<String>) -> Self {
        Self {
            diagnosis: diagnosis.into(),
            recommendations: recommendations.into(),
        }
    }

    /// Shown when neither navigation state nor storage has a result
    pub fn unavailable() -> Self {
        Self::new(NO_DIAGNOSIS, NO_RECOMMENDATIONS)
    }

    /// Split the diagnosis around its first `**condition**` marker.
    pub fn condition_parts(&self) -> ConditionParts<'_> {
        ConditionParts::parse(&self.diagnosis)
    }
}

/// Reply body of the diagnosis service. The error shape wins when both are present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DiagnosisReply {
    Error { error: String },
    Result(DiagnosisResult),
}

/// Diagnosis text split around the highlighted condition name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConditionParts<'a> {
    pub before: &'a str,
    pub condition: Option<&'a str>,
    pub after: &'a str,
}

impl<'a> ConditionParts<'a> {
    pub fn parse(text: &'a str) -> Self {
        let plain = Self {
            before: text,
            condition: None,
            after: "",
        };

        let Some(start) = text.find("**") else {
            return plain;
        };
        let rest = &text[start + 2..];
        let Some(len) = rest.find("**") else {
            return plain;
        };
        if len == 0 {
            return plain;
        }

        Self {
            before: &text[..start],
            condition: Some(&rest[..len]),
            after: &rest[len + 2..],
        }
    }
}

/// Remove bold markers before handing text to a speech engine.
pub fn strip_emphasis(text: &str) -> String {
    text.replace("**", "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_form_uses_fallbacks() {
        let req = SymptomForm::default().to_request(vec!["left_elbow".to_string()]);
        assert_eq!(req.pain_type, "unspecified");
        assert_eq!(req.duration, "unknown");
        assert_eq!(req.severity, 1);
        assert_eq!(req.additional, "none");
        assert_eq!(req.extra_details, "none");
        assert_eq!(req.medical_history, "none");
        assert_eq!(req.age, "unspecified");
        assert_eq!(req.gender, "unspecified");
        assert_eq!(req.follow_up_answer, "unspecified");
    }

    #[test]
    fn test_request_serializes_camel_case() {
        let form = SymptomForm {
            pain_type: "sharp".to_string(),
            severity: 7,
            follow_up_answer: "yes".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(form.to_request(vec!["right_knee".to_string()])).unwrap();
        assert_eq!(json["painType"], "sharp");
        assert_eq!(json["severity"], 7);
        assert_eq!(json["followUpAnswer"], "yes");
        assert_eq!(json["extraDetails"], "none");
        assert_eq!(json["locations"][0], "right_knee");
    }

    #[test]
    fn test_only_empty_answers_fall_back() {
        let form = SymptomForm {
            pain_type: "  sharp ".to_string(),
            gender: " ".to_string(),
            ..Default::default()
        };
        let req = form.to_request(vec!["upper_arm".to_string()]);
        assert_eq!(req.pain_type, "  sharp ");
        assert_eq!(req.gender, " ");
        assert_eq!(req.age, "unspecified");
    }

    #[test]
    fn test_from_json_accepts_any_scalar() {
        let body = serde_json::json!({
            "locations": ["left_elbow"],
            "age": 45,
            "gender": null,
            "followUpAnswer": true,
            "severity": "7",
        });
        let req = SymptomForm::from_json(&body).to_request(vec!["left_elbow".to_string()]);
        assert_eq!(req.age, "45");
        assert_eq!(req.gender, "unspecified");
        assert_eq!(req.follow_up_answer, "true");
        assert_eq!(req.severity, 7);
    }

    #[test]
    fn test_from_json_severity_bounds() {
        let sev = |v: Value| SymptomForm::from_json(&serde_json::json!({ "severity": v })).severity;
        assert_eq!(sev(serde_json::json!(0)), 1);
        assert_eq!(sev(serde_json::json!(-3)), 1);
        assert_eq!(sev(serde_json::json!(42)), 10);
        assert_eq!(sev(serde_json::json!("loud")), 1);
        assert_eq!(sev(serde_json::json!(4)), 4);
    }

    #[test]
    fn test_reply_error_shape() {
        let reply: DiagnosisReply = serde_json::from_str(r#"{"error": "x"}"#).unwrap();
        assert_eq!(reply, DiagnosisReply::Error { error: "x".to_string() });
    }

    #[test]
    fn test_reply_error_wins_over_result() {
        let reply: DiagnosisReply = serde_json::from_str(
            r#"{"diagnosis": "d", "recommendations": "r", "error": "boom"}"#,
        )
        .unwrap();
        assert!(matches!(reply, DiagnosisReply::Error { .. }));
    }

    #[test]
    fn test_reply_result_shape() {
        let reply: DiagnosisReply =
            serde_json::from_str(r#"{"diagnosis": "d", "recommendations": "r"}"#).unwrap();
        assert_eq!(reply, DiagnosisReply::Result(DiagnosisResult::new("d", "r")));
    }

    #[test]
    fn test_condition_parts() {
        let parts = ConditionParts::parse("**Patellar tendinitis** - overuse of the knee");
        assert_eq!(parts.before, "");
        assert_eq!(parts.condition, Some("Patellar tendinitis"));
        assert_eq!(parts.after, " - overuse of the knee");
    }

    #[test]
    fn test_condition_parts_without_marker() {
        let parts = ConditionParts::parse("plain text");
        assert_eq!(parts.before, "plain text");
        assert!(parts.condition.is_none());
    }

    #[test]
    fn test_strip_emphasis() {
        assert_eq!(strip_emphasis("**Gout** - toe"), "Gout - toe");
    }
}
