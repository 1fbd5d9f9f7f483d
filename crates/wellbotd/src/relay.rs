//! Diagnosis relay - answers `/diagnose` by prompting a hosted chat model.
//!
//! The trait seam lets routes run against a fake in tests; production uses
//! `OpenRouterDiagnoser`.

use crate::config::RelayConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, warn};
use wellbot_common::body_parts::anatomical_name;
use wellbot_common::{DiagnosisRequest, DiagnosisResult};

pub const PARSE_FALLBACK_DIAGNOSIS: &str = "Unable to parse diagnosis due to an internal error.";
pub const PARSE_FALLBACK_RECOMMENDATIONS: &str =
    "Please consult a healthcare professional for personalized advice.";

/// Failure of the relay itself; every variant answers HTTP 500
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Server configuration error: API key missing")]
    MissingKey,

    #[error("OpenRouter API failed: {status} {body}")]
    Upstream { status: u16, body: String },

    #[error("Empty response from API")]
    EmptyCompletion,

    #[error("Server error: {0}")]
    Transport(String),
}

#[async_trait]
pub trait Diagnoser: Send + Sync {
    async fn diagnose(&self, request: &DiagnosisRequest) -> Result<DiagnosisResult, RelayError>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Default, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Default, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: ChatChoiceMessage,
}

#[derive(Debug, Default, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: String,
}

/// Relay backed by an OpenAI-compatible chat-completion endpoint
pub struct OpenRouterDiagnoser {
    client: reqwest::Client,
    config: RelayConfig,
}

impl OpenRouterDiagnoser {
    pub fn new(config: RelayConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl Diagnoser for OpenRouterDiagnoser {
    async fn diagnose(&self, request: &DiagnosisRequest) -> Result<DiagnosisResult, RelayError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                error!("Relay API key is not set");
                RelayError::MissingKey
            })?;

        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: build_prompt(request),
            }],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        debug!("Sending diagnosis prompt to {}", self.config.endpoint);
        let resp = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| RelayError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let text = resp.text().await.unwrap_or_default();
            error!("Relay upstream failed: {} {}", status, text);
            return Err(RelayError::Upstream { status, body: text });
        }

        let chat: ChatResponse = resp
            .json()
            .await
            .map_err(|e| RelayError::Transport(e.to_string()))?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();

        parse_completion(&content)
    }
}

/// Turn the model's reply into a result. Unparseable replies yield the fallback pair.
pub fn parse_completion(content: &str) -> Result<DiagnosisResult, RelayError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(RelayError::EmptyCompletion);
    }

    match serde_json::from_str::<DiagnosisResult>(strip_code_fence(content)) {
        Ok(result)
            if !result.diagnosis.trim().is_empty()
                && !result.recommendations.trim().is_empty() =>
        {
            Ok(result)
        }
        Ok(_) => {
            warn!("Completion had an empty diagnosis or recommendations field");
            Ok(fallback_result())
        }
        Err(e) => {
            warn!("Completion is not the expected JSON: {}", e);
            Ok(fallback_result())
        }
    }
}

fn fallback_result() -> DiagnosisResult {
    DiagnosisResult::new(PARSE_FALLBACK_DIAGNOSIS, PARSE_FALLBACK_RECOMMENDATIONS)
}

/// Models sometimes wrap JSON in a ```json fence
fn strip_code_fence(content: &str) -> &str {
    let Some(inner) = content.strip_prefix("```") else {
        return content;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

/// Physician prompt for one intake
pub fn build_prompt(request: &DiagnosisRequest) -> String {
    let locations = request
        .locations
        .iter()
        .map(|loc| anatomical_name(loc))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"You are a board-certified physician. Based on the patient information below, give the single most probable diagnosis, explain your clinical reasoning with reference to the inputs, and give safe, actionable recommendations for a non-medical reader.

### Patient Information:
- Pain locations: {locations}
- Pain type: {pain_type}
- Duration: {duration}
- Severity (1-10): {severity}
- Additional symptoms: {additional}
- Extra details: {extra_details}
- Medical history: {medical_history}
- Age: {age}
- Gender: {gender}
- Does the pain worsen with movement?: {follow_up}

### Instructions:
1. Stay anatomically accurate to the listed locations.
2. Use pain type, duration and severity to judge acuity and chronicity; use history, age and gender as risk factors.
3. Name one condition only. Call out red flags (for example fever with high severity) and advise urgent care when present.
4. Tailor recommendations to severity: home care for mild cases, professional evaluation for severe ones.

### Output Format:
Return only this JSON object:
{{
  "diagnosis": "**Condition** - Detailed clinical reasoning referencing specific patient inputs.",
  "recommendations": "Specific, safe steps for the patient to follow."
}}
Wrap the condition name in ** markers."#,
        locations = locations,
        pain_type = request.pain_type,
        duration = request.duration,
        severity = request.severity,
        additional = request.additional,
        extra_details = request.extra_details,
        medical_history = request.medical_history,
        age = request.age,
        gender = request.gender,
        follow_up = request.follow_up_answer,
    )
}
