//! API routes for wellbotd

use crate::error::ApiError;
use crate::middleware::{require_api_key, SharedSecret};
use crate::server::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    middleware::from_fn_with_state,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};
use wellbot_common::{
    DiagnosisResult, FeedbackAck, FeedbackRecord, FeedbackSubmission, SymptomForm,
    MSG_LIST_FAILED, MSG_REQUIRED, MSG_SAVE_FAILED,
};

type AppStateArc = Arc<AppState>;

// ============================================================================
// Feedback Routes
// ============================================================================

/// `POST`/`GET /api/feedback`, both behind the shared-secret gate
pub fn feedback_routes(secret: SharedSecret) -> Router<AppStateArc> {
    Router::new()
        .route("/api/feedback", post(submit_feedback).get(list_feedback))
        .route_layer(from_fn_with_state(secret, require_api_key))
}

async fn submit_feedback(
    State(state): State<AppStateArc>,
    payload: Result<Json<FeedbackSubmission>, JsonRejection>,
) -> Result<Json<FeedbackAck>, ApiError> {
    let Json(submission) = payload.map_err(|rejection| {
        warn!("Malformed feedback body: {}", rejection.body_text());
        ApiError::BadRequest(MSG_REQUIRED.to_string())
    })?;

    let feedback = submission.validate()?;

    let id = state.store.insert(feedback).await.map_err(|e| {
        error!("Failed to save feedback: {}", e);
        ApiError::Internal(MSG_SAVE_FAILED.to_string())
    })?;

    info!("Feedback #{} saved", id);
    Ok(Json(FeedbackAck::saved()))
}

async fn list_feedback(
    State(state): State<AppStateArc>,
) -> Result<Json<Vec<FeedbackRecord>>, ApiError> {
    let records = state.store.list().await.map_err(|e| {
        error!("Failed to retrieve feedback: {}", e);
        ApiError::Internal(MSG_LIST_FAILED.to_string())
    })?;

    Ok(Json(records))
}

// ============================================================================
// Health Routes
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub feedback_records: Option<i64>,
}

pub fn health_routes() -> Router<AppStateArc> {
    Router::new().route("/health", get(health_check))
}

async fn health_check(State(state): State<AppStateArc>) -> Json<HealthResponse> {
    let feedback_records = match state.store.count().await {
        Ok(count) => Some(count),
        Err(e) => {
            warn!("Health check could not count feedback: {}", e);
            None
        }
    };

    Json(HealthResponse {
        status: if feedback_records.is_some() {
            "healthy".to_string()
        } else {
            "degraded".to_string()
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        feedback_records,
    })
}

// ============================================================================
// Diagnosis Relay Routes
// ============================================================================

pub fn diagnose_routes() -> Router<AppStateArc> {
    Router::new().route("/diagnose", post(diagnose))
}

async fn diagnose(
    State(state): State<AppStateArc>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<DiagnosisResult>, ApiError> {
    const MISSING_LOCATIONS: &str = "Invalid request: 'locations' is required";

    let Json(body) = payload.map_err(|rejection| {
        warn!("Malformed diagnosis body: {}", rejection.body_text());
        ApiError::BadRequest(MISSING_LOCATIONS.to_string())
    })?;

    let locations: Vec<String> = body
        .get("locations")
        .cloned()
        .and_then(|v| serde_json::from_value(v).ok())
        .ok_or_else(|| {
            warn!("Diagnosis request without locations");
            ApiError::BadRequest(MISSING_LOCATIONS.to_string())
        })?;

    let request = SymptomForm::from_json(&body).to_request(locations);

    info!("Diagnosing for: {}", request.locations.join(", "));
    let result = state.diagnoser.diagnose(&request).await.map_err(|e| {
        error!("Diagnosis relay failed: {}", e);
        ApiError::Internal(e.to_string())
    })?;

    Ok(Json(result))
}
