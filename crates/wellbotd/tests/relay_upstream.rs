//! OpenRouterDiagnoser against a stub chat-completion upstream.

use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use wellbot_common::SymptomForm;
use wellbotd::config::RelayConfig;
use wellbotd::relay::{Diagnoser, OpenRouterDiagnoser, RelayError};

const RELAY_KEY: &str = "stub-relay-key";

async fn overloaded() -> (StatusCode, &'static str) {
    (StatusCode::SERVICE_UNAVAILABLE, "overloaded")
}

async fn no_choices() -> Json<Value> {
    Json(json!({ "choices": [] }))
}

/// Echoes the model name back so the request shape can be checked
async fn answer(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let expected = format!("Bearer {}", RELAY_KEY);
    if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some(expected.as_str()) {
        return (StatusCode::UNAUTHORIZED, Json(json!({})));
    }
    let content = json!({
        "diagnosis": format!("**Strain** via {}", body["model"].as_str().unwrap_or("")),
        "recommendations": "Rest",
    })
    .to_string();
    (
        StatusCode::OK,
        Json(json!({ "choices": [{ "message": { "content": content } }] })),
    )
}

async fn spawn_upstream() -> String {
    let app = Router::new()
        .route("/fail", post(overloaded))
        .route("/empty", post(no_choices))
        .route("/ok", post(answer));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn diagnoser(endpoint: String) -> OpenRouterDiagnoser {
    OpenRouterDiagnoser::new(RelayConfig {
        endpoint,
        api_key: Some(RELAY_KEY.to_string()),
        model: "stub/model".to_string(),
        ..RelayConfig::default()
    })
    .unwrap()
}

fn request() -> wellbot_common::DiagnosisRequest {
    SymptomForm::default().to_request(vec!["left_elbow".to_string()])
}

#[tokio::test]
async fn test_upstream_error_carries_status_and_text() {
    let base = spawn_upstream().await;
    let err = diagnoser(format!("{}/fail", base))
        .diagnose(&request())
        .await
        .unwrap_err();

    assert!(matches!(
        &err,
        RelayError::Upstream { status: 503, body } if body == "overloaded"
    ));
    assert_eq!(err.to_string(), "OpenRouter API failed: 503 overloaded");
}

#[tokio::test]
async fn test_no_choices_is_empty_completion() {
    let base = spawn_upstream().await;
    let err = diagnoser(format!("{}/empty", base))
        .diagnose(&request())
        .await
        .unwrap_err();

    assert!(matches!(err, RelayError::EmptyCompletion));
    assert_eq!(err.to_string(), "Empty response from API");
}

#[tokio::test]
async fn test_completion_is_parsed_into_result() {
    let base = spawn_upstream().await;
    let result = diagnoser(format!("{}/ok", base))
        .diagnose(&request())
        .await
        .unwrap();

    assert_eq!(result.diagnosis, "**Strain** via stub/model");
    assert_eq!(result.recommendations, "Rest");
}
