//! Request middleware: shared-secret gate for feedback routes.
//!
//! The secret is a single static string from config, compared as-is.

use crate::error::ApiError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, warn};
use wellbot_common::{mask_secret, API_KEY_HEADER};

/// Expected value of the `x-api-key` header
#[derive(Clone)]
pub struct SharedSecret(Arc<str>);

impl SharedSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(Arc::from(secret.into()))
    }

    pub fn matches(&self, candidate: &str) -> bool {
        !candidate.is_empty() && candidate == &*self.0
    }
}

impl std::fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SharedSecret({})", mask_secret(&self.0))
    }
}

/// Extract the shared secret from the request headers
fn extract_api_key(request: &Request) -> Option<&str> {
    request.headers().get(API_KEY_HEADER)?.to_str().ok()
}

/// Reject requests whose `x-api-key` is absent or mismatched
pub async fn require_api_key(
    State(secret): State<SharedSecret>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    match extract_api_key(&request) {
        Some(key) if secret.matches(key) => {
            debug!("API key accepted for {} {}", request.method(), request.uri().path());
            Ok(next.run(request).await)
        }
        Some(key) => {
            warn!(
                "Rejected {} {}: API key mismatch ({})",
                request.method(),
                request.uri().path(),
                mask_secret(key)
            );
            Err(ApiError::Unauthorized)
        }
        None => {
            warn!(
                "Rejected {} {}: no API key",
                request.method(),
                request.uri().path()
            );
            Err(ApiError::Unauthorized)
        }
    }
}
