//! HTTP server for wellbotd

use crate::config::Config;
use crate::middleware::SharedSecret;
use crate::relay::{Diagnoser, OpenRouterDiagnoser};
use crate::routes;
use crate::store::FeedbackStore;
use anyhow::{Context, Result};
use axum::Router;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Application state shared across handlers
pub struct AppState {
    pub store: FeedbackStore,
    pub diagnoser: Arc<dyn Diagnoser>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(store: FeedbackStore, diagnoser: Arc<dyn Diagnoser>) -> Self {
        Self {
            store,
            diagnoser,
            start_time: Instant::now(),
        }
    }
}

fn with_layers(router: Router, body_limit: usize) -> Router {
    router
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Feedback and health routes
pub fn feedback_app(state: Arc<AppState>, secret: SharedSecret, body_limit: usize) -> Router {
    let router = Router::new()
        .merge(routes::feedback_routes(secret))
        .merge(routes::health_routes())
        .with_state(state);
    with_layers(router, body_limit)
}

/// `/diagnose` relay routes
pub fn relay_app(state: Arc<AppState>, body_limit: usize) -> Router {
    let router = Router::new()
        .merge(routes::diagnose_routes())
        .with_state(state);
    with_layers(router, body_limit)
}

/// Everything on a single router
pub fn combined_app(state: Arc<AppState>, secret: SharedSecret, body_limit: usize) -> Router {
    let router = Router::new()
        .merge(routes::feedback_routes(secret))
        .merge(routes::health_routes())
        .merge(routes::diagnose_routes())
        .with_state(state);
    with_layers(router, body_limit)
}

async fn serve(addr: &str, app: Router, what: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {} listener on {}", what, addr))?;
    info!("  {} listening on http://{}", what, addr);
    axum::serve(listener, app).await?;
    Ok(())
}

/// Open the store, build the relay and run the HTTP listeners
pub async fn run(config: Config) -> Result<()> {
    let store = FeedbackStore::open_path(&config.store.path)
        .await
        .context("Failed to open feedback store")?;

    if config.relay.api_key.is_none() {
        warn!("OPENROUTER_API_KEY not set; /diagnose will answer with a configuration error");
    }
    let diagnoser: Arc<dyn Diagnoser> = Arc::new(OpenRouterDiagnoser::new(config.relay.clone())?);

    let state = Arc::new(AppState::new(store, diagnoser));
    let secret = SharedSecret::new(config.server.api_key.clone());
    let limit = config.server.body_limit_bytes;

    if config.relay.listen_addr == config.server.listen_addr {
        let app = combined_app(state, secret, limit);
        return serve(&config.server.listen_addr, app, "Feedback + diagnosis").await;
    }

    let feedback = feedback_app(Arc::clone(&state), secret, limit);
    let relay = relay_app(state, limit);

    tokio::try_join!(
        serve(&config.server.listen_addr, feedback, "Feedback service"),
        serve(&config.relay.listen_addr, relay, "Diagnosis relay"),
    )?;
    Ok(())
}
