//! Exporter HTTP server.
//!
//! One pull endpoint: `GET /metrics` runs a full poll and returns the
//! merged exposition. Every other path redirects there. `/healthz` is a
//! liveness probe.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use prometheus::Registry;
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::exposition;
use crate::scrape::ScrapeOrchestrator;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<ScrapeOrchestrator>,
    pub metrics_registry: Registry,
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

/// Create the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    let app_state = Arc::new(state);

    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/healthz", get(healthz_handler))
        .fallback(redirect_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Pull endpoint: one poll, one exposition.
async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    let summary = state.orchestrator.scrape().await;

    match exposition::render(summary.samples, &state.metrics_registry) {
        Ok(body) => (
            [(header::CONTENT_TYPE, exposition::content_type())],
            body,
        )
            .into_response(),
        Err(err) => {
            tracing::error!(error = %err, "exposition encoding failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Liveness probe.
async fn healthz_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Any other path redirects to the metrics endpoint.
async fn redirect_handler() -> Redirect {
    Redirect::permanent("/metrics")
}
