//! Health and liveness endpoints.

use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::schemas::downloads::ProbeResponse;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(get_health, get_test), components(schemas(ProbeResponse)))]
pub struct HealthApi;

/// Register health-check routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(get_health))
        .route("/test", get(get_test))
}

/// Heartbeat endpoint.
///
/// Returns `{"status": "ok", "version": "..."}` with HTTP 200.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Server is healthy", body = Value)
    )
)]
pub async fn get_health() -> Json<Value> {
    Json(json!({
        "status":  "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Liveness probe kept for existing clients.
#[utoipa::path(
    get,
    path = "/test",
    tag = "health",
    responses(
        (status = 200, description = "API is reachable", body = ProbeResponse)
    )
)]
pub async fn get_test() -> Json<ProbeResponse> {
    Json(ProbeResponse {
        success: true,
        message: "API is working.".to_owned(),
    })
}

// ── Tests ──────────────────────────────────────────────────────────────────────
