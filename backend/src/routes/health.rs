use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use serde::Serialize;
use serde_json::{json, Value};

use crate::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    database: &'static str,
}

/// GET /health - liveness plus a store ping.
async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let (status, code, database) = if state.sessions.health().await {
        ("ok", StatusCode::OK, "up")
    } else {
        ("degraded", StatusCode::SERVICE_UNAVAILABLE, "down")
    };

    (
        code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            database,
        }),
    )
}

/// GET /api - network reachability probe used by the wallet client.
async fn network() -> Json<Value> {
    Json(json!({ "state": true, "message": "Good Network" }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .route("/api", get(network))
}
