//! Health check handlers

use crate::state::AppState;
use crate::store::UserStore;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// "ok" or "unavailable"
    pub status: String,
    /// "connected" or "disconnected"
    pub database: String,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Liveness and store connectivity
#[utoipa::path(
    get,
    path = "/healthz",
    tag = "health",
    responses(
        (status = 200, description = "Service and store are up", body = HealthResponse),
        (status = 503, description = "Store unreachable", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (status, code, database) = match state.users.ping().await {
        Ok(()) => ("ok", StatusCode::OK, "connected"),
        Err(e) => {
            tracing::warn!(error = %e, "Store health check failed");
            ("unavailable", StatusCode::SERVICE_UNAVAILABLE, "disconnected")
        }
    };

    (
        code,
        Json(HealthResponse {
            status: status.to_string(),
            database: database.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: state.uptime_secs(),
        }),
    )
}
