//! Health Routes
//!
//! Health check endpoints for monitoring.
//!
//! - GET /health/live - Liveness check (process is alive)
//! - GET /health - Full health status

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::HealthResponse;
use crate::api::state::AppState;

/// GET /health/live
///
/// Returns 200 if the process is alive, no dependency checks.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health
///
/// Reads the week index to prove the backend is reachable.
pub async fn full_health(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<HealthResponse>) {
    let index = state.with_store(|store| store.read_index()).await;

    let (status, code, weeks, events) = match &index {
        Ok(index) => (
            "healthy",
            StatusCode::OK,
            index.weeks.len(),
            index.total_events(),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not read the week index");
            ("unhealthy", StatusCode::SERVICE_UNAVAILABLE, 0, 0)
        }
    };

    (
        code,
        Json(HealthResponse {
            status: status.to_string(),
            backend: state.store.backend().kind().to_string(),
            storage: if index.is_ok() { "ok" } else { "error" }.to_string(),
            weeks,
            events,
            uptime_seconds: state.uptime_seconds(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}
