use axum::extract::State;
use axum::{routing::get, Json, Router};
use medinv_core::store::RecordStore;
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok` when the store answers and the last load succeeded, else `degraded`.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    pub store_healthy: bool,
    /// Number of records currently cached.
    pub device_count: usize,
    /// Message of the most recent failed catalog load, if any.
    pub last_load_error: Option<String>,
}

/// GET /health -- returns service and record store health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let (store, device_count, last_load_error) = {
        let catalog = state.catalog.lock().await;
        (
            catalog.store().clone(),
            catalog.records().len(),
            catalog.last_load_error().map(str::to_string),
        )
    };

    let store_healthy = store.ping().await.is_ok();
    let status = if store_healthy && last_load_error.is_none() {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        store_healthy,
        device_count,
        last_load_error,
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
