//! Inventory dashboard handler.

use axum::extract::State;
use axum::response::IntoResponse;
use medinv_core::stats::InventorySummary;

use crate::error::AppResult;
use crate::response::data;
use crate::state::AppState;

/// GET /api/v1/dashboard
///
/// Aggregates over the whole cached set; list filters do not apply.
pub async fn get_dashboard(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let catalog = state.catalog.lock().await;
    Ok(data(InventorySummary::compute(catalog.records())))
}
