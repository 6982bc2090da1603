//! Group detail and filter option handlers.

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use medinv_core::grouping::find_group;
use medinv_core::stats::department_options;

use crate::error::{AppError, AppResult};
use crate::response::data;
use crate::state::AppState;

/// GET /api/v1/device-groups/{itm_code}
pub async fn get_group(
    State(state): State<AppState>,
    itm_code: Result<Path<String>, PathRejection>,
) -> AppResult<impl IntoResponse> {
    let Path(itm_code) = itm_code?;
    let catalog = state.catalog.lock().await;
    let group = find_group(catalog.records(), &itm_code)
        .ok_or_else(|| AppError::NotFound(format!("Device group '{itm_code}' not found")))?;
    Ok(data(group))
}

/// GET /api/v1/departments
pub async fn list_departments(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let catalog = state.catalog.lock().await;
    Ok(data(department_options(catalog.records())))
}
