//! Handlers for the `/devices` resource.
//!
//! Every handler takes the catalog lock for its whole duration, so reads see
//! a consistent snapshot and mutations never interleave.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use medinv_core::device::{DevicePatch, DeviceRecord, NewDevice};
use medinv_core::types::DeviceId;
use medinv_core::view::list_view;
use serde::Serialize;

use crate::error::AppResult;
use crate::query::ListQuery;
use crate::response::data;
use crate::state::AppState;

/// Result of an explicit catalog reload.
#[derive(Debug, Serialize)]
pub struct ReloadResult {
    pub loaded: usize,
}

/// Result of a bulk import.
#[derive(Debug, Serialize)]
pub struct ImportResult {
    pub imported: usize,
    pub devices: Vec<DeviceRecord>,
}

/// GET /api/v1/devices
///
/// Filter, group (unless `grouped=false`), sort and paginate the cached set.
pub async fn list_devices(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> AppResult<impl IntoResponse> {
    let Query(query) = query?;
    let params = query.into_params(state.config.page_size);
    let catalog = state.catalog.lock().await;
    let view = list_view(catalog.records(), &params);
    tracing::debug!(
        total = view.total_items(),
        page = params.page,
        grouped = params.grouped,
        "Device list computed"
    );
    Ok(data(view))
}

/// POST /api/v1/devices
pub async fn create_device(
    State(state): State<AppState>,
    payload: Result<Json<NewDevice>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = payload?;
    let record = state.catalog.lock().await.create(input).await?;
    Ok((StatusCode::CREATED, data(record)))
}

/// GET /api/v1/devices/{id}
pub async fn get_device(
    State(state): State<AppState>,
    id: Result<Path<DeviceId>, PathRejection>,
) -> AppResult<impl IntoResponse> {
    let Path(id) = id?;
    let catalog = state.catalog.lock().await;
    let record = catalog.get(id)?.clone();
    Ok(data(record))
}

/// PUT /api/v1/devices/{id}
/// PATCH /api/v1/devices/{id}
///
/// Only the fields present in the body are written.
pub async fn update_device(
    State(state): State<AppState>,
    id: Result<Path<DeviceId>, PathRejection>,
    payload: Result<Json<DevicePatch>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Path(id) = id?;
    let Json(patch) = payload?;
    let record = state.catalog.lock().await.update(id, patch).await?;
    Ok(data(record))
}

/// DELETE /api/v1/devices/{id}
pub async fn delete_device(
    State(state): State<AppState>,
    id: Result<Path<DeviceId>, PathRejection>,
) -> AppResult<StatusCode> {
    let Path(id) = id?;
    state.catalog.lock().await.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/devices/import
///
/// Body is a JSON array of exported device records. Every record is
/// validated before any is written.
pub async fn import_devices(
    State(state): State<AppState>,
    payload: Result<Json<Vec<DeviceRecord>>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(records) = payload?;
    let devices = state.catalog.lock().await.import(records).await?;
    Ok((
        StatusCode::CREATED,
        data(ImportResult {
            imported: devices.len(),
            devices,
        }),
    ))
}

/// POST /api/v1/devices/reload
pub async fn reload_devices(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let loaded = state.catalog.lock().await.reload().await?;
    tracing::info!(loaded, "Device catalog reloaded on request");
    Ok(data(ReloadResult { loaded }))
}
