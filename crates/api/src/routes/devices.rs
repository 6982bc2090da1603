//! Route definitions for device records and derived views.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{devices, groups};
use crate::state::AppState;

/// Device routes mounted at `/api/v1`.
///
/// ```text
/// GET    /devices                 -> list_devices
/// POST   /devices                 -> create_device
/// POST   /devices/import          -> import_devices
/// POST   /devices/reload          -> reload_devices
/// GET    /devices/{id}            -> get_device
/// PUT    /devices/{id}            -> update_device
/// PATCH  /devices/{id}            -> update_device
/// DELETE /devices/{id}            -> delete_device
/// GET    /device-groups/{itm_code} -> get_group
/// GET    /departments             -> list_departments
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/devices",
            get(devices::list_devices).post(devices::create_device),
        )
        .route("/devices/import", post(devices::import_devices))
        .route("/devices/reload", post(devices::reload_devices))
        .route(
            "/devices/{id}",
            get(devices::get_device)
                .put(devices::update_device)
                .patch(devices::update_device)
                .delete(devices::delete_device),
        )
        .route("/device-groups/{itm_code}", get(groups::get_group))
        .route("/departments", get(groups::list_departments))
}
