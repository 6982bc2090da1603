pub mod dashboard;
pub mod devices;
pub mod health;
pub mod images;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /devices                        list (filter, group, sort, page), create
/// /devices/reload                 reload the catalog from the store (POST)
/// /devices/{id}                   get, update (PUT/PATCH), delete
///
/// /device-groups/{itm_code}       group detail
/// /departments                    department filter options
///
/// /dashboard                      inventory summary
///
/// /upload-image                   attach an image to a device (multipart POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(devices::router())
        .merge(dashboard::router())
        .merge(images::router())
}
