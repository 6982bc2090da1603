//! Image upload route and static serving of stored images.

use axum::routing::post;
use axum::Router;
use tower_http::services::ServeDir;

use crate::config::ServerConfig;
use crate::handlers::images;
use crate::state::AppState;

/// ```text
/// POST /upload-image   -> upload_image (multipart: image, deviceId)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/upload-image", post(images::upload_image))
}

/// Serve the upload directory under its public prefix (root level).
pub fn static_router(config: &ServerConfig) -> Router<AppState> {
    let prefix = format!("/{}", config.upload_url_prefix.trim_matches('/'));
    Router::new().nest_service(&prefix, ServeDir::new(&config.upload_dir))
}
