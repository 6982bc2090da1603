use std::sync::Arc;

use medinv_core::catalog::DeviceCatalog;
use medinv_core::images::LocalImageStore;
use tokio::sync::Mutex;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// The one catalog for this process. The mutex serialises every catalog
    /// operation, reads included.
    pub catalog: Arc<Mutex<DeviceCatalog>>,
    /// Destination for uploaded device images.
    pub images: Arc<LocalImageStore>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(catalog: DeviceCatalog, config: ServerConfig) -> Self {
        let images = LocalImageStore::new(&config.upload_dir, config.upload_url_prefix.clone());
        Self {
            catalog: Arc::new(Mutex::new(catalog)),
            images: Arc::new(images),
            config: Arc::new(config),
        }
    }
}
