use std::path::PathBuf;

/// Which [`RecordStore`](medinv_core::store::RecordStore) backs the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown store backend '{other}'")),
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    pub store_backend: StoreBackend,
    /// Required when `store_backend` is `Postgres`.
    pub database_url: Option<String>,
    /// Upper bound on a single record store call (default: `10`).
    pub store_timeout_secs: u64,
    /// Directory uploaded images are written to.
    pub upload_dir: PathBuf,
    /// Public URL prefix the upload directory is served under.
    pub upload_url_prefix: String,
    /// Default page size for list views (default: `9`).
    pub page_size: usize,
    /// Request body limit for uploads, in bytes (default: 10 MiB).
    pub max_upload_bytes: usize,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                        |
    /// |------------------------|--------------------------------|
    /// | `HOST`                 | `0.0.0.0`                      |
    /// | `PORT`                 | `3000`                         |
    /// | `CORS_ORIGINS`         | `http://localhost:3000`        |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                           |
    /// | `STORE_BACKEND`        | `postgres`                     |
    /// | `DATABASE_URL`         | (none)                         |
    /// | `STORE_TIMEOUT_SECS`   | `10`                           |
    /// | `UPLOAD_DIR`           | `public/uploads/device-images` |
    /// | `UPLOAD_URL_PREFIX`    | `/uploads/device-images`       |
    /// | `PAGE_SIZE`            | `9`                            |
    /// | `MAX_UPLOAD_BYTES`     | `10485760`                     |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let store_backend: StoreBackend = std::env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "postgres".into())
            .parse()
            .expect("STORE_BACKEND must be 'postgres' or 'memory'");

        let database_url = std::env::var("DATABASE_URL").ok();

        let store_timeout_secs: u64 = std::env::var("STORE_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".into())
            .parse()
            .expect("STORE_TIMEOUT_SECS must be a valid u64");

        let upload_dir = std::env::var("UPLOAD_DIR")
            .unwrap_or_else(|_| "public/uploads/device-images".into())
            .into();

        let upload_url_prefix = std::env::var("UPLOAD_URL_PREFIX")
            .unwrap_or_else(|_| medinv_core::images::DEFAULT_URL_PREFIX.into());

        let page_size: usize = std::env::var("PAGE_SIZE")
            .unwrap_or_else(|_| medinv_core::view::DEFAULT_PAGE_SIZE.to_string())
            .parse()
            .expect("PAGE_SIZE must be a valid usize");

        let max_upload_bytes: usize = std::env::var("MAX_UPLOAD_BYTES")
            .unwrap_or_else(|_| (10 * 1024 * 1024).to_string())
            .parse()
            .expect("MAX_UPLOAD_BYTES must be a valid usize");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            store_backend,
            database_url,
            store_timeout_secs,
            upload_dir,
            upload_url_prefix,
            page_size,
            max_upload_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_backend_parses_case_insensitively() {
        assert_eq!("Memory".parse::<StoreBackend>(), Ok(StoreBackend::Memory));
        assert_eq!(
            "postgresql".parse::<StoreBackend>(),
            Ok(StoreBackend::Postgres)
        );
        assert!("sqlite".parse::<StoreBackend>().is_err());
    }
}
