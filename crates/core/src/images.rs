//! Local-disk storage for device images.
//!
//! Stores uploaded bytes under a content-independent hashed file name and
//! returns the public URL to record on the device. The catalog never looks
//! inside the bytes or the URL.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use image::ImageFormat;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::CoreError;
use crate::types::DeviceId;

/// Default URL prefix under which stored images are served.
pub const DEFAULT_URL_PREFIX: &str = "/uploads/device-images";

/// Image formats accepted for upload.
const ACCEPTED_FORMATS: &[ImageFormat] = &[
    ImageFormat::Png,
    ImageFormat::Jpeg,
    ImageFormat::Gif,
    ImageFormat::WebP,
];

/// Length of the hex file stem.
const FILE_STEM_LEN: usize = 32;

/// Salts file stems so two uploads in the same clock tick still differ.
static UPLOAD_SEQ: AtomicU64 = AtomicU64::new(0);

/// Result of a successful store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredImage {
    pub url: String,
    pub file_name: String,
    pub size_bytes: usize,
}

/// Writes images into one directory and maps them to URLs under one prefix.
#[derive(Debug, Clone)]
pub struct LocalImageStore {
    dir: PathBuf,
    url_prefix: String,
}

impl LocalImageStore {
    pub fn new(dir: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        let url_prefix = url_prefix.into().trim_end_matches('/').to_string();
        Self {
            dir: dir.into(),
            url_prefix,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    /// Validate and write `bytes`, returning the URL they are served under.
    ///
    /// Fails with `Validation` on empty input or a non-image payload and
    /// with `WriteRejected` when the directory or file cannot be written.
    pub async fn store(
        &self,
        device_id: DeviceId,
        bytes: &[u8],
        original_filename: &str,
    ) -> Result<StoredImage, CoreError> {
        let original_filename = original_filename.trim();
        if original_filename.is_empty() {
            return Err(CoreError::Validation("Image file name is required".into()));
        }
        if bytes.is_empty() {
            return Err(CoreError::Validation("Image data is required".into()));
        }
        let format = sniff_format(bytes)?;

        let file_name = format!(
            "{}.{}",
            file_stem(device_id, original_filename),
            file_extension(original_filename, format)
        );

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| CoreError::WriteRejected(format!("create {}: {e}", self.dir.display())))?;
        let path = self.dir.join(&file_name);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| CoreError::WriteRejected(format!("write {}: {e}", path.display())))?;

        tracing::info!(device_id, file = %path.display(), size = bytes.len(), "Device image stored");

        Ok(StoredImage {
            url: format!("{}/{file_name}", self.url_prefix),
            file_name,
            size_bytes: bytes.len(),
        })
    }
}

fn sniff_format(bytes: &[u8]) -> Result<ImageFormat, CoreError> {
    match image::guess_format(bytes) {
        Ok(format) if ACCEPTED_FORMATS.contains(&format) => Ok(format),
        Ok(format) => Err(CoreError::Validation(format!(
            "Unsupported image format {format:?}. Supported: png, jpeg, gif, webp"
        ))),
        Err(_) => Err(CoreError::Validation(
            "Uploaded file is not a recognised image".into(),
        )),
    }
}

/// Unique stem from the original name, the device and the current instant.
fn file_stem(device_id: DeviceId, original_filename: &str) -> String {
    let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let seq = UPLOAD_SEQ.fetch_add(1, Ordering::Relaxed);
    let digest =
        Sha256::digest(format!("{original_filename}-{device_id}-{nanos}-{seq}").as_bytes());
    let mut hex = format!("{digest:x}");
    hex.truncate(FILE_STEM_LEN);
    hex
}

/// The original extension, lower-cased, or the sniffed format's canonical one.
fn file_extension(original_filename: &str, format: ImageFormat) -> String {
    Path::new(original_filename)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_ascii_lowercase)
        .or_else(|| format.extensions_str().first().map(|e| e.to_string()))
        .unwrap_or_else(|| "img".to_string())
}
