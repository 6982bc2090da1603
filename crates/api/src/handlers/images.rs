//! Device image upload.
//!
//! Accepts a multipart body with an `image` file part and a `deviceId` text
//! part, writes the file under the upload directory and records its public
//! URL on the device.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use medinv_core::device::DeviceRecord;
use medinv_core::error::CoreError;
use medinv_core::types::DeviceId;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::response::data;
use crate::state::AppState;

/// Response body for a successful upload.
#[derive(Debug, Serialize)]
pub struct UploadResult {
    pub image_url: String,
    pub file_name: String,
    pub size_bytes: usize,
    pub device: DeviceRecord,
}

/// An `image` part as received.
struct ImagePart {
    file_name: String,
    bytes: Vec<u8>,
}

/// POST /api/v1/upload-image
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let mut image: Option<ImagePart> = None;
    let mut device_id: Option<DeviceId> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                image = Some(ImagePart {
                    file_name,
                    bytes: bytes.to_vec(),
                });
            }
            "deviceId" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                let id = text.trim().parse::<DeviceId>().map_err(|_| {
                    AppError::BadRequest(format!("deviceId must be an integer, got '{text}'"))
                })?;
                device_id = Some(id);
            }
            // Unknown parts are ignored.
            _ => {}
        }
    }

    let image = image.ok_or_else(|| CoreError::Validation("No file uploaded".into()))?;
    let device_id =
        device_id.ok_or_else(|| CoreError::Validation("Device ID is required".into()))?;

    let mut catalog = state.catalog.lock().await;
    // Reject unknown devices before anything touches the disk.
    catalog.get(device_id)?;

    let stored = state
        .images
        .store(device_id, &image.bytes, &image.file_name)
        .await?;
    let device = catalog.set_image_url(device_id, stored.url.clone()).await?;

    Ok((
        StatusCode::CREATED,
        data(UploadResult {
            image_url: stored.url,
            file_name: stored.file_name,
            size_bytes: stored.size_bytes,
            device,
        }),
    ))
}
