//! Row model for the `medical_devices` document table.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use medinv_core::device::DeviceRecord;
use medinv_core::types::StoreKey;

/// A row from the `medical_devices` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DeviceDocument {
    pub store_key: Uuid,
    pub seq: i64,
    pub document: serde_json::Value,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl DeviceDocument {
    pub fn key(&self) -> StoreKey {
        StoreKey(self.store_key.to_string())
    }

    /// Decode the JSON document into a record.
    pub fn to_record(&self) -> Result<DeviceRecord, serde_json::Error> {
        DeviceRecord::deserialize(&self.document)
    }
}
