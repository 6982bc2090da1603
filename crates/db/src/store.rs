//! [`RecordStore`] backed by the `medical_devices` JSONB table.

use async_trait::async_trait;
use uuid::Uuid;

use medinv_core::device::{DevicePatch, DeviceRecord};
use medinv_core::error::CoreError;
use medinv_core::store::RecordStore;
use medinv_core::types::StoreKey;

use crate::repositories::DeviceDocumentRepo;
use crate::DbPool;

/// PostgreSQL record store. Keys are the row UUIDs.
#[derive(Clone)]
pub struct PgRecordStore {
    pool: DbPool,
}

impl PgRecordStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

/// Connection-level failures mean the store is unreachable; anything the
/// server itself refused is a rejected write.
fn map_sqlx(op: &str, err: sqlx::Error) -> CoreError {
    match err {
        sqlx::Error::Database(db) => CoreError::WriteRejected(format!("{op}: {db}")),
        other => CoreError::StoreUnavailable(format!("{op}: {other}")),
    }
}

/// Non-UUID keys cannot exist in this store.
fn parse_key(key: &StoreKey) -> Result<Uuid, CoreError> {
    Uuid::parse_str(key.as_str()).map_err(|_| CoreError::KeyNotFound(key.to_string()))
}

fn to_document<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, CoreError> {
    serde_json::to_value(value).map_err(|e| CoreError::Internal(e.to_string()))
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn fetch_all(&self) -> Result<Vec<(StoreKey, DeviceRecord)>, CoreError> {
        let rows = DeviceDocumentRepo::list_all(&self.pool)
            .await
            .map_err(|e| CoreError::StoreUnavailable(format!("fetch devices: {e}")))?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            match row.to_record() {
                Ok(record) => entries.push((row.key(), record)),
                Err(e) => {
                    tracing::warn!(store_key = %row.store_key, error = %e, "Skipping undecodable device document");
                }
            }
        }
        Ok(entries)
    }

    async fn insert(&self, record: &DeviceRecord) -> Result<StoreKey, CoreError> {
        let document = to_document(record)?;
        let row = DeviceDocumentRepo::insert(&self.pool, &document)
            .await
            .map_err(|e| map_sqlx("insert device", e))?;
        Ok(row.key())
    }

    async fn patch(&self, key: &StoreKey, patch: &DevicePatch) -> Result<(), CoreError> {
        let store_key = parse_key(key)?;
        let document = to_document(patch)?;
        let updated = DeviceDocumentRepo::merge_patch(&self.pool, store_key, &document)
            .await
            .map_err(|e| map_sqlx("update device", e))?;
        if !updated {
            return Err(CoreError::KeyNotFound(key.to_string()));
        }
        Ok(())
    }

    async fn delete(&self, key: &StoreKey) -> Result<(), CoreError> {
        let store_key = parse_key(key)?;
        let deleted = DeviceDocumentRepo::delete(&self.pool, store_key)
            .await
            .map_err(|e| map_sqlx("delete device", e))?;
        if !deleted {
            return Err(CoreError::KeyNotFound(key.to_string()));
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), CoreError> {
        crate::health_check(&self.pool)
            .await
            .map_err(|e| CoreError::StoreUnavailable(e.to_string()))
    }
}
