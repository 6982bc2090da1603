//! Repository for the `medical_devices` document table.
//!
//! Each device is one JSONB document. Partial updates are a shallow JSONB
//! merge, so keys absent from the patch keep their stored value.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::device_document::DeviceDocument;

/// Column list for `medical_devices` queries.
const COLUMNS: &str = "store_key, seq, document, created_at, updated_at";

/// Provides CRUD operations for device documents.
pub struct DeviceDocumentRepo;

impl DeviceDocumentRepo {
    /// Every document in insertion order.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<DeviceDocument>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM medical_devices ORDER BY seq");
        sqlx::query_as::<_, DeviceDocument>(&query)
            .fetch_all(pool)
            .await
    }

    /// Insert a document under a fresh key.
    pub async fn insert(
        pool: &PgPool,
        document: &serde_json::Value,
    ) -> Result<DeviceDocument, sqlx::Error> {
        let query = format!(
            "INSERT INTO medical_devices (store_key, document) \
             VALUES ($1, $2) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DeviceDocument>(&query)
            .bind(Uuid::new_v4())
            .bind(document)
            .fetch_one(pool)
            .await
    }

    /// Merge `patch` into the stored document. Returns `false` if the key is absent.
    pub async fn merge_patch(
        pool: &PgPool,
        store_key: Uuid,
        patch: &serde_json::Value,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE medical_devices \
             SET document = document || $2, updated_at = NOW() \
             WHERE store_key = $1",
        )
        .bind(store_key)
        .bind(patch)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a document. Returns `false` if the key is absent.
    pub async fn delete(pool: &PgPool, store_key: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM medical_devices WHERE store_key = $1")
            .bind(store_key)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
