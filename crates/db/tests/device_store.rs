//! Integration tests for the PostgreSQL record store.
//!
//! These need a live database (`DATABASE_URL`); run with `--ignored`.

use assert_matches::assert_matches;
use sqlx::PgPool;

use medinv_core::device::{DevicePatch, DeviceRecord};
use medinv_core::error::CoreError;
use medinv_core::store::RecordStore;
use medinv_core::types::StoreKey;
use medinv_db::repositories::DeviceDocumentRepo;
use medinv_db::PgRecordStore;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn record(id: i64, itm_code: &str) -> DeviceRecord {
    DeviceRecord {
        id,
        original_id: id,
        itm_code: itm_code.to_string(),
        device_name: "Ventilator".to_string(),
        model: "V-300".to_string(),
        manufacturer: "Draeger".to_string(),
        department: "ICU".to_string(),
        serial_number: format!("SN-{id}"),
        quantity: 1,
        date_received: "2024-02-01".to_string(),
        ..DeviceRecord::default()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn insert_then_fetch_in_insertion_order(pool: PgPool) {
    let store = PgRecordStore::new(pool);
    let k1 = store.insert(&record(1, "A")).await.unwrap();
    let k2 = store.insert(&record(2, "B")).await.unwrap();
    assert_ne!(k1, k2);

    let all = store.fetch_all().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].0, k1);
    assert_eq!(all[0].1, record(1, "A"));
    assert_eq!(all[1].1.itm_code, "B");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn patch_merges_into_document(pool: PgPool) {
    let store = PgRecordStore::new(pool);
    let key = store.insert(&record(1, "A")).await.unwrap();

    store
        .patch(&key, &DevicePatch::image_url("/uploads/device-images/x.png"))
        .await
        .unwrap();

    let all = store.fetch_all().await.unwrap();
    assert_eq!(
        all[0].1.image_url.as_deref(),
        Some("/uploads/device-images/x.png")
    );
    assert_eq!(all[0].1.device_name, "Ventilator");
    assert_eq!(all[0].1.quantity, 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn null_in_patch_clears_stored_field(pool: PgPool) {
    let store = PgRecordStore::new(pool);
    let mut seeded = record(1, "A");
    seeded.image_url = Some("/uploads/device-images/x.png".to_string());
    seeded.remarks = Some("keep".to_string());
    let key = store.insert(&seeded).await.unwrap();

    let patch = DevicePatch {
        image_url: Some(None),
        ..DevicePatch::default()
    };
    store.patch(&key, &patch).await.unwrap();

    let all = store.fetch_all().await.unwrap();
    assert_eq!(all[0].1.image_url, None);
    assert_eq!(all[0].1.remarks.as_deref(), Some("keep"));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn delete_removes_document(pool: PgPool) {
    let store = PgRecordStore::new(pool);
    let key = store.insert(&record(1, "A")).await.unwrap();
    store.insert(&record(2, "A")).await.unwrap();

    store.delete(&key).await.unwrap();

    let all = store.fetch_all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].1.id, 2);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn unknown_key_is_key_not_found(pool: PgPool) {
    let store = PgRecordStore::new(pool);
    let key = StoreKey(uuid::Uuid::new_v4().to_string());

    assert_matches!(
        store.patch(&key, &DevicePatch::image_url("/x")).await,
        Err(CoreError::KeyNotFound(_))
    );
    assert_matches!(store.delete(&key).await, Err(CoreError::KeyNotFound(_)));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn undecodable_documents_are_skipped(pool: PgPool) {
    DeviceDocumentRepo::insert(&pool, &serde_json::json!({ "id": "not-a-number" }))
        .await
        .unwrap();
    let store = PgRecordStore::new(pool);
    store.insert(&record(5, "A")).await.unwrap();

    let all = store.fetch_all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].1.id, 5);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn non_object_document_rejected(pool: PgPool) {
    let store = PgRecordStore::new(pool.clone());
    let result = DeviceDocumentRepo::insert(&pool, &serde_json::json!([1, 2, 3])).await;
    assert!(result.is_err());
    assert!(store.ping().await.is_ok());
}
