//! Record store contract and an in-process implementation.
//!
//! The store addresses documents by an opaque [`StoreKey`] that has nothing
//! to do with the domain id. Callers must first find the key by scanning
//! [`RecordStore::fetch_all`]; the catalog does that against its cache.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::device::{DevicePatch, DeviceRecord};
use crate::error::CoreError;
use crate::types::StoreKey;

/// A document store holding device records under opaque keys.
///
/// Errors are limited to [`CoreError::StoreUnavailable`],
/// [`CoreError::KeyNotFound`] and [`CoreError::WriteRejected`].
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Every record, in the store's iteration order.
    async fn fetch_all(&self) -> Result<Vec<(StoreKey, DeviceRecord)>, CoreError>;

    /// Persist a new document and return the key it was stored under.
    async fn insert(&self, record: &DeviceRecord) -> Result<StoreKey, CoreError>;

    /// Overwrite the fields present in `patch` on the document at `key`.
    async fn patch(&self, key: &StoreKey, patch: &DevicePatch) -> Result<(), CoreError>;

    async fn delete(&self, key: &StoreKey) -> Result<(), CoreError>;

    /// Cheap reachability probe for health reporting.
    async fn ping(&self) -> Result<(), CoreError> {
        self.fetch_all().await.map(|_| ())
    }
}

/// Insertion-ordered in-memory store.
///
/// Keys are `mem-{n}` with a monotonically increasing `n`. The store can be
/// switched offline to exercise `StoreUnavailable` paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<Vec<(StoreKey, DeviceRecord)>>,
    next_key: AtomicU64,
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with `records`, in order.
    pub fn with_records(records: impl IntoIterator<Item = DeviceRecord>) -> Self {
        let mut store = Self::new();
        let entries = records
            .into_iter()
            .map(|r| (store.allocate_key(), r))
            .collect();
        store.entries = RwLock::new(entries);
        store
    }

    /// While offline every call fails with `StoreUnavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn allocate_key(&self) -> StoreKey {
        let n = self.next_key.fetch_add(1, Ordering::SeqCst) + 1;
        StoreKey(format!("mem-{n}"))
    }

    fn ensure_online(&self) -> Result<(), CoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(CoreError::StoreUnavailable(
                "memory store is offline".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn fetch_all(&self) -> Result<Vec<(StoreKey, DeviceRecord)>, CoreError> {
        self.ensure_online()?;
        Ok(self.entries.read().await.clone())
    }

    async fn insert(&self, record: &DeviceRecord) -> Result<StoreKey, CoreError> {
        self.ensure_online()?;
        let key = self.allocate_key();
        self.entries.write().await.push((key.clone(), record.clone()));
        Ok(key)
    }

    async fn patch(&self, key: &StoreKey, patch: &DevicePatch) -> Result<(), CoreError> {
        self.ensure_online()?;
        let mut entries = self.entries.write().await;
        let (_, record) = entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .ok_or_else(|| CoreError::KeyNotFound(key.to_string()))?;
        record.apply_patch(patch);
        Ok(())
    }

    async fn delete(&self, key: &StoreKey) -> Result<(), CoreError> {
        self.ensure_online()?;
        let mut entries = self.entries.write().await;
        let position = entries
            .iter()
            .position(|(k, _)| k == key)
            .ok_or_else(|| CoreError::KeyNotFound(key.to_string()))?;
        entries.remove(position);
        Ok(())
    }

    async fn ping(&self) -> Result<(), CoreError> {
        self.ensure_online()
    }
}
