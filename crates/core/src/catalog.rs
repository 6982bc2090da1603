//! The device catalog: an owned, write-through cache of the record store.
//!
//! Every mutation writes to the store and then reloads the full set, so the
//! cache never diverges from what the store returned last. Mutations address
//! records by domain id; the opaque store key is recovered from the cache, so
//! a stale cache surfaces as [`CoreError::NotFound`].

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::device::{
    validate_new_device, validate_patch, DevicePatch, DeviceRecord, NewDevice,
};
use crate::error::CoreError;
use crate::store::RecordStore;
use crate::types::{DeviceId, StoreKey};

/// Default upper bound on a single store call.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(10);

pub struct DeviceCatalog {
    store: Arc<dyn RecordStore>,
    store_timeout: Duration,
    /// Parallel to `records`: `keys[i]` addresses `records[i]` in the store.
    keys: Vec<StoreKey>,
    records: Vec<DeviceRecord>,
    last_load_error: Option<String>,
}

impl DeviceCatalog {
    /// An empty catalog. Call [`DeviceCatalog::load_all`] before serving reads.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            store_timeout: DEFAULT_STORE_TIMEOUT,
            keys: Vec::new(),
            records: Vec::new(),
            last_load_error: None,
        }
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Read-only snapshot of the cached records, in store order.
    pub fn records(&self) -> &[DeviceRecord] {
        &self.records
    }

    /// The first cached record with this id.
    pub fn get(&self, id: DeviceId) -> Result<&DeviceRecord, CoreError> {
        self.position_of(id)
            .map(|i| &self.records[i])
            .ok_or_else(|| CoreError::device_not_found(id))
    }

    /// Message of the most recent failed load, cleared by the next success.
    pub fn last_load_error(&self) -> Option<&str> {
        self.last_load_error.as_deref()
    }

    /// Handle to the underlying store, for health probes.
    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    // -----------------------------------------------------------------------
    // Load
    // -----------------------------------------------------------------------

    /// Replace the cache with the store's full contents.
    ///
    /// On failure the previous cache is kept and the error is remembered in
    /// [`DeviceCatalog::last_load_error`].
    pub async fn load_all(&mut self) -> Result<usize, CoreError> {
        let store = Arc::clone(&self.store);
        match self.bounded("fetch_all", store.fetch_all()).await {
            Ok(entries) => {
                let (keys, records): (Vec<_>, Vec<_>) = entries.into_iter().unzip();
                self.keys = keys;
                self.records = records;
                self.last_load_error = None;
                tracing::debug!(count = self.records.len(), "Device catalog loaded");
                Ok(self.records.len())
            }
            Err(err) => {
                tracing::warn!(error = %err, cached = self.records.len(), "Device catalog load failed");
                self.last_load_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Alias for [`DeviceCatalog::load_all`].
    pub async fn reload(&mut self) -> Result<usize, CoreError> {
        self.load_all().await
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Validate, assign `id = max + 1`, insert, and resynchronize.
    ///
    /// The id is derived from this process's cache only; two writers racing
    /// against the same store can produce the same id.
    pub async fn create(&mut self, input: NewDevice) -> Result<DeviceRecord, CoreError> {
        let input = input.normalized();
        validate_new_device(&input)?;

        let id = next_id_after(self.max_id())?;
        let record = DeviceRecord::from_new(id, input);

        let store = Arc::clone(&self.store);
        let key = self.bounded("insert", store.insert(&record)).await?;
        tracing::info!(device_id = id, store_key = %key, itm_code = %record.itm_code, "Device created");

        self.load_all().await?;
        Ok(record)
    }

    /// Write only the fields present in `patch` and resynchronize.
    pub async fn update(
        &mut self,
        id: DeviceId,
        patch: DevicePatch,
    ) -> Result<DeviceRecord, CoreError> {
        let patch = patch.normalized();
        validate_patch(&patch)?;
        let key = self.key_for(id)?;

        let store = Arc::clone(&self.store);
        self.bounded("patch", store.patch(&key, &patch)).await?;
        tracing::info!(device_id = id, store_key = %key, "Device updated");

        self.load_all().await?;
        self.get(id).cloned()
    }

    /// Bulk-load exported records, validating every entry before writing any.
    ///
    /// A positive id that is not yet taken is kept; anything else gets the
    /// next `max + 1` in input order. A zero `originalId` takes the final id.
    /// Writes are not transactional: if the store fails partway the catalog
    /// reloads what did land and the store error is returned.
    pub async fn import(
        &mut self,
        records: Vec<DeviceRecord>,
    ) -> Result<Vec<DeviceRecord>, CoreError> {
        if records.is_empty() {
            return Err(CoreError::Validation(
                "Import must contain at least one record".to_string(),
            ));
        }

        let mut taken: HashSet<DeviceId> = self.records.iter().map(|r| r.id).collect();
        let mut max_id = self.max_id();
        let mut prepared = Vec::with_capacity(records.len());

        for (index, record) in records.into_iter().enumerate() {
            let requested = record.id;
            let original_id = record.original_id;
            let input = NewDevice::from(record).normalized();
            validate_new_device(&input).map_err(|err| match err {
                CoreError::Validation(msg) => {
                    CoreError::Validation(format!("record {}: {msg}", index + 1))
                }
                other => other,
            })?;

            let id = if requested > 0 && !taken.contains(&requested) {
                requested
            } else {
                next_id_after(max_id)?
            };
            taken.insert(id);
            max_id = max_id.max(id);

            let mut record = DeviceRecord::from_new(id, input);
            if original_id != 0 {
                record.original_id = original_id;
            }
            prepared.push(record);
        }

        let store = Arc::clone(&self.store);
        for (written, record) in prepared.iter().enumerate() {
            if let Err(err) = self.bounded("insert", store.insert(record)).await {
                tracing::error!(error = %err, written, total = prepared.len(), "Device import aborted");
                if let Err(reload_err) = self.load_all().await {
                    tracing::warn!(error = %reload_err, "Reload after failed import also failed");
                }
                return Err(err);
            }
        }
        tracing::info!(count = prepared.len(), "Devices imported");

        self.load_all().await?;
        Ok(prepared)
    }

    /// Remove the record and resynchronize.
    pub async fn delete(&mut self, id: DeviceId) -> Result<(), CoreError> {
        let key = self.key_for(id)?;

        let store = Arc::clone(&self.store);
        self.bounded("delete", store.delete(&key)).await?;
        tracing::info!(device_id = id, store_key = %key, "Device deleted");

        self.load_all().await?;
        Ok(())
    }

    /// Record an externally stored image URL on the device.
    pub async fn set_image_url(
        &mut self,
        id: DeviceId,
        url: impl Into<String>,
    ) -> Result<DeviceRecord, CoreError> {
        self.update(id, DevicePatch::image_url(url)).await
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn max_id(&self) -> DeviceId {
        self.records.iter().map(|r| r.id).max().unwrap_or(0)
    }

    fn position_of(&self, id: DeviceId) -> Option<usize> {
        self.records.iter().position(|r| r.id == id)
    }

    fn key_for(&self, id: DeviceId) -> Result<StoreKey, CoreError> {
        self.position_of(id)
            .map(|i| self.keys[i].clone())
            .ok_or_else(|| CoreError::device_not_found(id))
    }

    /// Run a store call under the configured timeout.
    async fn bounded<T, F>(&self, op: &'static str, call: F) -> Result<T, CoreError>
    where
        F: Future<Output = Result<T, CoreError>>,
    {
        match tokio::time::timeout(self.store_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(CoreError::StoreUnavailable(format!(
                "{op} timed out after {}s",
                self.store_timeout.as_secs_f64()
            ))),
        }
    }
}

fn next_id_after(max_id: DeviceId) -> Result<DeviceId, CoreError> {
    max_id
        .max(0)
        .checked_add(1)
        .ok_or_else(|| CoreError::Internal("device id space exhausted".to_string()))
}
