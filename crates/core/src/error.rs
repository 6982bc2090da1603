use crate::types::DeviceId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// No record with this domain id is present in the cached set.
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DeviceId },

    /// The store has no entry under this opaque key.
    #[error("Store key not found: {0}")]
    KeyNotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    /// The store could not be reached, or the call timed out.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Write rejected: {0}")]
    WriteRejected(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a missing device record.
    pub fn device_not_found(id: DeviceId) -> Self {
        CoreError::NotFound {
            entity: "Device",
            id,
        }
    }
}
