use std::fmt;

use serde::{Deserialize, Serialize};

/// Domain id of a single device record, assigned by the catalog.
pub type DeviceId = i64;

/// Store-assigned key addressing one record document.
///
/// Unrelated to [`DeviceId`]; only the store that issued it can interpret it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreKey(pub String);

impl StoreKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for StoreKey {
    fn from(value: String) -> Self {
        StoreKey(value)
    }
}
