//! Domain core for the medical-device inventory.
//!
//! Holds the device types, the list/dashboard view pipeline, the record
//! store contract and the catalog that caches it. No database dependencies
//! live here; the `db` crate supplies the PostgreSQL store.

pub mod catalog;
pub mod device;
pub mod error;
pub mod grouping;
pub mod images;
pub mod stats;
pub mod store;
pub mod types;
pub mod view;
