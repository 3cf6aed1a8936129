//! The key-collection store contract.

use serde_json::Value as JsonValue;
use thiserror::Error;

/// Logical collection names used by this core.
pub mod collections {
    pub const MEDICATIONS: &str = "medications";
    pub const BATCHES: &str = "batches";
    pub const MOVEMENTS: &str = "movements";
    pub const ALERTS: &str = "alerts";
    pub const REORDER_SUGGESTIONS: &str = "reorder_suggestions";
    pub const PURCHASE_ORDERS: &str = "purchase_orders";
    pub const SUPPLIERS: &str = "suppliers";
}

/// Infrastructure-level storage error. Wrapped into a domain meaning only at
/// the service boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("storage failure: {0}")]
    Storage(String),
}

impl StoreError {
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}

/// Whole-collection get/put of JSON-serializable records.
///
/// This is everything the core requires from persistence: no schema
/// migration, no indexing, no query language. Each record carries a unique
/// `id` field; all filtering and sorting happens in core logic. Durability is
/// whatever the implementation guarantees, assumed crash-consistent at the
/// granularity of a single `put_collection`.
pub trait CollectionStore: Send + Sync {
    fn get_collection(&self, name: &str) -> Result<Vec<JsonValue>, StoreError>;

    fn put_collection(&self, name: &str, records: Vec<JsonValue>) -> Result<(), StoreError>;
}
