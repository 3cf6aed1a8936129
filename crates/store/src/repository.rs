//! Typed access on top of the whole-collection contract.
//!
//! The storage boundary stays whole-collection get/put. Serde typing and
//! record filtering happen on this side of it.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::collection::{CollectionStore, StoreError};

/// Load and deserialize every record of a collection.
pub fn load_all<T: DeserializeOwned>(
    store: &dyn CollectionStore,
    name: &str,
) -> Result<Vec<T>, StoreError> {
    store
        .get_collection(name)?
        .into_iter()
        .map(|record| {
            serde_json::from_value(record)
                .map_err(|e| StoreError::serialization(format!("{name}: {e}")))
        })
        .collect()
}

/// Serialize and persist a full collection.
pub fn save_all<T: Serialize>(
    store: &dyn CollectionStore,
    name: &str,
    records: &[T],
) -> Result<(), StoreError> {
    let records: Vec<JsonValue> = records
        .iter()
        .map(|record| {
            serde_json::to_value(record)
                .map_err(|e| StoreError::serialization(format!("{name}: {e}")))
        })
        .collect::<Result<_, _>>()?;
    store.put_collection(name, records)
}
