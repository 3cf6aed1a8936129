use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::Value as JsonValue;

use crate::collection::{CollectionStore, StoreError};

/// In-memory collection store.
///
/// Intended for tests/dev and as the reference implementation of the store
/// contract. Not optimized for performance. A missing collection reads as
/// empty, matching a fresh backing file.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    collections: RwLock<HashMap<String, Vec<JsonValue>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CollectionStore for InMemoryStore {
    fn get_collection(&self, name: &str) -> Result<Vec<JsonValue>, StoreError> {
        let collections = self
            .collections
            .read()
            .map_err(|_| StoreError::storage("lock poisoned"))?;
        Ok(collections.get(name).cloned().unwrap_or_default())
    }

    fn put_collection(&self, name: &str, records: Vec<JsonValue>) -> Result<(), StoreError> {
        let mut collections = self
            .collections
            .write()
            .map_err(|_| StoreError::storage("lock poisoned"))?;
        collections.insert(name.to_string(), records);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_collection_reads_as_empty() {
        let store = InMemoryStore::new();
        assert!(store.get_collection("medications").unwrap().is_empty());
    }

    #[test]
    fn put_replaces_the_whole_collection() {
        let store = InMemoryStore::new();
        store
            .put_collection("medications", vec![json!({"id": 1}), json!({"id": 2})])
            .unwrap();
        store.put_collection("medications", vec![json!({"id": 3})]).unwrap();
        assert_eq!(store.get_collection("medications").unwrap(), vec![json!({"id": 3})]);
    }
}
