//! Key-value store abstraction
//!
//! The extension persists its options in `browser.storage.local`, an async
//! store of JSON values. The core only talks to it through [`KeyValueStore`].

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StorageError;

/// A set of key/value pairs read from or written to the store.
pub type StoreRecord = serde_json::Map<String, Value>;

/// Async key-value store with `browser.storage.local` semantics.
///
/// `get` returns only keys that exist. `set` merges the record into the
/// store, overwriting existing keys.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, keys: &[&str]) -> Result<StoreRecord, StorageError>;

    async fn set(&self, record: StoreRecord) -> Result<(), StorageError>;
}

/// One key's change as reported by `storage.onChanged`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageChange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<Value>,
}

/// Changes keyed by option name.
pub type StorageChanges = BTreeMap<String, StorageChange>;

/// Decode `key` from `record`. Missing keys and `null` give `None`.
pub fn decode_field<T: DeserializeOwned>(record: &StoreRecord, key: &str) -> Result<Option<T>, StorageError> {
    match record.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|source| StorageError::Decode {
                key: key.to_string(),
                source,
            }),
    }
}

/// Build a record from `(key, value)` pairs.
pub fn record_of<I, K>(pairs: I) -> StoreRecord
where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v)).collect()
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Mutex<StoreRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: StoreRecord) -> Self {
        Self {
            data: Mutex::new(record),
        }
    }

    /// Copy of everything currently stored.
    pub fn snapshot(&self) -> Result<StoreRecord, StorageError> {
        self.data
            .lock()
            .map(|data| data.clone())
            .map_err(|_| StorageError::Backend("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, keys: &[&str]) -> Result<StoreRecord, StorageError> {
        let data = self
            .data
            .lock()
            .map_err(|_| StorageError::Backend("memory store lock poisoned".to_string()))?;

        Ok(keys
            .iter()
            .filter_map(|&key| data.get(key).map(|v| (key.to_string(), v.clone())))
            .collect())
    }

    async fn set(&self, record: StoreRecord) -> Result<(), StorageError> {
        let mut data = self
            .data
            .lock()
            .map_err(|_| StorageError::Backend("memory store lock poisoned".to_string()))?;

        data.extend(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_memory_store_get_only_existing() {
        let store = MemoryStore::new();
        store
            .set(record_of([("current", json!("UA")), ("edit-mode", json!("text"))]))
            .await
            .unwrap();

        let got = store.get(&["current", "domains"]).await.unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got["current"], json!("UA"));
    }

    #[tokio::test]
    async fn test_memory_store_set_merges() {
        let store = MemoryStore::with_record(record_of([("a", json!(1)), ("b", json!(2))]));
        store.set(record_of([("b", json!(3))])).await.unwrap();

        let all = store.snapshot().unwrap();
        assert_eq!(all["a"], json!(1));
        assert_eq!(all["b"], json!(3));
    }

    #[test]
    fn test_decode_field() {
        let record = record_of([("n", json!(5)), ("null", Value::Null), ("s", json!("x"))]);
        assert_eq!(decode_field::<u32>(&record, "n").unwrap(), Some(5));
        assert_eq!(decode_field::<u32>(&record, "null").unwrap(), None);
        assert_eq!(decode_field::<u32>(&record, "missing").unwrap(), None);

        let err = decode_field::<u32>(&record, "s").unwrap_err();
        assert!(matches!(err, StorageError::Decode { ref key, .. } if key == "s"));
    }

    #[test]
    fn test_storage_change_shape() {
        let change: StorageChange =
            serde_json::from_value(json!({"oldValue": null, "newValue": "UA"})).unwrap();
        assert_eq!(change.new_value, Some(json!("UA")));

        let removed: StorageChange = serde_json::from_value(json!({"oldValue": "UA"})).unwrap();
        assert_eq!(removed.new_value, None);
    }
}
