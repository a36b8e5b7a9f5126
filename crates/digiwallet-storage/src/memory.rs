use dashmap::DashMap;
use serde_json::Value;

use crate::error::StorageError;
use crate::store::Store;

/// Concurrent in-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sorted snapshot of every entry.
    pub(crate) fn snapshot(&self) -> Vec<(String, Value)> {
        let mut entries: Vec<(String, Value)> = self
            .entries
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}

impl Store for MemoryStore {
    fn save_value(&self, key: &str, value: Value) -> Result<(), StorageError> {
        if key.is_empty() {
            return Err(StorageError::EmptyKey);
        }
        self.entries.insert(key.to_string(), value);
        tracing::trace!(key, "value saved");
        Ok(())
    }

    fn load_value(&self, key: &str) -> Result<Value, StorageError> {
        self.entries
            .get(key)
            .map(|e| e.value().clone())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let mut keys: Vec<String> = self
            .entries
            .iter()
            .filter(|e| e.key().starts_with(prefix))
            .map(|e| e.key().clone())
            .collect();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreExt;
    use serde::{Deserialize, Serialize};
    use std::sync::Arc;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Record {
        name: String,
        count: u32,
    }

    #[test]
    fn test_save_and_load() {
        let store = MemoryStore::new();
        let rec = Record {
            name: "alice".into(),
            count: 3,
        };
        store.save("rec:1", &rec).unwrap();
        let loaded: Record = store.load("rec:1").unwrap();
        assert_eq!(loaded, rec);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_load_missing_is_not_found() {
        let store = MemoryStore::new();
        let err = store.load::<Record>("nope").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_empty_key_rejected() {
        let store = MemoryStore::new();
        let err = store.save("", &1).unwrap_err();
        assert!(matches!(err, StorageError::EmptyKey));
        assert!(store.is_empty());
    }

    #[test]
    fn test_overwrite() {
        let store = MemoryStore::new();
        store.save("k", &1).unwrap();
        store.save("k", &2).unwrap();
        assert_eq!(store.load::<i32>("k").unwrap(), 2);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_load_wrong_shape() {
        let store = MemoryStore::new();
        store.save("k", &"text").unwrap();
        let err = store.load::<Record>("k").unwrap_err();
        assert!(matches!(err, StorageError::Deserialization { .. }));
    }

    #[test]
    fn test_list_keys_by_prefix() {
        let store = MemoryStore::new();
        store.save("vc:b", &1).unwrap();
        store.save("vc:a", &1).unwrap();
        store.save("did:x", &1).unwrap();
        assert_eq!(store.list_keys("vc:").unwrap(), vec!["vc:a", "vc:b"]);
        assert_eq!(store.list_keys("").unwrap().len(), 3);
        assert!(store.list_keys("vp:").unwrap().is_empty());
    }

    #[test]
    fn test_contains() {
        let store = MemoryStore::new();
        store.save("k", &1).unwrap();
        assert!(store.contains("k").unwrap());
        assert!(!store.contains("other").unwrap());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writers_same_key() {
        let store = Arc::new(MemoryStore::new());
        let mut handles = Vec::new();
        for i in 0..32u32 {
            let store = Arc::clone(&store);
            handles.push(tokio::task::spawn_blocking(move || {
                let rec = Record {
                    name: format!("writer-{}", i),
                    count: i,
                };
                store.save("shared", &rec).unwrap();
                let seen: Record = store.load("shared").unwrap();
                assert_eq!(seen.name, format!("writer-{}", seen.count));
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(store.len(), 1);
    }
}
