use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::StorageError;

/// Key/value persistence contract.
///
/// Writes to one key are serialized; a concurrent read observes either the
/// previous or the new value, never a partial one. There are no cross-key
/// transactions.
pub trait Store: Send + Sync {
    /// Store a JSON value under `key`, replacing any previous value.
    fn save_value(&self, key: &str, value: Value) -> Result<(), StorageError>;

    /// Load the JSON value stored under `key`.
    fn load_value(&self, key: &str) -> Result<Value, StorageError>;

    /// All keys starting with `prefix`, sorted ascending. An empty prefix matches every key.
    fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StorageError>;

    /// Whether `key` currently holds a value.
    fn contains(&self, key: &str) -> Result<bool, StorageError> {
        match self.load_value(key) {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Typed save/load on top of any [`Store`].
pub trait StoreExt: Store {
    fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let value = serde_json::to_value(value).map_err(|source| StorageError::Serialization {
            key: key.to_string(),
            source,
        })?;
        self.save_value(key, value)
    }

    fn load<T: DeserializeOwned>(&self, key: &str) -> Result<T, StorageError> {
        let value = self.load_value(key)?;
        serde_json::from_value(value).map_err(|source| StorageError::Deserialization {
            key: key.to_string(),
            source,
        })
    }
}

impl<S: Store + ?Sized> StoreExt for S {}
