//! Private key custody.
//!
//! Key material is addressed by verification-method identifier, never by
//! DID. Which method signs for a DID is a [`KeyPolicy`] decision.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use zeroize::{Zeroize, Zeroizing};

use digiwallet_core::{Did, KeyType};
use digiwallet_storage::{Store, StoreExt};

use crate::error::IdentityError;

/// Storage key prefix for private key records.
pub const PRIVATE_KEY_PREFIX: &str = "privatekey:";

/// Stored private key for one verification method.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyMaterialRecord {
    pub key_type: KeyType,
    /// Standard base64 of the raw private key bytes.
    pub private_key: String,
}

impl Drop for KeyMaterialRecord {
    fn drop(&mut self) {
        self.private_key.zeroize();
    }
}

/// Mapping from verification-method identifier to private key bytes.
pub trait KeyMaterialStore: Send + Sync {
    /// Persist `private_key` for `vm_id`. The length must match `key_type`.
    fn store_key(
        &self,
        vm_id: &str,
        key_type: KeyType,
        private_key: &[u8],
    ) -> Result<(), IdentityError>;

    /// Load the key for `vm_id`; a length mismatch is reported as corruption.
    fn load_key(&self, vm_id: &str) -> Result<(KeyType, Zeroizing<Vec<u8>>), IdentityError>;
}

/// Key material kept in the shared document store under `privatekey:<vm-id>`.
pub struct StoreKeyMaterial {
    store: Arc<dyn Store>,
}

impl StoreKeyMaterial {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    fn key_for(vm_id: &str) -> String {
        format!("{}{}", PRIVATE_KEY_PREFIX, vm_id)
    }
}

impl KeyMaterialStore for StoreKeyMaterial {
    fn store_key(
        &self,
        vm_id: &str,
        key_type: KeyType,
        private_key: &[u8],
    ) -> Result<(), IdentityError> {
        if private_key.len() != key_type.private_key_len() {
            return Err(IdentityError::CorruptKeyMaterial {
                vm: vm_id.to_string(),
                reason: format!(
                    "{} expects {} bytes, got {}",
                    key_type,
                    key_type.private_key_len(),
                    private_key.len()
                ),
            });
        }
        let record = KeyMaterialRecord {
            key_type,
            private_key: STANDARD.encode(private_key),
        };
        self.store.save(&Self::key_for(vm_id), &record)?;
        Ok(())
    }

    fn load_key(&self, vm_id: &str) -> Result<(KeyType, Zeroizing<Vec<u8>>), IdentityError> {
        let record: KeyMaterialRecord = match self.store.load(&Self::key_for(vm_id)) {
            Ok(r) => r,
            Err(e) if e.is_not_found() => {
                return Err(IdentityError::KeyNotFound(vm_id.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        let bytes = Zeroizing::new(STANDARD.decode(&record.private_key).map_err(|e| {
            IdentityError::CorruptKeyMaterial {
                vm: vm_id.to_string(),
                reason: format!("invalid base64: {}", e),
            }
        })?);
        let expected = record.key_type.private_key_len();
        if bytes.len() != expected {
            return Err(IdentityError::CorruptKeyMaterial {
                vm: vm_id.to_string(),
                reason: format!("expected {} bytes, got {}", expected, bytes.len()),
            });
        }
        Ok((record.key_type, bytes))
    }
}

/// Chooses the verification method that signs on behalf of a DID.
pub trait KeyPolicy: Send + Sync {
    fn signing_method(&self, did: &Did) -> String;
}

/// One key per identifier: `<did>#key-1`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultKeyPolicy;

impl KeyPolicy for DefaultKeyPolicy {
    fn signing_method(&self, did: &Did) -> String {
        did.key_id(1)
    }
}
