use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use digiwallet_core::{Did, KeyType, ProofPurpose, DID_CONTEXT};
use digiwallet_crypto::{Jwk, PublicKey};

use crate::error::IdentityError;

/// A verification method within a DID Document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMethod {
    /// Verification method identifier (`<did>#key-N`).
    pub id: String,
    #[serde(rename = "type")]
    pub key_type: KeyType,
    /// The DID that controls this verification method.
    pub controller: Did,
    pub public_key_jwk: Jwk,
}

impl VerificationMethod {
    /// Decode the public key carried by this method.
    pub fn public_key(&self) -> Result<PublicKey, IdentityError> {
        Ok(PublicKey::from_jwk(&self.public_key_jwk)?)
    }
}

/// W3C DID Document.
///
/// Created once when the identifier is minted and never mutated afterwards;
/// adding a key means minting a new identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DidDocument {
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    pub id: Did,
    pub verification_method: Vec<VerificationMethod>,
    /// Verification methods allowed to sign credentials.
    #[serde(default)]
    pub assertion_method: Vec<String>,
    /// Verification methods allowed to sign presentations.
    #[serde(default)]
    pub authentication: Vec<String>,
    pub created: DateTime<Utc>,
}

impl DidDocument {
    /// Create a document with a single verification method, `<did>#key-1`.
    pub fn new(id: Did, key_type: KeyType, public_key_jwk: Jwk, created: DateTime<Utc>) -> Self {
        let vm_id = id.key_id(1);
        let vm = VerificationMethod {
            id: vm_id.clone(),
            key_type,
            controller: id.clone(),
            public_key_jwk,
        };
        Self {
            context: vec![DID_CONTEXT.to_string()],
            id,
            verification_method: vec![vm],
            assertion_method: vec![vm_id.clone()],
            authentication: vec![vm_id],
            created,
        }
    }

    /// Look up a verification method by its full identifier.
    pub fn verification_method(&self, vm_id: &str) -> Option<&VerificationMethod> {
        self.verification_method.iter().find(|vm| vm.id == vm_id)
    }

    /// Whether `vm_id` is listed under the relationship matching `purpose`.
    pub fn authorizes(&self, vm_id: &str, purpose: ProofPurpose) -> bool {
        let listed = match purpose {
            ProofPurpose::AssertionMethod => &self.assertion_method,
            ProofPurpose::Authentication => &self.authentication,
        };
        listed.iter().any(|id| id == vm_id)
    }

    /// Check that method identifiers are unique and derived from the document id.
    pub fn validate(&self) -> Result<(), IdentityError> {
        let prefix = format!("{}#", self.id);
        let mut seen = HashSet::new();
        for vm in &self.verification_method {
            if !vm.id.starts_with(&prefix) {
                return Err(IdentityError::InvalidDocument {
                    did: self.id.to_string(),
                    reason: format!("verification method {} is not under {}", vm.id, self.id),
                });
            }
            if !seen.insert(vm.id.as_str()) {
                return Err(IdentityError::InvalidDocument {
                    did: self.id.to_string(),
                    reason: format!("duplicate verification method {}", vm.id),
                });
            }
        }
        for id in self.assertion_method.iter().chain(&self.authentication) {
            if !seen.contains(id.as_str()) {
                return Err(IdentityError::InvalidDocument {
                    did: self.id.to_string(),
                    reason: format!("relationship references unknown method {}", id),
                });
            }
        }
        Ok(())
    }
}
