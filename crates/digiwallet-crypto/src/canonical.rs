//! JSON canonicalization (RFC 8785, JCS).
//!
//! [`CanonicalBytes`] is the only form that ever reaches a signer or a
//! digest. Two documents with the same logical content produce identical
//! bytes regardless of how their maps were built.

use serde::Serialize;

use crate::error::CryptoError;

/// Bytes produced by JCS canonicalization.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Canonicalize any serializable value.
    pub fn new(obj: &impl Serialize) -> Result<Self, CryptoError> {
        let value = serde_json::to_value(obj)?;
        let s = serde_jcs::to_string(&value)?;
        Ok(Self(s.into_bytes()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
