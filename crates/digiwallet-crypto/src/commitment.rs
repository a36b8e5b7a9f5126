//! Salted per-claim commitments.
//!
//! Each claim is bound into a credential as `BLAKE3(salt || JCS([name, value]))`.
//! The digest is signed; the salt travels beside it unsigned so a holder can
//! drop both the value and its salt without invalidating the issuer's proof.

use rand::rngs::OsRng;
use rand::RngCore;
use serde::Serialize;

use crate::canonical::CanonicalBytes;
use crate::error::CryptoError;

/// 32-byte random salt for one claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimSalt([u8; 32]);

impl ClaimSalt {
    pub fn generate() -> Self {
        let mut salt = [0u8; 32];
        OsRng.fill_bytes(&mut salt);
        Self(salt)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(s)
            .map_err(|e| CryptoError::InvalidEncoding(format!("invalid salt hex: {}", e)))?;
        let arr: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
            CryptoError::InvalidEncoding(format!("salt must be 32 bytes, got {}", bytes.len()))
        })?;
        Ok(Self(arr))
    }
}

/// BLAKE3 digest binding one claim name and value to a salt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimDigest([u8; 32]);

impl ClaimDigest {
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(s)
            .map_err(|e| CryptoError::InvalidEncoding(format!("invalid digest hex: {}", e)))?;
        let arr: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
            CryptoError::InvalidEncoding(format!("digest must be 32 bytes, got {}", bytes.len()))
        })?;
        Ok(Self(arr))
    }
}

/// Commit to a single claim.
pub fn claim_digest(
    salt: &ClaimSalt,
    name: &str,
    value: &impl Serialize,
) -> Result<ClaimDigest, CryptoError> {
    let canonical = CanonicalBytes::new(&(name, value))?;
    let mut hasher = blake3::Hasher::new();
    hasher.update(&salt.0);
    hasher.update(canonical.as_bytes());
    Ok(ClaimDigest(*hasher.finalize().as_bytes()))
}

/// Recompute a claim digest and compare it with the expected one.
pub fn verify_claim_digest(
    salt: &ClaimSalt,
    name: &str,
    value: &impl Serialize,
    expected: &ClaimDigest,
) -> Result<bool, CryptoError> {
    Ok(claim_digest(salt, name, value)? == *expected)
}
