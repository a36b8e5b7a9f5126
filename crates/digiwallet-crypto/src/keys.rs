use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use zeroize::{Zeroize, Zeroizing};

use crate::error::CryptoError;
use crate::jwk::Jwk;

/// Length of an Ed25519 public key.
pub const PUBLIC_KEY_LENGTH: usize = 32;

/// Length of the stored keypair encoding (32-byte seed followed by the public key).
pub const KEYPAIR_LENGTH: usize = 64;

/// Ed25519 key pair for signing operations.
/// Private key material is zeroized on drop.
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    /// Generate a new random key pair using OS-provided entropy.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        Self { signing_key }
    }

    /// Create a key pair from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        Self { signing_key }
    }

    /// Restore a key pair from its 64-byte encoding.
    ///
    /// The trailing 32 bytes must be the public key derived from the seed;
    /// a mismatch means the stored material is corrupt.
    pub fn from_keypair_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != KEYPAIR_LENGTH {
            return Err(CryptoError::InvalidKeyLength {
                expected: KEYPAIR_LENGTH,
                actual: bytes.len(),
            });
        }
        let mut buf = [0u8; KEYPAIR_LENGTH];
        buf.copy_from_slice(bytes);
        let result = SigningKey::from_keypair_bytes(&buf)
            .map_err(|e| CryptoError::InvalidKey(format!("keypair mismatch: {}", e)));
        buf.zeroize();
        Ok(Self {
            signing_key: result?,
        })
    }

    /// The 64-byte keypair encoding, wiped from memory when dropped.
    pub fn to_keypair_bytes(&self) -> Zeroizing<[u8; KEYPAIR_LENGTH]> {
        Zeroizing::new(self.signing_key.to_keypair_bytes())
    }

    /// Get the public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            verifying_key: self.signing_key.verifying_key(),
        }
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }
}

/// Ed25519 public key for verification operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    verifying_key: VerifyingKey,
}

impl PublicKey {
    /// Create from raw bytes (32 bytes).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let bytes_arr: [u8; PUBLIC_KEY_LENGTH] =
            bytes.try_into().map_err(|_| CryptoError::InvalidKeyLength {
                expected: PUBLIC_KEY_LENGTH,
                actual: bytes.len(),
            })?;
        let verifying_key = VerifyingKey::from_bytes(&bytes_arr)
            .map_err(|e| CryptoError::InvalidKey(format!("invalid public key: {}", e)))?;
        Ok(Self { verifying_key })
    }

    /// Get the raw bytes (32 bytes).
    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LENGTH] {
        self.verifying_key.as_bytes()
    }

    /// Encode as hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.as_bytes())
    }

    /// Encode as unpadded base64url.
    pub fn to_base64url(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.as_bytes())
    }

    /// Decode from unpadded base64url.
    pub fn from_base64url(s: &str) -> Result<Self, CryptoError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(s)
            .map_err(|e| CryptoError::InvalidEncoding(format!("invalid base64url: {}", e)))?;
        Self::from_bytes(&bytes)
    }

    /// OKP JSON Web Key for this public key.
    pub fn to_jwk(&self) -> Jwk {
        Jwk::ed25519(self.to_base64url())
    }

    /// Read the public key back out of an OKP JSON Web Key.
    pub fn from_jwk(jwk: &Jwk) -> Result<Self, CryptoError> {
        jwk.check_ed25519()?;
        Self::from_base64url(&jwk.x)
    }

    pub(crate) fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }
}
