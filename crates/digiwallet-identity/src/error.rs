use digiwallet_core::{CoreError, ProofPurpose};
use digiwallet_crypto::CryptoError;
use digiwallet_storage::StorageError;

/// Identity layer errors.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("DID not found: {0}")]
    DidNotFound(String),

    #[error("verification method not found: {0}")]
    VerificationMethodNotFound(String),

    #[error("verification method {vm} is not authorized for {purpose}")]
    MethodNotAuthorized { vm: String, purpose: ProofPurpose },

    #[error("invalid DID document {did}: {reason}")]
    InvalidDocument { did: String, reason: String },

    #[error("unsupported key type: {0}")]
    UnsupportedKeyType(String),

    #[error("no key material for {0}")]
    KeyNotFound(String),

    #[error("corrupt key material for {vm}: {reason}")]
    CorruptKeyMaterial { vm: String, reason: String },

    #[error("claim {claim} does not match its committed digest")]
    ClaimDigestMismatch { claim: String },

    #[error("claim {claim} has no committed digest")]
    UncommittedClaim { claim: String },

    #[error("malformed document: {0}")]
    Malformed(String),

    #[error("core error: {0}")]
    Core(#[from] CoreError),

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<serde_json::Error> for IdentityError {
    fn from(e: serde_json::Error) -> Self {
        Self::Malformed(e.to_string())
    }
}
