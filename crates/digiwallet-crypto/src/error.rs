/// Cryptographic operation errors.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("signature verification failed")]
    SignatureVerificationFailed,

    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    #[error("canonicalization failed: {0}")]
    Canonicalization(String),
}

impl From<serde_json::Error> for CryptoError {
    fn from(e: serde_json::Error) -> Self {
        Self::Canonicalization(e.to_string())
    }
}
