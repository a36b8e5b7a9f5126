/// Core type errors.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid DID format: {0}")]
    InvalidDid(String),

    #[error("unsupported key type: {0}")]
    UnsupportedKeyType(String),

    #[error("unknown proof purpose: {0}")]
    UnknownProofPurpose(String),
}
