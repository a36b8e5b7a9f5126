use chrono::{DateTime, Utc};
use std::fmt;

use digiwallet_identity::IdentityError;
use digiwallet_storage::StorageError;

/// Stage of the presentation verification pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationStage {
    Structure,
    HolderAuthentication,
    Credential,
    Policy,
}

impl fmt::Display for VerificationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Structure => write!(f, "structure"),
            Self::HolderAuthentication => write!(f, "holder authentication"),
            Self::Credential => write!(f, "credential"),
            Self::Policy => write!(f, "policy"),
        }
    }
}

/// Coarse error category for a transport layer to map onto its own status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    NotFound,
    Validation,
    Internal,
}

/// Credential lifecycle errors.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unsupported key type: {0}")]
    UnsupportedKeyType(String),

    #[error("signing key not found: {0}")]
    KeyNotFound(String),

    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    #[error("malformed presentation: {0}")]
    MalformedPresentation(String),

    #[error("malformed credential at index {index}: {reason}")]
    MalformedCredential { index: usize, reason: String },

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("credential {id} expired at {expired_at}")]
    ExpiredCredential {
        id: String,
        expired_at: DateTime<Utc>,
    },

    #[error("credential {0} has been revoked")]
    Revoked(String),

    #[error("rejected by policy {policy}: {reason}")]
    PolicyRejected { policy: String, reason: String },

    #[error("verification failed at {stage} stage{}: {source}", index_suffix(.index))]
    Verification {
        stage: VerificationStage,
        index: Option<usize>,
        source: Box<CredentialError>,
    },

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("identity error: {0}")]
    Identity(IdentityError),
}

fn index_suffix(index: &Option<usize>) -> String {
    index
        .map(|i| format!(" (credential index {})", i))
        .unwrap_or_default()
}

impl From<IdentityError> for CredentialError {
    fn from(e: IdentityError) -> Self {
        match e {
            IdentityError::DidNotFound(did) => Self::NotFound(format!("identifier {}", did)),
            IdentityError::UnsupportedKeyType(kt) => Self::UnsupportedKeyType(kt),
            IdentityError::KeyNotFound(vm) => Self::KeyNotFound(vm),
            IdentityError::CorruptKeyMaterial { vm, reason } => {
                Self::KeyNotFound(format!("{} ({})", vm, reason))
            }
            IdentityError::Storage(e) => Self::Storage(e),
            other => Self::Identity(other),
        }
    }
}

impl CredentialError {
    /// Category used when translating to a protocol-level response.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::NotFound(_) => ErrorClass::NotFound,
            Self::Storage(e) if e.is_not_found() => ErrorClass::NotFound,
            Self::Validation(_)
            | Self::UnsupportedKeyType(_)
            | Self::MalformedPresentation(_)
            | Self::MalformedCredential { .. }
            | Self::InvalidSignature(_)
            | Self::ExpiredCredential { .. }
            | Self::Revoked(_)
            | Self::PolicyRejected { .. }
            | Self::Verification { .. } => ErrorClass::Validation,
            Self::KeyNotFound(_)
            | Self::KeyGeneration(_)
            | Self::Storage(_)
            | Self::Identity(_) => ErrorClass::Internal,
        }
    }

    /// Pipeline stage and credential index of a verification failure.
    pub fn verification_stage(&self) -> Option<(VerificationStage, Option<usize>)> {
        match self {
            Self::Verification { stage, index, .. } => Some((*stage, *index)),
            _ => None,
        }
    }

    /// The underlying failure, unwrapping the pipeline stage context.
    pub fn root(&self) -> &CredentialError {
        match self {
            Self::Verification { source, .. } => source.root(),
            other => other,
        }
    }

    pub(crate) fn at_stage(self, stage: VerificationStage, index: Option<usize>) -> Self {
        Self::Verification {
            stage,
            index,
            source: Box::new(self),
        }
    }
}
