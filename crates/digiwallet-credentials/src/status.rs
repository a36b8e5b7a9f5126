use chrono::{DateTime, Utc};
use dashmap::DashMap;

use digiwallet_identity::VerifiableCredential;

use crate::error::CredentialError;

/// Revocation status lookup for embedded credentials.
pub trait StatusChecker: Send + Sync {
    /// `Err(CredentialError::Revoked)` if the credential must be rejected.
    fn check(&self, vc: &VerifiableCredential) -> Result<(), CredentialError>;
}

/// Passes every credential. Status references are logged but not resolved.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptingStatusChecker;

impl StatusChecker for AcceptingStatusChecker {
    fn check(&self, vc: &VerifiableCredential) -> Result<(), CredentialError> {
        if let Some(status) = &vc.credential_status {
            tracing::debug!(
                credential_id = %vc.id,
                status_id = %status.id,
                "status reference not resolved, accepting"
            );
        }
        Ok(())
    }
}

/// Local revocation list keyed by credential id or status id.
#[derive(Debug, Default)]
pub struct RevocationRegistry {
    revoked: DashMap<String, DateTime<Utc>>,
}

impl RevocationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Revoke a credential id or status id.
    pub fn revoke(&self, id: impl Into<String>) {
        let id = id.into();
        tracing::info!(id = %id, "credential revoked");
        self.revoked.insert(id, Utc::now());
    }

    /// Lift a revocation. Returns whether the id was revoked.
    pub fn reinstate(&self, id: &str) -> bool {
        self.revoked.remove(id).is_some()
    }

    pub fn is_revoked(&self, id: &str) -> bool {
        self.revoked.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.revoked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.revoked.is_empty()
    }
}

impl StatusChecker for RevocationRegistry {
    fn check(&self, vc: &VerifiableCredential) -> Result<(), CredentialError> {
        let status_revoked = vc
            .credential_status
            .as_ref()
            .is_some_and(|s| self.is_revoked(&s.id));
        if self.is_revoked(&vc.id) || status_revoked {
            return Err(CredentialError::Revoked(vc.id.clone()));
        }
        Ok(())
    }
}
