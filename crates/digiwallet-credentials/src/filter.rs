use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use digiwallet_identity::{VerifiableCredential, VerifiablePresentation};

/// Criteria for listing stored credentials. Unset fields match everything.
///
/// `active_only` and `expired_only` are evaluated independently, so setting
/// both matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CredentialFilter {
    pub issuer: Option<String>,
    pub subject_id: Option<String>,
    pub credential_type: Option<String>,
    /// No expiration, or expiration after now.
    pub active_only: bool,
    /// Expiration at or before now.
    pub expired_only: bool,
}

impl CredentialFilter {
    pub fn matches_at(&self, vc: &VerifiableCredential, now: DateTime<Utc>) -> bool {
        if let Some(issuer) = &self.issuer {
            if vc.issuer.uri() != issuer {
                return false;
            }
        }
        if let Some(subject) = &self.subject_id {
            if vc.subject_id() != Some(subject.as_str()) {
                return false;
            }
        }
        if let Some(t) = &self.credential_type {
            if !vc.has_type(t) {
                return false;
            }
        }
        if self.active_only && !vc.is_active_at(now) {
            return false;
        }
        if self.expired_only && !vc.is_expired_at(now) {
            return false;
        }
        true
    }
}

/// Criteria for listing stored presentations.
///
/// Credential-level criteria match when any embedded credential matches;
/// a presentation is active only while all of its credentials are.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PresentationFilter {
    pub holder: Option<String>,
    pub issuer: Option<String>,
    pub subject_id: Option<String>,
    pub credential_type: Option<String>,
    pub active_only: bool,
    pub expired_only: bool,
}

impl PresentationFilter {
    pub fn matches_at(&self, vp: &VerifiablePresentation, now: DateTime<Utc>) -> bool {
        if let Some(holder) = &self.holder {
            if vp.holder.uri() != holder {
                return false;
            }
        }
        let embedded = CredentialFilter {
            issuer: self.issuer.clone(),
            subject_id: self.subject_id.clone(),
            credential_type: self.credential_type.clone(),
            active_only: false,
            expired_only: false,
        };
        if embedded != CredentialFilter::default()
            && !vp
                .verifiable_credential
                .iter()
                .any(|vc| embedded.matches_at(vc, now))
        {
            return false;
        }
        if self.active_only && !vp.is_active_at(now) {
            return false;
        }
        if self.expired_only && !vp.is_expired_at(now) {
            return false;
        }
        true
    }
}
