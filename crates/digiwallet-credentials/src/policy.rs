//! Sufficiency rules for the final verification stage.
//!
//! Policies only see presentations that already passed structural,
//! holder, and per-credential checks.

use std::collections::HashSet;

use digiwallet_identity::VerifiablePresentation;

/// A caller-defined acceptance rule over a verified presentation.
pub trait PresentationPolicy: Send + Sync {
    /// Short name reported when the policy rejects.
    fn name(&self) -> &str;

    /// `Err(reason)` to reject the presentation.
    fn evaluate(&self, vp: &VerifiablePresentation) -> Result<(), String>;
}

/// Every listed type must appear on at least one embedded credential.
#[derive(Debug, Clone)]
pub struct RequireCredentialTypes(pub Vec<String>);

impl PresentationPolicy for RequireCredentialTypes {
    fn name(&self) -> &str {
        "required-credential-types"
    }

    fn evaluate(&self, vp: &VerifiablePresentation) -> Result<(), String> {
        let missing: Vec<&str> = self
            .0
            .iter()
            .filter(|t| !vp.verifiable_credential.iter().any(|vc| vc.has_type(t)))
            .map(String::as_str)
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(format!("missing credential types: {}", missing.join(", ")))
        }
    }
}

/// At least this many embedded credentials.
#[derive(Debug, Clone, Copy)]
pub struct MinimumCredentials(pub usize);

impl PresentationPolicy for MinimumCredentials {
    fn name(&self) -> &str {
        "minimum-credentials"
    }

    fn evaluate(&self, vp: &VerifiablePresentation) -> Result<(), String> {
        let count = vp.verifiable_credential.len();
        if count >= self.0 {
            Ok(())
        } else {
            Err(format!("expected at least {} credentials, got {}", self.0, count))
        }
    }
}

/// Every listed claim must be revealed by at least one embedded credential.
#[derive(Debug, Clone)]
pub struct RequireClaims(pub Vec<String>);

impl PresentationPolicy for RequireClaims {
    fn name(&self) -> &str {
        "required-claims"
    }

    fn evaluate(&self, vp: &VerifiablePresentation) -> Result<(), String> {
        let revealed: HashSet<&str> = vp
            .verifiable_credential
            .iter()
            .flat_map(|vc| vc.credential_subject.keys().map(String::as_str))
            .collect();
        let missing: Vec<&str> = self
            .0
            .iter()
            .map(String::as_str)
            .filter(|c| !revealed.contains(c))
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(format!("claims not revealed: {}", missing.join(", ")))
        }
    }
}

/// The presentation must carry the nonce the verifier handed out.
#[derive(Debug, Clone)]
pub struct ExpectedNonce(pub String);

impl PresentationPolicy for ExpectedNonce {
    fn name(&self) -> &str {
        "expected-nonce"
    }

    fn evaluate(&self, vp: &VerifiablePresentation) -> Result<(), String> {
        if vp.nonce == self.0 {
            Ok(())
        } else {
            Err(format!("nonce {} does not match the expected session nonce", vp.nonce))
        }
    }
}

/// Every embedded credential must come from a listed issuer.
#[derive(Debug, Clone)]
pub struct TrustedIssuers(pub HashSet<String>);

impl TrustedIssuers {
    pub fn new<I, S>(issuers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(issuers.into_iter().map(Into::into).collect())
    }
}

impl PresentationPolicy for TrustedIssuers {
    fn name(&self) -> &str {
        "trusted-issuers"
    }

    fn evaluate(&self, vp: &VerifiablePresentation) -> Result<(), String> {
        match vp
            .verifiable_credential
            .iter()
            .find(|vc| !self.0.contains(vc.issuer.uri()))
        {
            Some(vc) => Err(format!("issuer {} is not trusted", vc.issuer)),
            None => Ok(()),
        }
    }
}
