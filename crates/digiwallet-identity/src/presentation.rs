use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use digiwallet_core::{Did, BASE_PRESENTATION_TYPE, CREDENTIALS_CONTEXT};

use crate::credential::VerifiableCredential;
use crate::error::IdentityError;
use crate::proof::Proof;

/// Storage key prefix and identifier scheme for presentations.
pub const PRESENTATION_PREFIX: &str = "vp:";

/// Presentation identifier for a disclosure session: `vp:<nonce>`.
pub fn presentation_id(nonce: &str) -> String {
    format!("{}{}", PRESENTATION_PREFIX, nonce)
}

/// W3C Verifiable Presentation, signed by its holder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiablePresentation {
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    pub id: String,
    #[serde(rename = "type")]
    pub types: Vec<String>,
    pub verifiable_credential: Vec<VerifiableCredential>,
    pub holder: Did,
    /// Anti-replay value chosen for this disclosure session.
    pub nonce: String,
    pub created: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof: Option<Proof>,
}

impl VerifiablePresentation {
    /// Assemble an unsigned presentation.
    pub fn new(
        holder: Did,
        nonce: &str,
        credentials: Vec<VerifiableCredential>,
        created: DateTime<Utc>,
    ) -> Self {
        Self {
            context: vec![CREDENTIALS_CONTEXT.to_string()],
            id: presentation_id(nonce),
            types: vec![BASE_PRESENTATION_TYPE.to_string()],
            verifiable_credential: credentials,
            holder,
            nonce: nonce.to_string(),
            created,
            proof: None,
        }
    }

    /// The document the holder signs: everything but the proof.
    pub fn signing_document(&self) -> Result<Value, IdentityError> {
        let mut doc = serde_json::to_value(self)?;
        if let Some(obj) = doc.as_object_mut() {
            obj.remove("proof");
        }
        Ok(doc)
    }

    /// Every embedded credential is active at `now`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.verifiable_credential.iter().all(|vc| vc.is_active_at(now))
    }

    /// At least one embedded credential is expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.verifiable_credential.iter().any(|vc| vc.is_expired_at(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use digiwallet_core::{now_seconds, Claims};

    fn credential(exp: Option<DateTime<Utc>>) -> VerifiableCredential {
        let vc = VerifiableCredential::new(
            "vc:did:example:alice:1".into(),
            Did::from_parts("example", "issuer"),
            &[],
            "did:example:alice",
            Claims::new(),
            now_seconds(),
        )
        .unwrap();
        match exp {
            Some(e) => vc.with_expiration(e),
            None => vc,
        }
    }

    #[test]
    fn test_new_presentation() {
        let vp = VerifiablePresentation::new(
            Did::from_parts("example", "alice"),
            "n-123",
            vec![credential(None)],
            now_seconds(),
        );
        assert_eq!(vp.id, "vp:n-123");
        assert_eq!(vp.types, vec!["VerifiablePresentation"]);
        assert_eq!(vp.nonce, "n-123");
        assert!(vp.proof.is_none());
    }

    #[test]
    fn test_signing_document_excludes_proof() {
        let mut vp = VerifiablePresentation::new(
            Did::from_parts("example", "alice"),
            "n",
            vec![credential(None)],
            now_seconds(),
        );
        let before = vp.signing_document().unwrap();
        vp.proof = Some(Proof::new(
            digiwallet_core::ProofPurpose::Authentication,
            "did:example:alice#key-1".into(),
            "sig".into(),
            now_seconds(),
        ));
        assert_eq!(vp.signing_document().unwrap(), before);
    }

    #[test]
    fn test_activity_over_embedded_credentials() {
        let now = now_seconds();
        let vp = VerifiablePresentation::new(
            Did::from_parts("example", "alice"),
            "n",
            vec![
                credential(None),
                credential(Some(now - chrono::Duration::days(1))),
            ],
            now,
        );
        assert!(!vp.is_active_at(now));
        assert!(vp.is_expired_at(now));
    }

    #[test]
    fn test_serde_roundtrip() {
        let vp = VerifiablePresentation::new(
            Did::from_parts("example", "alice"),
            "n",
            vec![credential(None)],
            now_seconds(),
        );
        let json = serde_json::to_value(&vp).unwrap();
        assert_eq!(json["verifiableCredential"].as_array().unwrap().len(), 1);
        assert_eq!(json["holder"], "did:example:alice");
        let back: VerifiablePresentation = serde_json::from_value(json).unwrap();
        assert_eq!(back, vp);
    }
}
