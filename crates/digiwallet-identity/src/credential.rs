use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use digiwallet_core::{
    ClaimValue, Claims, Did, BASE_CREDENTIAL_TYPE, CREDENTIALS_CONTEXT, SUBJECT_ID_CLAIM,
};
use digiwallet_crypto::{claim_digest, verify_claim_digest, ClaimDigest, ClaimSalt};

use crate::error::IdentityError;
use crate::proof::Proof;

/// Storage key prefix and identifier scheme for credentials.
pub const CREDENTIAL_PREFIX: &str = "vc:";

/// Credential identifier: `vc:<subjectId>:<localId>`.
pub fn credential_id(subject_id: &str, local_id: &str) -> String {
    format!("{}{}:{}", CREDENTIAL_PREFIX, subject_id, local_id)
}

/// Reference to an external status (revocation) entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialStatus {
    pub id: String,
    #[serde(rename = "type")]
    pub status_type: String,
}

/// W3C Verifiable Credential.
///
/// Every subject claim other than the reserved `id` is bound into the
/// signature through a salted digest in `claimDigests`. The salts live in
/// `claimSalts`, outside the signed form, so unrevealed claims can be removed
/// together with their salts while the issuer's proof keeps verifying.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiableCredential {
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    pub id: String,
    #[serde(rename = "type")]
    pub types: Vec<String>,
    pub issuer: Did,
    pub issuance_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<DateTime<Utc>>,
    pub credential_subject: Claims,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_status: Option<CredentialStatus>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub claim_digests: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub claim_salts: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof: Option<Proof>,
}

impl VerifiableCredential {
    /// Build an unsigned credential and commit to each subject claim.
    ///
    /// The base type is always first. A caller-supplied `id` claim is
    /// discarded; the subject identifier always wins.
    pub fn new(
        id: String,
        issuer: Did,
        credential_types: &[String],
        subject_id: &str,
        claims: Claims,
        issuance_date: DateTime<Utc>,
    ) -> Result<Self, IdentityError> {
        let mut types = vec![BASE_CREDENTIAL_TYPE.to_string()];
        for t in credential_types {
            if !types.contains(t) {
                types.push(t.clone());
            }
        }

        let mut subject = claims;
        if subject.contains_key(SUBJECT_ID_CLAIM) {
            tracing::debug!(credential_id = %id, "ignoring caller-supplied subject id claim");
        }
        subject.insert(
            SUBJECT_ID_CLAIM.to_string(),
            ClaimValue::String(subject_id.to_string()),
        );

        let mut vc = Self {
            context: vec![CREDENTIALS_CONTEXT.to_string()],
            id,
            types,
            issuer,
            issuance_date,
            expiration_date: None,
            credential_subject: subject,
            credential_status: None,
            claim_digests: BTreeMap::new(),
            claim_salts: BTreeMap::new(),
            proof: None,
        };
        vc.commit_claims()?;
        Ok(vc)
    }

    pub fn with_expiration(mut self, expiration: DateTime<Utc>) -> Self {
        self.expiration_date = Some(expiration);
        self
    }

    pub fn with_status(mut self, status: CredentialStatus) -> Self {
        self.credential_status = Some(status);
        self
    }

    fn commit_claims(&mut self) -> Result<(), IdentityError> {
        for (name, value) in &self.credential_subject {
            if name == SUBJECT_ID_CLAIM {
                continue;
            }
            let salt = ClaimSalt::generate();
            let digest = claim_digest(&salt, name, value)?;
            self.claim_salts.insert(name.clone(), salt.to_hex());
            self.claim_digests.insert(name.clone(), digest.to_hex());
        }
        Ok(())
    }

    /// The subject's identifier from the reserved claim.
    pub fn subject_id(&self) -> Option<&str> {
        self.credential_subject
            .get(SUBJECT_ID_CLAIM)
            .and_then(ClaimValue::as_str)
    }

    pub fn has_type(&self, credential_type: &str) -> bool {
        self.types.iter().any(|t| t == credential_type)
    }

    pub fn is_signed(&self) -> bool {
        self.proof.is_some()
    }

    /// Not expired at `now`: no expiration, or expiration strictly after `now`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.expiration_date.map_or(true, |exp| exp > now)
    }

    /// Declares an expiration that is at or before `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_active_at(now)
    }

    /// The document the issuer signs.
    ///
    /// Proof and salts are dropped and the subject is reduced to its
    /// identifier; the claim digests carry the claim values.
    pub fn signing_document(&self) -> Result<Value, IdentityError> {
        let mut doc = serde_json::to_value(self)?;
        let obj = doc
            .as_object_mut()
            .ok_or_else(|| IdentityError::Malformed("credential is not a JSON object".into()))?;
        obj.remove("proof");
        obj.remove("claimSalts");
        let mut subject = serde_json::Map::new();
        if let Some(id) = self.credential_subject.get(SUBJECT_ID_CLAIM) {
            subject.insert(SUBJECT_ID_CLAIM.to_string(), serde_json::to_value(id)?);
        }
        obj.insert("credentialSubject".to_string(), Value::Object(subject));
        Ok(doc)
    }

    /// Check every disclosed claim against its signed digest.
    pub fn verify_claim_digests(&self) -> Result<(), IdentityError> {
        for (name, value) in &self.credential_subject {
            if name == SUBJECT_ID_CLAIM {
                continue;
            }
            let (Some(digest), Some(salt)) = (self.claim_digests.get(name), self.claim_salts.get(name))
            else {
                return Err(IdentityError::UncommittedClaim { claim: name.clone() });
            };
            let digest = ClaimDigest::from_hex(digest)?;
            let salt = ClaimSalt::from_hex(salt)?;
            if !verify_claim_digest(&salt, name, value, &digest)? {
                return Err(IdentityError::ClaimDigestMismatch { claim: name.clone() });
            }
        }
        Ok(())
    }

    /// Copy of this credential revealing only `reveal` (plus the subject id).
    ///
    /// Hidden claims lose their salts too; their digests stay so the issuer
    /// proof still verifies.
    pub fn disclose(&self, reveal: &[String]) -> Self {
        let keep = |name: &String| name == SUBJECT_ID_CLAIM || reveal.contains(name);
        let mut copy = self.clone();
        copy.credential_subject.retain(|name, _| keep(name));
        copy.claim_salts.retain(|name, _| keep(name));
        copy
    }

    /// Names of the claims present in the subject, excluding the subject id.
    pub fn claim_names(&self) -> impl Iterator<Item = &str> {
        self.credential_subject
            .keys()
            .map(String::as_str)
            .filter(|name| *name != SUBJECT_ID_CLAIM)
    }
}
