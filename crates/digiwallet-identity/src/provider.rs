//! Signing and verification seam.
//!
//! A provider canonicalizes documents with JCS before any signature
//! operation, so identical logical content always signs identically.

use serde_json::Value;
use std::sync::Arc;
use zeroize::Zeroizing;

use digiwallet_core::{Did, KeyType};
use digiwallet_crypto::{sign, verify, CanonicalBytes, Jwk, KeyPair, Signature};

use crate::credential::VerifiableCredential;
use crate::error::IdentityError;
use crate::presentation::VerifiablePresentation;
use crate::proof::Proof;
use crate::resolver::DidResolver;

/// Freshly generated key material.
pub struct GeneratedKey {
    pub key_type: KeyType,
    pub private_key: Zeroizing<Vec<u8>>,
    pub public_key_jwk: Jwk,
}

/// Key generation, document signing, and proof verification.
pub trait CryptoProvider: Send + Sync {
    /// Generate a new key pair; unknown key types fail with `UnsupportedKeyType`.
    fn generate_key_pair(&self, key_type: &str) -> Result<GeneratedKey, IdentityError>;

    /// Sign the canonical form of `document` (any `proof` member excluded).
    fn sign_document(&self, document: &Value, private_key: &[u8]) -> Result<String, IdentityError>;

    /// Check `proof` against the canonical form of `payload` (its `proof` member excluded).
    ///
    /// `Ok(false)` for a wrong key, a tampered payload, or a malformed
    /// signature; `Err` when the verification method cannot be resolved or
    /// is not listed for the proof's purpose.
    fn verify_signature(&self, proof: &Proof, payload: &Value) -> Result<bool, IdentityError>;
}

/// Ed25519 provider resolving public keys through a [`DidResolver`].
pub struct Ed25519Provider {
    resolver: Arc<dyn DidResolver>,
}

impl Ed25519Provider {
    pub fn new(resolver: Arc<dyn DidResolver>) -> Self {
        Self { resolver }
    }
}

fn canonical_without_proof(document: &Value) -> Result<CanonicalBytes, IdentityError> {
    match document {
        Value::Object(map) if map.contains_key("proof") => {
            let mut stripped = map.clone();
            stripped.remove("proof");
            Ok(CanonicalBytes::new(&stripped)?)
        }
        _ => Ok(CanonicalBytes::new(document)?),
    }
}

impl CryptoProvider for Ed25519Provider {
    fn generate_key_pair(&self, key_type: &str) -> Result<GeneratedKey, IdentityError> {
        let key_type: KeyType = key_type
            .parse()
            .map_err(|_| IdentityError::UnsupportedKeyType(key_type.to_string()))?;
        let kp = KeyPair::generate();
        Ok(GeneratedKey {
            key_type,
            private_key: Zeroizing::new(kp.to_keypair_bytes().to_vec()),
            public_key_jwk: kp.public_key().to_jwk(),
        })
    }

    fn sign_document(&self, document: &Value, private_key: &[u8]) -> Result<String, IdentityError> {
        let kp = KeyPair::from_keypair_bytes(private_key)?;
        let canonical = canonical_without_proof(document)?;
        Ok(sign(canonical.as_bytes(), &kp).to_base64url())
    }

    fn verify_signature(&self, proof: &Proof, payload: &Value) -> Result<bool, IdentityError> {
        let did = Did::controller_of(&proof.verification_method);
        let doc = self.resolver.resolve(did)?;
        let vm = doc
            .verification_method(&proof.verification_method)
            .ok_or_else(|| {
                IdentityError::VerificationMethodNotFound(proof.verification_method.clone())
            })?;
        if !doc.authorizes(&vm.id, proof.proof_purpose) {
            return Err(IdentityError::MethodNotAuthorized {
                vm: vm.id.clone(),
                purpose: proof.proof_purpose,
            });
        }
        let public_key = vm.public_key()?;

        let signature = match Signature::from_base64url(&proof.signature_value) {
            Ok(sig) => sig,
            Err(e) => {
                tracing::debug!(vm = %proof.verification_method, error = %e, "malformed signature value");
                return Ok(false);
            }
        };

        let canonical = canonical_without_proof(payload)?;
        Ok(verify(canonical.as_bytes(), &signature, &public_key).is_ok())
    }
}

/// Verify a credential's issuer proof and its disclosed claim digests.
///
/// Returns `Ok(false)` when the credential is unsigned or any check fails.
pub fn verify_credential_proof(
    provider: &dyn CryptoProvider,
    vc: &VerifiableCredential,
) -> Result<bool, IdentityError> {
    let Some(proof) = &vc.proof else {
        return Ok(false);
    };
    if !provider.verify_signature(proof, &vc.signing_document()?)? {
        return Ok(false);
    }
    match vc.verify_claim_digests() {
        Ok(()) => Ok(true),
        Err(e @ (IdentityError::ClaimDigestMismatch { .. } | IdentityError::UncommittedClaim { .. })) => {
            tracing::debug!(credential_id = %vc.id, error = %e, "claim digest check failed");
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

/// Verify a presentation's holder proof.
pub fn verify_presentation_proof(
    provider: &dyn CryptoProvider,
    vp: &VerifiablePresentation,
) -> Result<bool, IdentityError> {
    let Some(proof) = &vp.proof else {
        return Ok(false);
    };
    provider.verify_signature(proof, &vp.signing_document()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DidDocument;
    use crate::resolver::StoreDidResolver;
    use digiwallet_core::{now_seconds, ProofPurpose};
    use digiwallet_storage::{MemoryStore, Store, StoreExt};

    struct Fixture {
        provider: Ed25519Provider,
        did: Did,
        key: GeneratedKey,
    }

    fn fixture() -> Fixture {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let provider = Ed25519Provider::new(Arc::new(StoreDidResolver::new(Arc::clone(&store))));
        let key = provider
            .generate_key_pair("Ed25519VerificationKey2020")
            .unwrap();
        let did = Did::from_parts("example", "signer");
        let doc = DidDocument::new(did.clone(), key.key_type, key.public_key_jwk.clone(), now_seconds());
        store.save(did.uri(), &doc).unwrap();
        Fixture { provider, did, key }
    }

    fn proof_for(f: &Fixture, doc: &Value) -> Proof {
        let sig = f.provider.sign_document(doc, &f.key.private_key).unwrap();
        Proof::new(ProofPurpose::AssertionMethod, f.did.key_id(1), sig, now_seconds())
    }

    #[test]
    fn test_generate_unsupported_key_type() {
        let f = fixture();
        assert!(matches!(
            f.provider.generate_key_pair("RsaVerificationKey2018"),
            Err(IdentityError::UnsupportedKeyType(_))
        ));
    }

    #[test]
    fn test_generate_fresh_material() {
        let f = fixture();
        let a = f.provider.generate_key_pair("Ed25519VerificationKey2018").unwrap();
        let b = f.provider.generate_key_pair("Ed25519VerificationKey2018").unwrap();
        assert_eq!(a.private_key.len(), 64);
        assert_ne!(a.public_key_jwk, b.public_key_jwk);
        assert_ne!(&a.private_key[..], &b.private_key[..]);
    }

    #[test]
    fn test_sign_and_verify() {
        let f = fixture();
        let doc = serde_json::json!({"id": "doc-1", "claims": {"a": 1, "b": [1, 2]}});
        let proof = proof_for(&f, &doc);
        assert!(f.provider.verify_signature(&proof, &doc).unwrap());
    }

    #[test]
    fn test_field_order_does_not_matter() {
        let f = fixture();
        let doc = serde_json::json!({"a": 1, "b": {"x": true, "y": "z"}});
        let reordered: Value = serde_json::from_str(r#"{"b":{"y":"z","x":true},"a":1}"#).unwrap();
        assert_eq!(
            f.provider.sign_document(&doc, &f.key.private_key).unwrap(),
            f.provider.sign_document(&reordered, &f.key.private_key).unwrap()
        );
    }

    #[test]
    fn test_payload_proof_member_ignored() {
        let f = fixture();
        let doc = serde_json::json!({"id": "doc-1"});
        let proof = proof_for(&f, &doc);
        let mut with_proof = doc.clone();
        with_proof["proof"] = serde_json::to_value(&proof).unwrap();
        assert!(f.provider.verify_signature(&proof, &with_proof).unwrap());
    }

    #[test]
    fn test_tampered_payload_fails() {
        let f = fixture();
        let doc = serde_json::json!({"id": "doc-1", "amount": 10});
        let proof = proof_for(&f, &doc);
        let tampered = serde_json::json!({"id": "doc-1", "amount": 11});
        assert!(!f.provider.verify_signature(&proof, &tampered).unwrap());
    }

    #[test]
    fn test_wrong_key_fails() {
        let f = fixture();
        let other = f.provider.generate_key_pair("Ed25519VerificationKey2020").unwrap();
        let doc = serde_json::json!({"id": "doc-1"});
        let sig = f.provider.sign_document(&doc, &other.private_key).unwrap();
        let proof = Proof::new(ProofPurpose::AssertionMethod, f.did.key_id(1), sig, now_seconds());
        assert!(!f.provider.verify_signature(&proof, &doc).unwrap());
    }

    #[test]
    fn test_malformed_signature_fails() {
        let f = fixture();
        let doc = serde_json::json!({"id": "doc-1"});
        let mut proof = proof_for(&f, &doc);
        proof.signature_value = "%%%".into();
        assert!(!f.provider.verify_signature(&proof, &doc).unwrap());
        proof.signature_value = "AAAA".into();
        assert!(!f.provider.verify_signature(&proof, &doc).unwrap());
    }

    #[test]
    fn test_unknown_signer_is_error() {
        let f = fixture();
        let doc = serde_json::json!({"id": "doc-1"});
        let mut proof = proof_for(&f, &doc);
        proof.verification_method = "did:example:ghost#key-1".into();
        assert!(matches!(
            f.provider.verify_signature(&proof, &doc),
            Err(IdentityError::DidNotFound(_))
        ));
        proof.verification_method = f.did.key_id(2);
        assert!(matches!(
            f.provider.verify_signature(&proof, &doc),
            Err(IdentityError::VerificationMethodNotFound(_))
        ));
    }

    #[test]
    fn test_method_must_be_listed_for_purpose() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let provider = Ed25519Provider::new(Arc::new(StoreDidResolver::new(Arc::clone(&store))));
        let key = provider.generate_key_pair("Ed25519VerificationKey2020").unwrap();
        let did = Did::from_parts("example", "signer");
        let mut doc = DidDocument::new(did.clone(), key.key_type, key.public_key_jwk.clone(), now_seconds());
        doc.assertion_method.clear();
        store.save(did.uri(), &doc).unwrap();

        let payload = serde_json::json!({"id": "doc-1"});
        let sig = provider.sign_document(&payload, &key.private_key).unwrap();
        let auth = Proof::new(ProofPurpose::Authentication, did.key_id(1), sig.clone(), now_seconds());
        assert!(provider.verify_signature(&auth, &payload).unwrap());

        let assertion = Proof::new(ProofPurpose::AssertionMethod, did.key_id(1), sig, now_seconds());
        assert!(matches!(
            provider.verify_signature(&assertion, &payload),
            Err(IdentityError::MethodNotAuthorized { purpose: ProofPurpose::AssertionMethod, .. })
        ));
    }

    #[test]
    fn test_sign_with_bad_key_bytes() {
        let f = fixture();
        assert!(f
            .provider
            .sign_document(&serde_json::json!({}), &[0u8; 10])
            .is_err());
    }

    #[test]
    fn test_credential_proof_with_disclosure() {
        let f = fixture();
        let mut claims = digiwallet_core::Claims::new();
        claims.insert("name".into(), "Alice".into());
        claims.insert("degree".into(), "BSc".into());
        let mut vc = VerifiableCredential::new(
            "vc:did:example:alice:1".into(),
            f.did.clone(),
            &[],
            "did:example:alice",
            claims,
            now_seconds(),
        )
        .unwrap();
        let sig = f
            .provider
            .sign_document(&vc.signing_document().unwrap(), &f.key.private_key)
            .unwrap();
        vc.proof = Some(Proof::new(ProofPurpose::AssertionMethod, f.did.key_id(1), sig, now_seconds()));

        assert!(verify_credential_proof(&f.provider, &vc).unwrap());
        let disclosed = vc.disclose(&["degree".to_string()]);
        assert!(verify_credential_proof(&f.provider, &disclosed).unwrap());

        let mut forged = disclosed.clone();
        forged.credential_subject.insert("degree".into(), "PhD".into());
        assert!(!verify_credential_proof(&f.provider, &forged).unwrap());

        let mut unsigned = vc.clone();
        unsigned.proof = None;
        assert!(!verify_credential_proof(&f.provider, &unsigned).unwrap());
    }
}
