use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;

use digiwallet_core::{truncate_to_seconds, Did, ProofPurpose};
use digiwallet_identity::{
    verify_credential_proof, verify_presentation_proof, CryptoProvider, DefaultKeyPolicy,
    DidDocument, KeyMaterialStore, KeyPolicy, Proof, VerifiableCredential,
    VerifiablePresentation, CREDENTIAL_PREFIX, PRESENTATION_PREFIX,
};
use digiwallet_storage::{Store, StoreExt};

use crate::error::CredentialError;
use crate::filter::{CredentialFilter, PresentationFilter};
use crate::issuer::list_documents;

/// Claim names to reveal, keyed by credential id.
///
/// A credential with no entry is presented with all of its claims.
pub type RevealFields = HashMap<String, Vec<String>>;

/// Holder-side store of identifiers, credentials, and presentations.
///
/// The wallet is bound to one holder DID, whose key signs every
/// presentation it builds.
pub struct WalletEngine {
    holder: Did,
    store: Arc<dyn Store>,
    keys: Arc<dyn KeyMaterialStore>,
    provider: Arc<dyn CryptoProvider>,
    key_policy: Arc<dyn KeyPolicy>,
}

impl WalletEngine {
    pub fn new(
        holder: Did,
        store: Arc<dyn Store>,
        keys: Arc<dyn KeyMaterialStore>,
        provider: Arc<dyn CryptoProvider>,
    ) -> Self {
        Self {
            holder,
            store,
            keys,
            provider,
            key_policy: Arc::new(DefaultKeyPolicy),
        }
    }

    pub fn with_key_policy(mut self, key_policy: Arc<dyn KeyPolicy>) -> Self {
        self.key_policy = key_policy;
        self
    }

    pub fn holder(&self) -> &Did {
        &self.holder
    }

    // ------------------------------------------------------------------
    // Identifiers
    // ------------------------------------------------------------------

    pub fn store_identifier(&self, doc: &DidDocument) -> Result<(), CredentialError> {
        if doc.id.uri().trim().is_empty() {
            return Err(CredentialError::Validation("identifier must not be empty".into()));
        }
        doc.validate()
            .map_err(|e| CredentialError::Validation(e.to_string()))?;
        self.store.save(doc.id.uri(), doc)?;
        tracing::debug!(did = %doc.id, "identifier stored");
        Ok(())
    }

    pub fn get_identifier(&self, did: &str) -> Result<DidDocument, CredentialError> {
        load_or_not_found(self.store.as_ref(), did, "identifier")
    }

    pub fn list_identifiers(&self) -> Result<Vec<DidDocument>, CredentialError> {
        list_documents(self.store.as_ref())
    }

    // ------------------------------------------------------------------
    // Credentials
    // ------------------------------------------------------------------

    pub fn store_credential(&self, vc: &VerifiableCredential) -> Result<(), CredentialError> {
        if vc.id.trim().is_empty() {
            return Err(CredentialError::Validation("credential id must not be empty".into()));
        }
        if !vc.id.starts_with(CREDENTIAL_PREFIX) {
            return Err(CredentialError::Validation(format!(
                "credential id {} must start with {}",
                vc.id, CREDENTIAL_PREFIX
            )));
        }
        self.store.save(&vc.id, vc)?;
        tracing::debug!(credential_id = %vc.id, "credential stored");
        Ok(())
    }

    pub fn get_credential(&self, id: &str) -> Result<VerifiableCredential, CredentialError> {
        load_or_not_found(self.store.as_ref(), id, "credential")
    }

    pub fn list_credentials(
        &self,
        filter: &CredentialFilter,
    ) -> Result<Vec<VerifiableCredential>, CredentialError> {
        self.list_credentials_at(filter, Utc::now())
    }

    pub fn list_credentials_at(
        &self,
        filter: &CredentialFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<VerifiableCredential>, CredentialError> {
        let all = list_prefixed::<VerifiableCredential>(self.store.as_ref(), CREDENTIAL_PREFIX)?;
        Ok(all.into_iter().filter(|vc| filter.matches_at(vc, now)).collect())
    }

    /// Holder-side check of a credential's issuer proof and claim digests.
    pub fn verify_credential(&self, vc: &VerifiableCredential) -> Result<bool, CredentialError> {
        if vc.proof.is_none() {
            return Err(CredentialError::Validation(format!(
                "credential {} has no proof",
                vc.id
            )));
        }
        Ok(verify_credential_proof(self.provider.as_ref(), vc)?)
    }

    // ------------------------------------------------------------------
    // Presentations
    // ------------------------------------------------------------------

    /// Assemble, sign, and persist a presentation of stored credentials.
    pub fn build_presentation(
        &self,
        vc_ids: &[String],
        reveal: &RevealFields,
        nonce: &str,
    ) -> Result<VerifiablePresentation, CredentialError> {
        self.build_presentation_at(vc_ids, reveal, nonce, Utc::now())
    }

    pub fn build_presentation_at(
        &self,
        vc_ids: &[String],
        reveal: &RevealFields,
        nonce: &str,
        now: DateTime<Utc>,
    ) -> Result<VerifiablePresentation, CredentialError> {
        if vc_ids.is_empty() {
            return Err(CredentialError::Validation(
                "at least one credential id is required".into(),
            ));
        }
        let nonce = nonce.trim();
        if nonce.is_empty() {
            return Err(CredentialError::Validation("nonce must not be empty".into()));
        }

        let mut credentials = Vec::with_capacity(vc_ids.len());
        for id in vc_ids {
            let vc = self.get_credential(id)?;
            let disclosed = match reveal.get(id) {
                Some(fields) => vc.disclose(fields),
                None => vc,
            };
            credentials.push(disclosed);
        }

        let created = truncate_to_seconds(now);
        let mut vp = VerifiablePresentation::new(self.holder.clone(), nonce, credentials, created);
        self.ensure_new_presentation(&vp.id)?;

        let vm = self.key_policy.signing_method(&self.holder);
        let (_, private_key) = self.keys.load_key(&vm)?;
        let signature = self
            .provider
            .sign_document(&vp.signing_document()?, &private_key)?;
        vp.proof = Some(Proof::new(ProofPurpose::Authentication, vm, signature, created));

        self.store.save(&vp.id, &vp)?;

        tracing::info!(
            holder = %self.holder,
            presentation_id = %vp.id,
            credentials = vp.verifiable_credential.len(),
            "presentation built"
        );
        Ok(vp)
    }

    pub fn store_presentation(&self, vp: &VerifiablePresentation) -> Result<(), CredentialError> {
        if vp.id.trim().is_empty() {
            return Err(CredentialError::Validation(
                "presentation id must not be empty".into(),
            ));
        }
        if !vp.id.starts_with(PRESENTATION_PREFIX) {
            return Err(CredentialError::Validation(format!(
                "presentation id {} must start with {}",
                vp.id, PRESENTATION_PREFIX
            )));
        }
        self.ensure_new_presentation(&vp.id)?;
        self.store.save(&vp.id, vp)?;
        tracing::debug!(presentation_id = %vp.id, "presentation stored");
        Ok(())
    }

    /// Presentations are never replaced; a reused nonce is rejected.
    fn ensure_new_presentation(&self, id: &str) -> Result<(), CredentialError> {
        if self.store.contains(id)? {
            return Err(CredentialError::Validation(format!(
                "presentation {} already exists",
                id
            )));
        }
        Ok(())
    }

    pub fn get_presentation(&self, id: &str) -> Result<VerifiablePresentation, CredentialError> {
        load_or_not_found(self.store.as_ref(), id, "presentation")
    }

    pub fn list_presentations(
        &self,
        filter: &PresentationFilter,
    ) -> Result<Vec<VerifiablePresentation>, CredentialError> {
        self.list_presentations_at(filter, Utc::now())
    }

    pub fn list_presentations_at(
        &self,
        filter: &PresentationFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<VerifiablePresentation>, CredentialError> {
        let all =
            list_prefixed::<VerifiablePresentation>(self.store.as_ref(), PRESENTATION_PREFIX)?;
        Ok(all.into_iter().filter(|vp| filter.matches_at(vp, now)).collect())
    }

    /// Holder-side check of a presentation's own proof. Not a full verification.
    pub fn verify_presentation(
        &self,
        vp: &VerifiablePresentation,
    ) -> Result<bool, CredentialError> {
        if vp.proof.is_none() {
            return Err(CredentialError::Validation(format!(
                "presentation {} has no proof",
                vp.id
            )));
        }
        Ok(verify_presentation_proof(self.provider.as_ref(), vp)?)
    }
}

fn load_or_not_found<T: serde::de::DeserializeOwned>(
    store: &dyn Store,
    key: &str,
    kind: &str,
) -> Result<T, CredentialError> {
    match store.load::<T>(key) {
        Ok(v) => Ok(v),
        Err(e) if e.is_not_found() => Err(CredentialError::NotFound(format!("{} {}", kind, key))),
        Err(e) => Err(e.into()),
    }
}

fn list_prefixed<T: serde::de::DeserializeOwned>(
    store: &dyn Store,
    prefix: &str,
) -> Result<Vec<T>, CredentialError> {
    let mut out = Vec::new();
    for key in store.list_keys(prefix)? {
        match store.load::<T>(&key) {
            Ok(v) => out.push(v),
            Err(e) => tracing::warn!(key = %key, error = %e, "skipping unreadable entry"),
        }
    }
    Ok(out)
}
