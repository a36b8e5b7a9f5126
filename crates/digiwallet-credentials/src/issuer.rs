use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use digiwallet_core::{truncate_to_seconds, Claims, Did, ProofPurpose};
use digiwallet_identity::{
    credential_id, CredentialStatus, CryptoProvider, DefaultKeyPolicy, DidDocument,
    IdentityError, KeyMaterialStore, KeyPolicy, Proof, VerifiableCredential,
};
use digiwallet_storage::{Store, StoreExt};

use crate::error::CredentialError;

/// Key type used when a caller does not ask for one.
pub const DEFAULT_KEY_TYPE: &str = "Ed25519VerificationKey2020";

const DID_PREFIX: &str = "did:";

/// Options for minting an identifier.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IdentifierOptions {
    /// Caller-chosen method-specific identifier; random when absent.
    pub id: Option<String>,
    /// Verification key type; [`DEFAULT_KEY_TYPE`] when absent.
    pub key_type: Option<String>,
}

/// Input for issuing a credential.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CredentialRequest {
    pub issuer: String,
    pub subject: String,
    pub credential_types: Vec<String>,
    pub claims: Claims,
    /// Credential expires this many days after issuance. Zero means never.
    pub validity_days: Option<u32>,
    /// Local part of the credential id; random when absent.
    pub id: Option<String>,
    pub status: Option<CredentialStatus>,
}

/// Mints identifiers and issues signed credentials.
pub struct IssuerEngine {
    store: Arc<dyn Store>,
    keys: Arc<dyn KeyMaterialStore>,
    provider: Arc<dyn CryptoProvider>,
    key_policy: Arc<dyn KeyPolicy>,
}

impl IssuerEngine {
    pub fn new(
        store: Arc<dyn Store>,
        keys: Arc<dyn KeyMaterialStore>,
        provider: Arc<dyn CryptoProvider>,
    ) -> Self {
        Self {
            store,
            keys,
            provider,
            key_policy: Arc::new(DefaultKeyPolicy),
        }
    }

    /// Replace the policy that picks the signing verification method.
    pub fn with_key_policy(mut self, key_policy: Arc<dyn KeyPolicy>) -> Self {
        self.key_policy = key_policy;
        self
    }

    /// Mint a new DID with one Ed25519 verification method.
    ///
    /// The private key is stored first. If that write fails the error is
    /// logged and the document is still published; the identifier then has
    /// no usable signing key. A failure to store the document is returned.
    pub fn generate_identifier(
        &self,
        method: &str,
        options: &IdentifierOptions,
    ) -> Result<DidDocument, CredentialError> {
        let method = method.trim();
        if method.is_empty() || method.contains(':') {
            return Err(CredentialError::Validation(format!(
                "invalid DID method: {:?}",
                method
            )));
        }

        let did = match options.id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => Did::new(format!("did:{}:{}", method, id))
                .map_err(|e| CredentialError::Validation(e.to_string()))?,
            _ => Did::generate(method),
        };
        if self.store.contains(did.uri())? {
            return Err(CredentialError::Validation(format!(
                "identifier {} already exists",
                did
            )));
        }

        let key_type = options.key_type.as_deref().unwrap_or(DEFAULT_KEY_TYPE);
        let key = self
            .provider
            .generate_key_pair(key_type)
            .map_err(|e| match e {
                IdentityError::UnsupportedKeyType(kt) => {
                    CredentialError::KeyGeneration(format!("unsupported key type {}", kt))
                }
                other => CredentialError::KeyGeneration(other.to_string()),
            })?;

        let doc = DidDocument::new(
            did.clone(),
            key.key_type,
            key.public_key_jwk.clone(),
            digiwallet_core::now_seconds(),
        );
        let vm_id = did.key_id(1);

        if let Err(e) = self.keys.store_key(&vm_id, key.key_type, &key.private_key) {
            tracing::warn!(
                did = %did,
                vm = %vm_id,
                error = %e,
                "failed to persist private key; publishing document without a usable signing key"
            );
        }

        self.store.save(did.uri(), &doc)?;

        tracing::info!(did = %did, key_type = %key.key_type, "identifier created");
        Ok(doc)
    }

    /// Look up a stored DID document.
    pub fn resolve_identifier(&self, did: &str) -> Result<DidDocument, CredentialError> {
        match self.store.load::<DidDocument>(did) {
            Ok(doc) => Ok(doc),
            Err(e) if e.is_not_found() => {
                Err(CredentialError::NotFound(format!("identifier {}", did)))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// All stored DID documents. Entries that fail to load are skipped.
    pub fn list_identifiers(&self) -> Result<Vec<DidDocument>, CredentialError> {
        list_documents(self.store.as_ref())
    }

    /// Issue and persist a signed credential.
    pub fn issue_credential(
        &self,
        request: &CredentialRequest,
    ) -> Result<VerifiableCredential, CredentialError> {
        self.issue_credential_at(request, Utc::now())
    }

    /// [`issue_credential`](Self::issue_credential) with an explicit issuance clock.
    pub fn issue_credential_at(
        &self,
        request: &CredentialRequest,
        now: DateTime<Utc>,
    ) -> Result<VerifiableCredential, CredentialError> {
        let issuer = request.issuer.trim();
        let subject = request.subject.trim();
        if issuer.is_empty() {
            return Err(CredentialError::Validation("issuer must not be empty".into()));
        }
        if subject.is_empty() {
            return Err(CredentialError::Validation("subject must not be empty".into()));
        }
        let issuer_did =
            Did::new(issuer).map_err(|e| CredentialError::Validation(e.to_string()))?;

        let issued = truncate_to_seconds(now);
        let local_id = match request.id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => uuid::Uuid::new_v4().to_string(),
        };
        let id = credential_id(subject, &local_id);
        if self.store.contains(&id)? {
            return Err(CredentialError::Validation(format!(
                "credential {} already exists",
                id
            )));
        }

        let mut vc = VerifiableCredential::new(
            id,
            issuer_did.clone(),
            &request.credential_types,
            subject,
            request.claims.clone(),
            issued,
        )?;
        if let Some(days) = request.validity_days.filter(|d| *d > 0) {
            let expires = issued
                .checked_add_signed(Duration::days(i64::from(days)))
                .ok_or_else(|| {
                    CredentialError::Validation(format!("validity_days {} out of range", days))
                })?;
            vc = vc.with_expiration(expires);
        }
        if let Some(status) = &request.status {
            vc = vc.with_status(status.clone());
        }

        let vm = self.key_policy.signing_method(&issuer_did);
        let (_, private_key) = self.keys.load_key(&vm)?;
        let signature = self
            .provider
            .sign_document(&vc.signing_document()?, &private_key)?;
        vc.proof = Some(Proof::new(
            ProofPurpose::AssertionMethod,
            vm,
            signature,
            issued,
        ));

        self.store.save(&vc.id, &vc)?;

        tracing::info!(
            issuer = %issuer_did,
            subject,
            credential_id = %vc.id,
            expires = ?vc.expiration_date,
            "credential issued"
        );
        Ok(vc)
    }
}

/// Load every document stored under a `did:` key, skipping unreadable ones.
pub(crate) fn list_documents(store: &dyn Store) -> Result<Vec<DidDocument>, CredentialError> {
    let mut docs = Vec::new();
    for key in store.list_keys(DID_PREFIX)? {
        match store.load::<DidDocument>(&key) {
            Ok(doc) => docs.push(doc),
            Err(e) => tracing::warn!(key = %key, error = %e, "skipping unreadable identifier"),
        }
    }
    Ok(docs)
}
