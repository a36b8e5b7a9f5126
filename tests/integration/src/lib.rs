//! Fixtures for the DigiWallet integration tests.
//!
//! A [`Deployment`] wires one issuer, one holder wallet, and a verifier over a
//! single shared document store, the way a co-located service would.

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;

use digiwallet_core::{Claims, Did};
use digiwallet_credentials::{
    CredentialRequest, IdentifierOptions, IssuerEngine, VerifierEngine, WalletEngine,
};
use digiwallet_identity::{
    Ed25519Provider, StoreDidResolver, StoreKeyMaterial, VerifiableCredential,
};
use digiwallet_storage::{MemoryStore, Store};

pub struct Deployment {
    pub store: Arc<dyn Store>,
    pub provider: Arc<Ed25519Provider>,
    pub keys: Arc<StoreKeyMaterial>,
    pub issuer: IssuerEngine,
    pub issuer_did: Did,
    pub wallet: WalletEngine,
}

impl Deployment {
    /// Fresh in-memory deployment with a minted issuer and holder.
    pub fn in_memory() -> Self {
        Self::over(Arc::new(MemoryStore::new()))
    }

    /// Deployment over an existing store, minting a new issuer and holder.
    pub fn over(store: Arc<dyn Store>) -> Self {
        let (provider, keys, issuer) = engines(&store);
        let issuer_did = issuer
            .generate_identifier("example", &IdentifierOptions::default())
            .expect("issuer identifier")
            .id;
        let holder = issuer
            .generate_identifier("example", &IdentifierOptions::default())
            .expect("holder identifier")
            .id;
        let wallet = WalletEngine::new(holder, Arc::clone(&store), keys.clone(), provider.clone());
        Self {
            store,
            provider,
            keys,
            issuer,
            issuer_did,
            wallet,
        }
    }

    /// Re-attach to a store that already holds the given issuer and holder.
    pub fn reopen(store: Arc<dyn Store>, issuer_did: Did, holder: Did) -> Self {
        let (provider, keys, issuer) = engines(&store);
        let wallet = WalletEngine::new(holder, Arc::clone(&store), keys.clone(), provider.clone());
        Self {
            store,
            provider,
            keys,
            issuer,
            issuer_did,
            wallet,
        }
    }

    pub fn holder(&self) -> &Did {
        self.wallet.holder()
    }

    pub fn verifier(&self) -> VerifierEngine {
        VerifierEngine::new(self.provider.clone())
    }

    /// Issue a `UniversityDegree` to the holder, as of `issued`.
    pub fn issue_degree_at(
        &self,
        validity_days: Option<u32>,
        issued: DateTime<Utc>,
    ) -> VerifiableCredential {
        let req = CredentialRequest {
            issuer: self.issuer_did.to_string(),
            subject: self.holder().to_string(),
            credential_types: vec!["UniversityDegree".into()],
            claims: degree_claims(),
            validity_days,
            ..Default::default()
        };
        self.issuer
            .issue_credential_at(&req, issued)
            .expect("issuance should succeed")
    }

    pub fn issue_degree(&self, validity_days: Option<u32>) -> VerifiableCredential {
        self.issue_degree_at(validity_days, Utc::now())
    }
}

fn engines(
    store: &Arc<dyn Store>,
) -> (Arc<Ed25519Provider>, Arc<StoreKeyMaterial>, IssuerEngine) {
    let provider = Arc::new(Ed25519Provider::new(Arc::new(StoreDidResolver::new(
        Arc::clone(store),
    ))));
    let keys = Arc::new(StoreKeyMaterial::new(Arc::clone(store)));
    let issuer = IssuerEngine::new(Arc::clone(store), keys.clone(), provider.clone());
    (provider, keys, issuer)
}

pub fn degree_claims() -> Claims {
    let mut claims = Claims::new();
    claims.insert("name".into(), "Alice Santos".into());
    claims.insert("degree".into(), "BSc Computer Science".into());
    claims.insert("graduationYear".into(), 2019i64.into());
    claims.insert("honours".into(), true.into());
    claims
}

/// Unique path for a file-backend test; the directory is created.
pub fn temp_store_path(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "digiwallet-it-{}-{}",
        name,
        uuid::Uuid::new_v4().simple()
    ));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir.join("wallet_store.jsonl")
}
