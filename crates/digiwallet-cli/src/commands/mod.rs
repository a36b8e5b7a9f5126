pub mod credentials;
pub mod did;
pub mod init;
pub mod issue;
pub mod present;
pub mod presentations;
pub mod verify;

use serde::Serialize;
use std::sync::Arc;

use digiwallet_core::Did;
use digiwallet_credentials::{IssuerEngine, VerifierEngine, WalletEngine};
use digiwallet_identity::{Ed25519Provider, StoreDidResolver, StoreKeyMaterial};
use digiwallet_storage::{open_store, Store, StorageBackend};

use crate::config::WalletConfig;

/// Engines wired over the configured store.
pub struct Context {
    store: Arc<dyn Store>,
    keys: Arc<StoreKeyMaterial>,
    provider: Arc<Ed25519Provider>,
}

impl Context {
    pub fn open(config: &WalletConfig) -> anyhow::Result<Self> {
        if config.storage.backend == StorageBackend::Memory {
            tracing::warn!("memory store selected; nothing written by this command outlives it");
        }
        let store = open_store(&config.storage)?;
        let resolver = Arc::new(StoreDidResolver::new(Arc::clone(&store)));
        Ok(Self {
            keys: Arc::new(StoreKeyMaterial::new(Arc::clone(&store))),
            provider: Arc::new(Ed25519Provider::new(resolver)),
            store,
        })
    }

    pub fn issuer(&self) -> IssuerEngine {
        IssuerEngine::new(
            Arc::clone(&self.store),
            self.keys.clone(),
            self.provider.clone(),
        )
    }

    pub fn wallet(&self, holder: Did) -> WalletEngine {
        WalletEngine::new(
            holder,
            Arc::clone(&self.store),
            self.keys.clone(),
            self.provider.clone(),
        )
    }

    /// Wallet for commands that never sign. Falls back to a placeholder
    /// holder when none is configured.
    pub fn reader(&self, config: &WalletConfig) -> WalletEngine {
        let holder =
            holder_did(None, config).unwrap_or_else(|_| Did::from_parts("example", "reader"));
        self.wallet(holder)
    }

    pub fn verifier(&self) -> VerifierEngine {
        VerifierEngine::new(self.provider.clone())
    }
}

/// Holder DID from the command line, else from config.
pub fn holder_did(arg: Option<&str>, config: &WalletConfig) -> anyhow::Result<Did> {
    let raw = arg
        .or(config.identity.holder_did.as_deref())
        .ok_or_else(|| {
            anyhow::anyhow!("no holder DID: pass --holder or set identity.holder_did")
        })?;
    Ok(Did::new(raw)?)
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
