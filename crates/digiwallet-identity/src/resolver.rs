use std::sync::Arc;

use digiwallet_storage::{Store, StoreExt};

use crate::document::DidDocument;
use crate::error::IdentityError;

/// Resolves DIDs to their documents.
pub trait DidResolver: Send + Sync {
    /// Resolve a DID URI to its DID Document.
    fn resolve(&self, did: &str) -> Result<DidDocument, IdentityError>;
}

/// Resolves DIDs from the document store, where each document lives under its own DID.
pub struct StoreDidResolver {
    store: Arc<dyn Store>,
}

impl StoreDidResolver {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

impl DidResolver for StoreDidResolver {
    fn resolve(&self, did: &str) -> Result<DidDocument, IdentityError> {
        match self.store.load::<DidDocument>(did) {
            Ok(doc) => Ok(doc),
            Err(e) if e.is_not_found() => Err(IdentityError::DidNotFound(did.to_string())),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use digiwallet_core::{now_seconds, Did, KeyType};
    use digiwallet_crypto::KeyPair;
    use digiwallet_storage::MemoryStore;

    fn store_with_doc() -> (Arc<dyn Store>, DidDocument) {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let doc = DidDocument::new(
            Did::generate("example"),
            KeyType::default(),
            KeyPair::generate().public_key().to_jwk(),
            now_seconds(),
        );
        store.save(doc.id.uri(), &doc).unwrap();
        (store, doc)
    }

    #[test]
    fn test_store_resolver_found() {
        let (store, doc) = store_with_doc();
        let resolver = StoreDidResolver::new(store);
        assert_eq!(resolver.resolve(doc.id.uri()).unwrap(), doc);
    }

    #[test]
    fn test_store_resolver_not_found() {
        let resolver = StoreDidResolver::new(Arc::new(MemoryStore::new()));
        assert!(matches!(
            resolver.resolve("did:example:nobody"),
            Err(IdentityError::DidNotFound(_))
        ));
    }

    #[test]
    fn test_store_resolver_wrong_shape() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        store.save("did:example:junk", &42).unwrap();
        let resolver = StoreDidResolver::new(store);
        assert!(matches!(
            resolver.resolve("did:example:junk"),
            Err(IdentityError::Storage(_))
        ));
    }
}
