//! DigiWallet Identity Layer
//!
//! Document model and trust primitives the credential engines build on:
//! - DID documents with JWK verification methods
//! - Verifiable credentials and presentations with detached proofs
//! - DID resolution from the document store
//! - Private key custody keyed by verification method
//! - The `CryptoProvider` seam (Ed25519 over JCS-canonical JSON)

pub mod credential;
pub mod document;
pub mod error;
pub mod keystore;
pub mod presentation;
pub mod proof;
pub mod provider;
pub mod resolver;

pub use credential::{credential_id, CredentialStatus, VerifiableCredential, CREDENTIAL_PREFIX};
pub use document::{DidDocument, VerificationMethod};
pub use error::IdentityError;
pub use keystore::{
    DefaultKeyPolicy, KeyMaterialRecord, KeyMaterialStore, KeyPolicy, StoreKeyMaterial,
    PRIVATE_KEY_PREFIX,
};
pub use presentation::{presentation_id, VerifiablePresentation, PRESENTATION_PREFIX};
pub use proof::{Proof, PROOF_TYPE};
pub use provider::{
    verify_credential_proof, verify_presentation_proof, CryptoProvider, Ed25519Provider,
    GeneratedKey,
};
pub use resolver::{DidResolver, StoreDidResolver};
