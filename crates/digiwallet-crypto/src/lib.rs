pub mod canonical;
pub mod commitment;
pub mod error;
pub mod jwk;
pub mod keys;
pub mod signing;

pub use canonical::CanonicalBytes;
pub use commitment::{claim_digest, verify_claim_digest, ClaimDigest, ClaimSalt};
pub use error::CryptoError;
pub use jwk::Jwk;
pub use keys::{KeyPair, PublicKey, KEYPAIR_LENGTH, PUBLIC_KEY_LENGTH};
pub use signing::{sign, verify, Signature};
