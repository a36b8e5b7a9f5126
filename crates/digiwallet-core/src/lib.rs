//! DigiWallet Core: fundamental types, errors, and constants shared by the
//! identity, credential, and storage layers.

pub mod error;
pub mod time;
pub mod types;

pub use error::CoreError;
pub use time::{now_seconds, truncate_to_seconds};
pub use types::{
    ClaimValue, Claims, Did, KeyType, ProofPurpose, BASE_CREDENTIAL_TYPE,
    BASE_PRESENTATION_TYPE, CREDENTIALS_CONTEXT, DID_CONTEXT, SUBJECT_ID_CLAIM,
};
