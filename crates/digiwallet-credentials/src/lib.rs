//! DigiWallet Credentials: issuer engine, holder wallet, and verifier pipeline.

pub mod error;
pub mod filter;
pub mod issuer;
pub mod policy;
pub mod status;
pub mod verifier;
pub mod wallet;

pub use error::{CredentialError, ErrorClass, VerificationStage};
pub use filter::{CredentialFilter, PresentationFilter};
pub use issuer::{CredentialRequest, IdentifierOptions, IssuerEngine, DEFAULT_KEY_TYPE};
pub use policy::{
    ExpectedNonce, MinimumCredentials, PresentationPolicy, RequireClaims,
    RequireCredentialTypes, TrustedIssuers,
};
pub use status::{AcceptingStatusChecker, RevocationRegistry, StatusChecker};
pub use verifier::{VerificationCheck, VerificationReport, VerifierEngine};
pub use wallet::{RevealFields, WalletEngine};
