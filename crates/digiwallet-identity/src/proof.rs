use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use digiwallet_core::ProofPurpose;

/// Proof suite produced by the Ed25519 provider.
pub const PROOF_TYPE: &str = "Ed25519Signature2020";

/// Detached signature block attached to a credential or presentation.
///
/// The signature covers the canonical form of the parent document with
/// this block removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proof {
    #[serde(rename = "type")]
    pub proof_type: String,
    pub created: DateTime<Utc>,
    pub proof_purpose: ProofPurpose,
    /// Verification method id; must resolve in the signer's DID document.
    pub verification_method: String,
    /// Unpadded base64url signature bytes.
    pub signature_value: String,
}

impl Proof {
    pub fn new(
        proof_purpose: ProofPurpose,
        verification_method: String,
        signature_value: String,
        created: DateTime<Utc>,
    ) -> Self {
        Self {
            proof_type: PROOF_TYPE.to_string(),
            created,
            proof_purpose,
            verification_method,
            signature_value,
        }
    }
}
