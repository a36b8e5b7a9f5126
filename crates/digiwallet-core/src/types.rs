use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// JSON-LD context for W3C verifiable credentials and presentations.
pub const CREDENTIALS_CONTEXT: &str = "https://www.w3.org/2018/credentials/v1";

/// JSON-LD context for DID documents.
pub const DID_CONTEXT: &str = "https://www.w3.org/ns/did/v1";

/// Type tag every credential carries first.
pub const BASE_CREDENTIAL_TYPE: &str = "VerifiableCredential";

/// Type tag every presentation carries first.
pub const BASE_PRESENTATION_TYPE: &str = "VerifiablePresentation";

/// Reserved claim holding the credential subject's identifier.
pub const SUBJECT_ID_CLAIM: &str = "id";

/// Decentralized identifier.
/// Format: `did:<method>:<identifier>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Did(pub String);

impl Did {
    /// Parse a DID from its full URI string.
    pub fn new(uri: impl Into<String>) -> Result<Self, CoreError> {
        let uri = uri.into();
        let mut parts = uri.splitn(3, ':');
        let scheme = parts.next().unwrap_or_default();
        let method = parts.next().unwrap_or_default();
        let identifier = parts.next().unwrap_or_default();
        if scheme != "did" {
            return Err(CoreError::InvalidDid(format!(
                "DID must start with 'did:', got: {}",
                uri
            )));
        }
        if method.is_empty() || identifier.is_empty() {
            return Err(CoreError::InvalidDid(format!(
                "DID must have format 'did:<method>:<identifier>', got: {}",
                uri
            )));
        }
        Ok(Self(uri))
    }

    /// Build a DID from method and identifier components.
    pub fn from_parts(method: &str, identifier: &str) -> Self {
        Self(format!("did:{}:{}", method, identifier))
    }

    /// Build a DID with a random 16 hex character identifier.
    pub fn generate(method: &str) -> Self {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        Self::from_parts(method, &suffix[..16])
    }

    /// Get the full DID URI.
    pub fn uri(&self) -> &str {
        &self.0
    }

    /// Extract the method (e.g. `key`, `web`, `example`).
    pub fn method(&self) -> Option<&str> {
        self.0.split(':').nth(1)
    }

    /// Extract the method-specific identifier.
    pub fn identifier(&self) -> Option<&str> {
        self.0.splitn(3, ':').nth(2)
    }

    /// Verification method identifier for the `n`-th key of this DID.
    pub fn key_id(&self, n: usize) -> String {
        format!("{}#key-{}", self.0, n)
    }

    /// The DID a verification method identifier belongs to (the part before `#`).
    pub fn controller_of(verification_method: &str) -> &str {
        verification_method
            .split_once('#')
            .map(|(did, _)| did)
            .unwrap_or(verification_method)
    }
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Did {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Value of a credential claim.
///
/// Claims are open-ended, so the value mirrors the JSON data model while
/// keeping numbers split into integer and float variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClaimValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<ClaimValue>),
    Map(Claims),
}

/// Ordered claim-name to value mapping.
pub type Claims = BTreeMap<String, ClaimValue>;

impl ClaimValue {
    /// Borrow the string content, if this is a string claim.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for ClaimValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for ClaimValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for ClaimValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<bool> for ClaimValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl fmt::Display for ClaimValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::String(s) => write!(f, "{}", s),
            Self::List(items) => write!(f, "<{} items>", items.len()),
            Self::Map(map) => write!(f, "<{} claims>", map.len()),
        }
    }
}

/// Supported verification key types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum KeyType {
    Ed25519VerificationKey2018,
    #[default]
    Ed25519VerificationKey2020,
}

impl KeyType {
    /// Size in bytes of the stored private key material (seed followed by public key).
    pub fn private_key_len(&self) -> usize {
        match self {
            Self::Ed25519VerificationKey2018 | Self::Ed25519VerificationKey2020 => 64,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ed25519VerificationKey2018 => "Ed25519VerificationKey2018",
            Self::Ed25519VerificationKey2020 => "Ed25519VerificationKey2020",
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Ed25519VerificationKey2018" => Ok(Self::Ed25519VerificationKey2018),
            "Ed25519VerificationKey2020" => Ok(Self::Ed25519VerificationKey2020),
            other => Err(CoreError::UnsupportedKeyType(other.to_string())),
        }
    }
}

/// Purpose a proof was created for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProofPurpose {
    /// Issuer asserting claims in a credential.
    AssertionMethod,
    /// Holder authenticating a presentation.
    Authentication,
}

impl fmt::Display for ProofPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AssertionMethod => write!(f, "assertionMethod"),
            Self::Authentication => write!(f, "authentication"),
        }
    }
}

impl FromStr for ProofPurpose {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "assertionMethod" => Ok(Self::AssertionMethod),
            "authentication" => Ok(Self::Authentication),
            other => Err(CoreError::UnknownProofPurpose(other.to_string())),
        }
    }
}
