use serde::{Deserialize, Serialize};

use crate::error::CryptoError;

const KTY_OKP: &str = "OKP";
const CRV_ED25519: &str = "Ed25519";

/// JSON Web Key in the octet key pair form used for Ed25519 public keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    pub kty: String,
    pub crv: String,
    /// Public key bytes, unpadded base64url.
    pub x: String,
}

impl Jwk {
    pub fn ed25519(x: String) -> Self {
        Self {
            kty: KTY_OKP.to_string(),
            crv: CRV_ED25519.to_string(),
            x,
        }
    }

    pub(crate) fn check_ed25519(&self) -> Result<(), CryptoError> {
        if self.kty != KTY_OKP || self.crv != CRV_ED25519 {
            return Err(CryptoError::InvalidKey(format!(
                "expected OKP/Ed25519 JWK, got {}/{}",
                self.kty, self.crv
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwk_wire_shape() {
        let jwk = Jwk::ed25519("abc".into());
        let json = serde_json::to_value(&jwk).unwrap();
        assert_eq!(json, serde_json::json!({"kty": "OKP", "crv": "Ed25519", "x": "abc"}));
    }

    #[test]
    fn test_jwk_rejects_other_curves() {
        let jwk = Jwk {
            kty: "EC".into(),
            crv: "P-256".into(),
            x: "abc".into(),
        };
        assert!(jwk.check_ed25519().is_err());
    }
}
