//! Wallet configuration loading and management.

use serde::{Deserialize, Serialize};
use std::path::Path;

use digiwallet_storage::{StorageBackend, StorageConfig};

/// Full configuration for the `digiwallet` binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Document store backend and location. Each command runs in its own
    /// process, so the binary defaults to the file backend.
    #[serde(default = "default_storage")]
    pub storage: StorageConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Identifier defaults and the wallet's holder DID.
    #[serde(default)]
    pub identity: IdentityConfig,

    /// Issuance defaults.
    #[serde(default)]
    pub issuance: IssuanceConfig,

    /// Presentation acceptance rules applied by `verify`.
    #[serde(default)]
    pub verifier: VerifierConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// DID method for new identifiers.
    #[serde(default = "default_method")]
    pub method: String,
    /// Verification key type for new identifiers.
    #[serde(default = "default_key_type")]
    pub key_type: String,
    /// DID that signs presentations built by this wallet.
    #[serde(default)]
    pub holder_did: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IssuanceConfig {
    /// Validity applied when `issue` is not given `--validity-days`.
    #[serde(default)]
    pub default_validity_days: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VerifierConfig {
    #[serde(default)]
    pub required_types: Vec<String>,
    #[serde(default)]
    pub min_credentials: Option<usize>,
    #[serde(default)]
    pub trusted_issuers: Vec<String>,
}

fn default_storage() -> StorageConfig {
    StorageConfig {
        backend: StorageBackend::File,
        ..StorageConfig::default()
    }
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "text".into()
}
fn default_method() -> String {
    "example".into()
}
fn default_key_type() -> String {
    digiwallet_credentials::DEFAULT_KEY_TYPE.into()
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            storage: default_storage(),
            logging: LoggingConfig::default(),
            identity: IdentityConfig::default(),
            issuance: IssuanceConfig::default(),
            verifier: VerifierConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            method: default_method(),
            key_type: default_key_type(),
            holder_did: None,
        }
    }
}

impl WalletConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: WalletConfig = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save the current config to a TOML file.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, contents)?;
        Ok(())
    }
}
