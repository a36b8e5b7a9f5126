//! `digiwallet issue`: issue a verifiable credential.

use clap::Args;

use digiwallet_core::Claims;
use digiwallet_credentials::CredentialRequest;

use super::{print_json, Context};
use crate::config::WalletConfig;

#[derive(Args, Debug)]
pub struct IssueArgs {
    /// Issuer DID; its key must be in the store.
    #[arg(short, long)]
    pub issuer: String,

    /// Subject DID to issue the credential to.
    #[arg(short, long)]
    pub subject: String,

    /// Credential type(s), comma-separated.
    #[arg(short = 't', long, value_delimiter = ',')]
    pub credential_type: Vec<String>,

    /// Claims as a JSON object.
    #[arg(short, long, default_value = "{}")]
    pub claims: String,

    /// Days until expiry; 0 never expires (defaults to issuance.default_validity_days).
    #[arg(long)]
    pub validity_days: Option<u32>,

    /// Local part of the credential id.
    #[arg(long)]
    pub id: Option<String>,
}

pub fn run(args: &IssueArgs, config: &WalletConfig) -> anyhow::Result<()> {
    let claims: Claims = serde_json::from_str(&args.claims)
        .map_err(|e| anyhow::anyhow!("invalid claims JSON: {}", e))?;

    let request = CredentialRequest {
        issuer: args.issuer.clone(),
        subject: args.subject.clone(),
        credential_types: args.credential_type.clone(),
        claims,
        validity_days: args
            .validity_days
            .or(config.issuance.default_validity_days),
        id: args.id.clone(),
        status: None,
    };

    let ctx = Context::open(config)?;
    print_json(&ctx.issuer().issue_credential(&request)?)
}
