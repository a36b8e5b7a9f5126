//! `digiwallet credentials`: list stored credentials.

use clap::{Args, Subcommand};

use digiwallet_credentials::CredentialFilter;

use super::{print_json, Context};
use crate::config::WalletConfig;

#[derive(Args, Debug)]
pub struct CredentialsArgs {
    #[command(subcommand)]
    pub command: CredentialsCommand,
}

#[derive(Subcommand, Debug)]
pub enum CredentialsCommand {
    /// List credentials matching the given criteria.
    List {
        #[arg(long)]
        issuer: Option<String>,
        #[arg(long)]
        subject: Option<String>,
        #[arg(short = 't', long = "type")]
        credential_type: Option<String>,
        /// Only credentials that have not expired.
        #[arg(long, conflicts_with = "expired")]
        active: bool,
        /// Only credentials past their expiration.
        #[arg(long)]
        expired: bool,
    },
    /// Check a stored credential's issuer proof.
    Check {
        /// Credential id.
        id: String,
    },
}

pub fn run(args: &CredentialsArgs, config: &WalletConfig) -> anyhow::Result<()> {
    let ctx = Context::open(config)?;
    match &args.command {
        CredentialsCommand::List {
            issuer,
            subject,
            credential_type,
            active,
            expired,
        } => {
            let filter = CredentialFilter {
                issuer: issuer.clone(),
                subject_id: subject.clone(),
                credential_type: credential_type.clone(),
                active_only: *active,
                expired_only: *expired,
            };
            print_json(&ctx.reader(config).list_credentials(&filter)?)
        }
        CredentialsCommand::Check { id } => {
            let wallet = ctx.reader(config);
            let vc = wallet.get_credential(id)?;
            let valid = wallet.verify_credential(&vc)?;
            print_json(&serde_json::json!({ "id": vc.id, "valid": valid }))
        }
    }
}
