//! `digiwallet did`: create, resolve, and list identifiers.

use clap::{Args, Subcommand};

use digiwallet_credentials::IdentifierOptions;

use super::{print_json, Context};
use crate::config::WalletConfig;

#[derive(Args, Debug)]
pub struct DidArgs {
    #[command(subcommand)]
    pub command: DidCommand,
}

#[derive(Subcommand, Debug)]
pub enum DidCommand {
    /// Mint a new identifier with a fresh key.
    Create {
        /// DID method (defaults to identity.method).
        #[arg(short, long)]
        method: Option<String>,
        /// Method-specific identifier; random when omitted.
        #[arg(long)]
        id: Option<String>,
        /// Verification key type (defaults to identity.key_type).
        #[arg(short, long)]
        key_type: Option<String>,
    },
    /// Show a stored DID document.
    Resolve {
        /// The DID to resolve.
        did: String,
    },
    /// List stored DID documents.
    List,
}

pub fn run(args: &DidArgs, config: &WalletConfig) -> anyhow::Result<()> {
    let ctx = Context::open(config)?;
    let issuer = ctx.issuer();
    match &args.command {
        DidCommand::Create {
            method,
            id,
            key_type,
        } => {
            let method = method.as_deref().unwrap_or(&config.identity.method);
            let options = IdentifierOptions {
                id: id.clone(),
                key_type: Some(
                    key_type
                        .clone()
                        .unwrap_or_else(|| config.identity.key_type.clone()),
                ),
            };
            print_json(&issuer.generate_identifier(method, &options)?)
        }
        DidCommand::Resolve { did } => print_json(&issuer.resolve_identifier(did)?),
        DidCommand::List => print_json(&issuer.list_identifiers()?),
    }
}
