//! `digiwallet present`: build a signed presentation.

use clap::Args;

use digiwallet_credentials::RevealFields;

use super::{holder_did, print_json, Context};
use crate::config::WalletConfig;

#[derive(Args, Debug)]
pub struct PresentArgs {
    /// Credential id to include; repeat for several.
    #[arg(short = 'c', long = "credential", required = true)]
    pub credentials: Vec<String>,

    /// Claims to reveal for one credential: `<credential-id>=<claim>,<claim>`.
    /// Credentials without an entry are presented in full.
    #[arg(short, long)]
    pub reveal: Vec<String>,

    /// Session nonce; random when omitted.
    #[arg(short, long)]
    pub nonce: Option<String>,

    /// Holder DID (defaults to identity.holder_did).
    #[arg(long)]
    pub holder: Option<String>,
}

fn parse_reveal(entries: &[String]) -> anyhow::Result<RevealFields> {
    let mut reveal = RevealFields::new();
    for entry in entries {
        let (id, claims) = entry
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("invalid --reveal {:?}: expected <id>=<claims>", entry))?;
        let names = claims
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(String::from);
        reveal.entry(id.trim().to_string()).or_default().extend(names);
    }
    Ok(reveal)
}

pub fn run(args: &PresentArgs, config: &WalletConfig) -> anyhow::Result<()> {
    let holder = holder_did(args.holder.as_deref(), config)?;
    let reveal = parse_reveal(&args.reveal)?;
    let nonce = args
        .nonce
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let ctx = Context::open(config)?;
    let vp = ctx
        .wallet(holder)
        .build_presentation(&args.credentials, &reveal, &nonce)?;
    print_json(&vp)
}
