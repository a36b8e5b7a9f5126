//! `digiwallet presentations`: list stored presentations.

use clap::{Args, Subcommand};

use digiwallet_credentials::PresentationFilter;

use super::{print_json, Context};
use crate::config::WalletConfig;

#[derive(Args, Debug)]
pub struct PresentationsArgs {
    #[command(subcommand)]
    pub command: PresentationsCommand,
}

#[derive(Subcommand, Debug)]
pub enum PresentationsCommand {
    /// List presentations matching the given criteria.
    List {
        #[arg(long)]
        holder: Option<String>,
        /// Issuer of any embedded credential.
        #[arg(long)]
        issuer: Option<String>,
        #[arg(long)]
        subject: Option<String>,
        #[arg(short = 't', long = "type")]
        credential_type: Option<String>,
        /// Only presentations whose credentials are all unexpired.
        #[arg(long, conflicts_with = "expired")]
        active: bool,
        /// Only presentations with at least one expired credential.
        #[arg(long)]
        expired: bool,
    },
    /// Show a stored presentation.
    Show {
        /// Presentation id (`vp:<nonce>`).
        id: String,
    },
}

pub fn run(args: &PresentationsArgs, config: &WalletConfig) -> anyhow::Result<()> {
    let ctx = Context::open(config)?;
    let wallet = ctx.reader(config);
    match &args.command {
        PresentationsCommand::List {
            holder,
            issuer,
            subject,
            credential_type,
            active,
            expired,
        } => {
            let filter = PresentationFilter {
                holder: holder.clone(),
                issuer: issuer.clone(),
                subject_id: subject.clone(),
                credential_type: credential_type.clone(),
                active_only: *active,
                expired_only: *expired,
            };
            print_json(&wallet.list_presentations(&filter)?)
        }
        PresentationsCommand::Show { id } => print_json(&wallet.get_presentation(id)?),
    }
}
