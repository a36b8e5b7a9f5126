//! `digiwallet init`: write a default configuration file.

use clap::Args;
use std::path::Path;

use digiwallet_storage::StorageBackend;

use crate::config::WalletConfig;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Storage backend written to the new config.
    #[arg(long, default_value = "file")]
    pub backend: StorageBackend,

    /// Holder DID recorded in the new config.
    #[arg(long)]
    pub holder: Option<String>,

    /// Overwrite an existing config file.
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: &InitArgs, path: &Path, mut config: WalletConfig) -> anyhow::Result<()> {
    if path.exists() && !args.force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }
    config.storage.backend = args.backend;
    if args.holder.is_some() {
        config.identity.holder_did = args.holder.clone();
    }
    config.save(path)?;
    tracing::info!(path = %path.display(), "wrote config");
    super::print_json(&config)
}
