//! DigiWallet CLI: manage identifiers, credentials, and presentations.
//!
//! Subcommands: init, did, issue, credentials, present, presentations, verify.
//! Every command runs the engines in-process over the configured store and
//! prints JSON to stdout; logs go to stderr.

mod commands;
mod config;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use config::WalletConfig;
use digiwallet_storage::StorageBackend;

/// DigiWallet: decentralized identifiers and verifiable credentials.
#[derive(Parser, Debug)]
#[command(name = "digiwallet", version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, default_value = "digiwallet.toml", global = true)]
    config: PathBuf,

    /// Override the storage backend (memory, file).
    #[arg(long, env = "STORE_BACKEND", global = true)]
    store_backend: Option<StorageBackend>,

    /// Override the file backend path.
    #[arg(long, env = "STORE_PATH", global = true)]
    store_path: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a default configuration file.
    Init(commands::init::InitArgs),
    /// Create, resolve, and list identifiers.
    Did(commands::did::DidArgs),
    /// Issue a verifiable credential.
    Issue(commands::issue::IssueArgs),
    /// List stored credentials.
    Credentials(commands::credentials::CredentialsArgs),
    /// Build a presentation from stored credentials.
    Present(commands::present::PresentArgs),
    /// List stored presentations.
    Presentations(commands::presentations::PresentationsArgs),
    /// Verify a presentation.
    Verify(commands::verify::VerifyArgs),
}

fn init_tracing(logging: &config::LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    if logging.format.eq_ignore_ascii_case("json") {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = WalletConfig::load(&cli.config)?;

    // Apply CLI and environment overrides
    if let Some(backend) = cli.store_backend {
        config.storage.backend = backend;
    }
    if let Some(ref path) = cli.store_path {
        config.storage.path = path.clone();
    }
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }

    init_tracing(&config.logging);

    match &cli.command {
        Commands::Init(args) => commands::init::run(args, &cli.config, config),
        Commands::Did(args) => commands::did::run(args, &config),
        Commands::Issue(args) => commands::issue::run(args, &config),
        Commands::Credentials(args) => commands::credentials::run(args, &config),
        Commands::Present(args) => commands::present::run(args, &config),
        Commands::Presentations(args) => commands::presentations::run(args, &config),
        Commands::Verify(args) => commands::verify::run(args, &config),
    }
}
