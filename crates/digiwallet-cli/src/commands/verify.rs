//! `digiwallet verify`: run the verification pipeline over a presentation.

use clap::Args;
use std::io::Read;
use std::path::PathBuf;

use digiwallet_credentials::{
    ExpectedNonce, MinimumCredentials, RequireClaims, RequireCredentialTypes, TrustedIssuers,
    VerifierEngine,
};
use digiwallet_identity::VerifiablePresentation;

use super::{print_json, Context};
use crate::config::{VerifierConfig, WalletConfig};

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Stored presentation id.
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    pub id: Option<String>,

    /// Presentation JSON file, or `-` for stdin.
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Nonce the presentation must carry.
    #[arg(short, long)]
    pub nonce: Option<String>,

    /// Required credential type(s), added to verifier.required_types.
    #[arg(short = 't', long = "require-type", value_delimiter = ',')]
    pub required_types: Vec<String>,

    /// Claim names that must be revealed.
    #[arg(long = "require-claim", value_delimiter = ',')]
    pub required_claims: Vec<String>,

    /// Minimum number of credentials (overrides verifier.min_credentials).
    #[arg(long)]
    pub min_credentials: Option<usize>,

    /// Accepted issuer DID(s), added to verifier.trusted_issuers.
    #[arg(long = "trusted-issuer", value_delimiter = ',')]
    pub trusted_issuers: Vec<String>,
}

fn load_presentation(
    args: &VerifyArgs,
    ctx: &Context,
    config: &WalletConfig,
) -> anyhow::Result<VerifiablePresentation> {
    match (&args.id, &args.file) {
        (Some(id), _) => Ok(ctx.reader(config).get_presentation(id)?),
        (None, Some(path)) if path.as_os_str() == "-" => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(serde_json::from_str(&buf)?)
        }
        (None, Some(path)) => Ok(serde_json::from_str(&std::fs::read_to_string(path)?)?),
        (None, None) => anyhow::bail!("pass --id or --file"),
    }
}

fn configure(
    mut engine: VerifierEngine,
    args: &VerifyArgs,
    defaults: &VerifierConfig,
) -> VerifierEngine {
    let mut types = defaults.required_types.clone();
    types.extend(args.required_types.iter().cloned());
    if !types.is_empty() {
        engine = engine.with_policy(RequireCredentialTypes(types));
    }
    if let Some(min) = args.min_credentials.or(defaults.min_credentials) {
        engine = engine.with_policy(MinimumCredentials(min));
    }
    let mut issuers = defaults.trusted_issuers.clone();
    issuers.extend(args.trusted_issuers.iter().cloned());
    if !issuers.is_empty() {
        engine = engine.with_policy(TrustedIssuers::new(issuers));
    }
    if !args.required_claims.is_empty() {
        engine = engine.with_policy(RequireClaims(args.required_claims.clone()));
    }
    if let Some(nonce) = &args.nonce {
        engine = engine.with_policy(ExpectedNonce(nonce.clone()));
    }
    engine
}

pub fn run(args: &VerifyArgs, config: &WalletConfig) -> anyhow::Result<()> {
    let ctx = Context::open(config)?;
    let vp = load_presentation(args, &ctx, config)?;
    let engine = configure(ctx.verifier(), args, &config.verifier);

    match engine.verify_presentation(&vp) {
        Ok(report) => {
            let checks: Vec<_> = report
                .checks
                .iter()
                .map(|c| serde_json::json!({ "name": c.name, "passed": c.passed }))
                .collect();
            print_json(&serde_json::json!({
                "valid": true,
                "presentationId": report.presentation_id,
                "holder": report.holder,
                "checks": checks,
            }))
        }
        Err(e) => {
            let (stage, index) = e
                .verification_stage()
                .map(|(s, i)| (Some(s.to_string()), i))
                .unwrap_or((None, None));
            print_json(&serde_json::json!({
                "valid": false,
                "presentationId": vp.id,
                "stage": stage,
                "credentialIndex": index,
                "error": e.root().to_string(),
            }))?;
            Err(e.into())
        }
    }
}
