//! # Reveal and Keygen Subcommands
//!
//! `reveal` asks the configured wallet to sign a fresh session challenge
//! and, once the signature verifies, prints one credibility score in the
//! clear. `keygen` prints a new wallet seed for `WITNESS_WALLET_SEED`.

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::Args;
use witness_core::TestimonyId;
use witness_crypto::Ed25519KeyPair;
use witness_reveal::{DecryptionAuthorizer, SessionContext};
use witness_testimony::TestimonyRepository;

use crate::config::WitnessConfig;

/// Arguments for `witness reveal`.
#[derive(Args, Debug)]
pub struct RevealArgs {
    /// Testimony whose credibility to reveal.
    #[arg(value_name = "ID")]
    pub id: String,
}

/// Arguments for `witness keygen`.
#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Print only the seed, for `export WITNESS_WALLET_SEED=$(...)`.
    #[arg(long)]
    pub seed_only: bool,
}

/// Exit code 1 when the reveal is refused (no wallet, rejected or invalid
/// signature, reveal already running).
pub async fn run_reveal(args: &RevealArgs, config: &WitnessConfig) -> Result<u8> {
    let id = TestimonyId::new(&args.id).context("invalid testimony id")?;
    let store = config.store();
    let repo = TestimonyRepository::new(Arc::new(store.clone()));
    let testimony = repo
        .find(&id)
        .await
        .with_context(|| format!("failed to load testimony {id}"))?
        .ok_or_else(|| anyhow!("no testimony {id}"))?;

    let context = SessionContext::initialize(&store, &config.chain(), config.duration_days)
        .await
        .context("failed to start reveal session")?;
    let authorizer = DecryptionAuthorizer::new(Arc::new(config.wallet()?), Arc::new(context))
        .with_reveal_delay(config.reveal_delay);

    match authorizer.authorize(&id, &testimony.credibility).await {
        Ok(score) => {
            println!("{id}: credibility {score}");
            Ok(0)
        }
        Err(e) => {
            println!("FAIL: {e}");
            Ok(1)
        }
    }
}

pub fn run_keygen(args: &KeygenArgs) -> Result<u8> {
    let keypair = Ed25519KeyPair::generate();
    let seed = keypair.seed_hex();
    if args.seed_only {
        println!("{}", seed.as_str());
        return Ok(0);
    }
    println!("OK: generated wallet");
    println!("  Address: {}", keypair.public_key().to_address());
    println!("  export WITNESS_WALLET_SEED={}", seed.as_str());
    Ok(0)
}
