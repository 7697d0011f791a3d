//! # Testimony Subcommands
//!
//! `status`, `submit`, and `list`. Reads go through the store's read-only
//! accessor and never fail on bad data; `submit` needs a connected wallet
//! and creates the store directory on first use.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;
use witness_core::{Case, CaseId};
use witness_reveal::WalletProvider;
use witness_store::DirStore;
use witness_testimony::{NewTestimony, Testimony, TestimonyRepository};

use crate::config::WitnessConfig;

/// Arguments for `witness submit`.
#[derive(Args, Debug)]
pub struct SubmitArgs {
    /// Case to file against (e.g. `case-1`).
    #[arg(long)]
    pub case: String,
    /// Witness display name.
    #[arg(long)]
    pub witness: String,
    /// Testimony text.
    #[arg(long, default_value = "")]
    pub content: String,
    /// Credibility score, 0 to 100.
    #[arg(long, default_value_t = 50.0)]
    pub credibility: f64,
}

/// Arguments for `witness list`.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only show testimonies for this case.
    #[arg(long)]
    pub case: Option<String>,
}

/// Probe the store. Exit code 1 when it is not available.
pub async fn run_status(config: &WitnessConfig) -> Result<u8> {
    let repo = TestimonyRepository::new(Arc::new(config.store()));
    let available = repo
        .check_availability()
        .await
        .context("availability probe failed")?;
    if available {
        println!("available ({})", config.store_dir.display());
        Ok(0)
    } else {
        println!("not available ({})", config.store_dir.display());
        Ok(1)
    }
}

pub async fn run_submit(args: &SubmitArgs, config: &WitnessConfig) -> Result<u8> {
    let wallet = config.wallet()?;
    let Some(address) = wallet.connected_address() else {
        bail!("submitting requires a connected wallet; set WITNESS_WALLET_SEED (see `witness keygen`)");
    };

    let store = DirStore::create(&config.store_dir, &config.contract_address)
        .await
        .with_context(|| format!("failed to open store at {}", config.store_dir.display()))?;
    let repo = TestimonyRepository::new(Arc::new(store.clone()));
    let submission = NewTestimony {
        witness: args.witness.clone(),
        content: args.content.clone(),
        credibility: args.credibility,
    };
    let testimony = repo
        .submit(&store, &CaseId::new(&args.case), submission)
        .await
        .context("submission failed")?;

    tracing::debug!(id = %testimony.id, address = %address, "submitted by wallet");
    println!("OK: testimony {} filed against {}", testimony.id, testimony.case_id);
    println!("  Credibility: {}", testimony.credibility);
    Ok(0)
}

pub async fn run_list(args: &ListArgs, config: &WitnessConfig) -> Result<u8> {
    let case = args.case.as_deref().map(resolve_case).transpose()?;
    let repo = TestimonyRepository::new(Arc::new(config.store()));
    let testimonies: Vec<Testimony> = repo
        .load_all()
        .await
        .into_iter()
        .filter(|t| case.as_ref().map_or(true, |c| &t.case_id == c))
        .collect();

    if testimonies.is_empty() {
        println!("no testimonies");
        return Ok(0);
    }
    for t in &testimonies {
        print_testimony(t);
    }
    Ok(0)
}

/// Validate a case argument against the catalog.
pub(crate) fn resolve_case(raw: &str) -> Result<CaseId> {
    let id = CaseId::new(raw);
    if Case::lookup(&id).is_none() {
        bail!("unknown case {raw:?}; run `witness cases` for the catalog");
    }
    Ok(id)
}

fn print_testimony(t: &Testimony) {
    println!("{}  [{}]  {}", t.id, t.case_id, t.timestamp.to_iso8601());
    println!("  Witness:     {}", t.witness);
    println!("  Credibility: {}", t.credibility);
    if !t.encrypted_content.is_empty() {
        println!("  {}", t.encrypted_content);
    }
}
