//! # witness CLI entry point
//!
//! Parses command-line arguments, initializes tracing, loads the
//! environment configuration, and dispatches to subcommand handlers.

use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use witness_cli::cases::run_cases;
use witness_cli::contradictions::{run_contradictions, ContradictionsArgs};
use witness_cli::reveal::{run_keygen, run_reveal, KeygenArgs, RevealArgs};
use witness_cli::testimony::{run_list, run_status, run_submit, ListArgs, SubmitArgs};
use witness_cli::WitnessConfig;

/// Witness testimony client.
///
/// Files testimonies against a fixed case catalog, reports contradictory
/// credibility scores, and reveals individual scores behind a wallet
/// signature.
#[derive(Parser, Debug)]
#[command(name = "witness", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    /// `RUST_LOG` takes precedence when set.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check whether the testimony store is available.
    Status,

    /// List the case catalog.
    Cases,

    /// File a new testimony.
    Submit(SubmitArgs),

    /// List testimonies, newest first.
    List(ListArgs),

    /// Report contradictory testimony pairs per case.
    Contradictions(ContradictionsArgs),

    /// Reveal one credibility score after signing a challenge.
    Reveal(RevealArgs),

    /// Generate a wallet seed.
    Keygen(KeygenArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.json);

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "witness CLI starting");

    match run(cli.command).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

async fn run(command: Commands) -> anyhow::Result<u8> {
    // These two never touch the store or the wallet.
    match &command {
        Commands::Cases => return run_cases(),
        Commands::Keygen(args) => return run_keygen(args),
        _ => {}
    }

    let config = WitnessConfig::from_env().context("invalid configuration")?;
    tracing::debug!(?config, "loaded configuration");

    match command {
        Commands::Status => run_status(&config).await,
        Commands::Submit(args) => run_submit(&args, &config).await,
        Commands::List(args) => run_list(&args, &config).await,
        Commands::Contradictions(args) => run_contradictions(&args, &config).await,
        Commands::Reveal(args) => run_reveal(&args, &config).await,
        Commands::Cases | Commands::Keygen(_) => Ok(0),
    }
}

fn init_tracing(verbose: u8, json: bool) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
