//! # witness-cli — Command-Line Client
//!
//! Provides the `witness` binary over a directory-backed testimony store.
//!
//! ## Subcommands
//!
//! - `witness status` — store availability probe.
//! - `witness cases` — the case catalog.
//! - `witness submit` — file a testimony (needs a wallet).
//! - `witness list` — testimonies, newest first, credibility still sealed.
//! - `witness contradictions` — contradictory pairs and per-case summaries.
//! - `witness reveal <id>` — signature-gated reveal of one credibility.
//! - `witness keygen` — fresh wallet seed.
//!
//! ```bash
//! export WITNESS_WALLET_SEED=$(witness keygen --seed-only)
//! witness submit --case case-1 --witness "Mrs. Peacock" --credibility 70 \
//!     --content "I heard the lift at midnight"
//! witness contradictions --case case-1
//! ```
//!
//! ## Crate Policy
//!
//! - Handlers return an exit code; unexpected failures propagate as
//!   `anyhow::Error` and are logged by `main`.
//! - Command output goes to stdout, logs to stderr.

pub mod cases;
pub mod config;
pub mod contradictions;
pub mod reveal;
pub mod testimony;

pub use config::{ConfigError, WitnessConfig};
