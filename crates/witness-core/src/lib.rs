//! # witness-core — Foundational Types for the Witness Stack
//!
//! This crate is the bedrock of the confidential testimony workspace. It
//! defines the identifier newtypes, timestamps, reference data, and the
//! challenge message type that every other crate builds on. It depends on
//! nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `TestimonyId`, `CaseId`,
//!    `WalletAddress` — no bare strings for identifiers.
//!
//! 2. **`ChallengeMessage` newtype.** The only thing a wallet signs is a
//!    `ChallengeMessage`, and the only way to build one is
//!    [`build_challenge()`]. Client and verifier cannot drift apart on the
//!    line format.
//!
//! 3. **Fixed case catalog.** Cases are static reference data; submissions
//!    are validated against [`Case::lookup()`].
//!
//! 4. **UTC-only timestamps** stored on the wire as epoch seconds.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `witness-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod case;
pub mod challenge;
pub mod error;
pub mod identity;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use case::{Case, CASE_CATALOG};
pub use challenge::{build_challenge, ChallengeMessage};
pub use error::{CodecError, CryptoError, RecordError, WitnessError};
pub use identity::{CaseId, TestimonyId, WalletAddress};
pub use temporal::Timestamp;
