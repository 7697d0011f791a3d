//! # witness-testimony — Testimony Records and Analysis
//!
//! - **Record** (`record.rs`): the `Testimony` model, its stored JSON form,
//!   and validation of new submissions.
//!
//! - **Repository** (`repository.rs`): tolerant reads and journaled appends
//!   over a [`witness_store`] backend.
//!
//! - **Contradiction** (`contradiction.rs`): same-case pairs whose
//!   credibility scores fall within a tolerance, plus per-case summaries.
//!
//! - **Snapshot** (`snapshot.rs`): one load and its contradictions, frozen
//!   together.
//!
//! ## Crate Policy
//!
//! - Read paths never return errors; action paths do.
//! - Credibility stays confidential in memory. Only the analyzer decodes
//!   it, and only for comparison.

pub mod contradiction;
pub mod error;
pub mod record;
pub mod repository;
pub mod snapshot;

pub use contradiction::{CaseSummary, ContradictionAnalyzer, ContradictionPair};
pub use error::{AppendStage, RepositoryError};
pub use record::{NewTestimony, Testimony, TestimonyRecord, MAX_CREDIBILITY};
pub use repository::{TestimonyRepository, INDEX_KEY, JOURNAL_KEY};
pub use snapshot::LoadSnapshot;
