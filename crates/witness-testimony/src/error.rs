//! # Repository Errors
//!
//! Read paths never surface these: loads degrade to empty or partial
//! results and log instead. Only action-initiated calls (`append`,
//! `submit`, `recover`, `check_availability`, `find`) return them, so the
//! caller can render a pending / success / error state.

use thiserror::Error;
use witness_core::{CodecError, RecordError, TestimonyId};
use witness_store::StoreError;

/// Which write of an append failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendStage {
    /// Asking the backend whether it is available.
    Probe,
    /// Reconciling an earlier interrupted append.
    Recover,
    /// Recording the pending id in the journal.
    Journal,
    /// Writing the testimony record itself.
    Record,
    /// Rewriting the index with the new id.
    Index,
}

impl std::fmt::Display for AppendStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Probe => "availability probe",
            Self::Recover => "recovery step",
            Self::Journal => "journal",
            Self::Record => "record",
            Self::Index => "index",
        };
        f.write_str(s)
    }
}

/// Errors from repository actions.
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// The backend reported itself as not available.
    #[error("testimony store is not available")]
    Unavailable,

    /// The submission was rejected before anything was written.
    #[error("invalid submission: {0}")]
    Invalid(String),

    /// The credibility score could not be encoded.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// A write in the append sequence failed. Safe to retry.
    #[error("submission of {id} failed writing the {stage}: {source}")]
    Submission {
        /// Testimony being appended.
        id: TestimonyId,
        /// The write that failed.
        stage: AppendStage,
        /// Underlying backend error.
        #[source]
        source: StoreError,
    },

    /// The index exists but cannot be parsed; rewriting it would drop
    /// every existing id.
    #[error("testimony index is corrupt: {0}")]
    CorruptIndex(String),

    /// A stored record could not be parsed.
    #[error(transparent)]
    Record(#[from] RecordError),

    /// Backend error outside the append sequence.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// JSON encoding of a record or index failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RepositoryError {
    /// Whether retrying the same action may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Unavailable | Self::Submission { .. } | Self::Store(_)
        )
    }
}
