//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types shared across the witness stack. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Codec errors carry the offending token so a bad record can be traced.
//! - Record errors name the testimony key that failed to parse.
//! - Cryptographic errors fail loudly with full context.
//!
//! Store, repository, and authorization errors live next to the components
//! that raise them and wrap the codec and record errors defined here.

use thiserror::Error;

/// Input rejected while building a core value (identifier or timestamp).
#[derive(Error, Debug)]
pub enum WitnessError {
    /// Input rejected before it reached any component.
    #[error("validation error: {0}")]
    Validation(String),
}

/// Error while encoding or decoding a confidential value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CodecError {
    /// Plaintext was NaN or infinite.
    #[error("plaintext must be a finite number, got {0}")]
    NonFinite(f64),

    /// The marked payload is not valid base64.
    #[error("token {token:?} has an invalid payload: {reason}")]
    InvalidPayload {
        /// The token that failed to decode.
        token: String,
        /// Why the payload was rejected.
        reason: String,
    },

    /// The (unmarked or decoded) text is not a finite number.
    #[error("token {0:?} does not hold a number")]
    NotANumber(String),
}

/// A stored testimony record could not be interpreted.
#[derive(Error, Debug)]
pub enum RecordError {
    /// The payload is not valid UTF-8.
    #[error("record {key} is not valid UTF-8")]
    NotUtf8 {
        /// Store key of the record.
        key: String,
    },

    /// The payload is not the expected JSON shape.
    #[error("record {key} is malformed: {source}")]
    Malformed {
        /// Store key of the record.
        key: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

/// Error in cryptographic operations.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Signature verification failed.
    #[error("signature verification failed: {0}")]
    VerificationFailed(String),

    /// Key generation or parsing failed.
    #[error("key error: {0}")]
    KeyError(String),
}
