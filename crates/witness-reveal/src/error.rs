use thiserror::Error;
use witness_core::{CodecError, TestimonyId};
use witness_store::StoreError;

use crate::provider::ChainError;

/// Errors from a reveal attempt or from building its session context.
#[derive(Error, Debug)]
pub enum AuthorizationError {
    /// No wallet is connected. The signer was never asked.
    #[error("no wallet connected")]
    NotConnected,

    /// A reveal of the same testimony is already running.
    #[error("a reveal of {0} is already in progress")]
    AlreadyInFlight(TestimonyId),

    /// The wallet refused or failed to sign the challenge.
    #[error("signature request rejected: {reason}")]
    SigningRejected {
        /// Wallet-reported reason.
        reason: String,
    },

    /// The signature does not verify against the challenge and the
    /// connected address.
    #[error("signature does not match the connected wallet: {0}")]
    InvalidSignature(String),

    /// The chain id could not be fetched.
    #[error(transparent)]
    Chain(#[from] ChainError),

    /// The contract address could not be read from the store.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The confidential value could not be decoded.
    #[error(transparent)]
    Decode(#[from] CodecError),
}

impl AuthorizationError {
    /// Whether the user can simply try again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::SigningRejected { .. } | Self::AlreadyInFlight(_) | Self::Chain(_)
        )
    }
}
