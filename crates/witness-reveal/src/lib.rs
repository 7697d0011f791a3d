//! # witness-reveal — Signature-Gated Reveals
//!
//! A viewer reveals one confidential credibility score by having their
//! wallet sign a challenge built from the session context.
//!
//! - **Context** (`context.rs`): immutable session parameters gathered once
//!   from the store and the chain.
//! - **Provider** (`provider.rs`): `WalletProvider` and `ChainProvider`
//!   traits, with the in-process `LocalWallet` and `StaticChain`.
//! - **Authorizer** (`authorizer.rs`): the typestate `RevealAttempt` and the
//!   `DecryptionAuthorizer` that drives it.
//!
//! ## Security Invariant
//!
//! A value is decoded only from a `RevealAttempt<Authorized>`, and that
//! state is reachable only through a signature that verifies against the
//! connected address.

pub mod authorizer;
pub mod context;
pub mod error;
pub mod provider;

pub use authorizer::{
    DecryptionAuthorizer, RejectionReason, RevealAttempt, RevealState, DEFAULT_REVEAL_DELAY,
};
pub use context::{SessionContext, DEFAULT_DURATION_DAYS};
pub use error::AuthorizationError;
pub use provider::{ChainError, ChainProvider, LocalWallet, SigningFailure, StaticChain, WalletProvider};
