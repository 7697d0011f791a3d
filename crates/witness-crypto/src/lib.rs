//! # witness-crypto — Cryptographic Primitives
//!
//! Provides the cryptographic building blocks for the witness stack:
//!
//! - **Confidential values**: the credibility codec (encode, decode,
//!   compare under a tolerance) behind the [`ConfidentialCodec`] trait.
//! - **Ed25519** wallet keys, signing, and verification. The signing input
//!   is always a [`witness_core::ChallengeMessage`].
//! - **SHA-256** fingerprints so challenge messages can be logged without
//!   echoing the session public key.
//!
//! ## Placeholder Scheme
//!
//! [`MarkerCodec`] is reversible text obfuscation, not encryption. Anyone
//! holding a token can decode it. It is kept byte-compatible with records
//! already in the store; a real threshold or homomorphic scheme slots in by
//! implementing [`ConfidentialCodec`].
//!
//! ## Crate Policy
//!
//! - Depends only on `witness-core` internally.
//! - No mocking of cryptographic operations in tests — all tests use real
//!   Ed25519 keys and real SHA-256.

pub mod confidential;
pub mod ed25519;
pub mod sha256;

pub use confidential::{ConfidentialCodec, ConfidentialValue, MarkerCodec, DEFAULT_TOLERANCE};
pub use ed25519::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
pub use sha256::challenge_fingerprint;
