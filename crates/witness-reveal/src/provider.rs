//! # Wallet and Chain Providers
//!
//! The authorizer needs two things from the outside world: a wallet that
//! can sign a challenge, and the id of the chain the contract lives on.
//! Both are traits so a browser wallet, a hardware signer, or a test
//! double can stand in.

use async_trait::async_trait;
use thiserror::Error;
use witness_core::{ChallengeMessage, WalletAddress};
use witness_crypto::{Ed25519KeyPair, Ed25519Signature};

/// Why a wallet did not produce a signature.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SigningFailure {
    /// The user declined the request.
    #[error("user rejected the request")]
    UserRejected,

    /// The wallet itself failed.
    #[error("{0}")]
    Provider(String),
}

/// The chain id could not be determined.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("chain id unavailable: {0}")]
pub struct ChainError(pub String);

/// A wallet that can sign reveal challenges.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Address of the connected account, if any.
    fn connected_address(&self) -> Option<WalletAddress>;

    /// Ask the wallet to sign `message`.
    async fn sign_message(
        &self,
        message: &ChallengeMessage,
    ) -> Result<Ed25519Signature, SigningFailure>;
}

/// Source of the chain id used in challenges.
#[async_trait]
pub trait ChainProvider: Send + Sync {
    async fn chain_id(&self) -> Result<u64, ChainError>;
}

/// Wallet backed by an in-process Ed25519 key pair.
///
/// The address is the lowercase hex public key, so any holder of the
/// address can verify its signatures.
#[derive(Debug)]
pub struct LocalWallet {
    keypair: Option<Ed25519KeyPair>,
}

impl LocalWallet {
    pub fn new(keypair: Ed25519KeyPair) -> Self {
        Self {
            keypair: Some(keypair),
        }
    }

    /// A wallet with no account connected.
    pub fn disconnected() -> Self {
        Self { keypair: None }
    }

    pub fn is_connected(&self) -> bool {
        self.keypair.is_some()
    }
}

#[async_trait]
impl WalletProvider for LocalWallet {
    fn connected_address(&self) -> Option<WalletAddress> {
        self.keypair.as_ref().map(|kp| kp.public_key().to_address())
    }

    async fn sign_message(
        &self,
        message: &ChallengeMessage,
    ) -> Result<Ed25519Signature, SigningFailure> {
        match &self.keypair {
            Some(kp) => Ok(kp.sign(message)),
            None => Err(SigningFailure::Provider("no account connected".to_string())),
        }
    }
}

/// Chain provider returning a fixed id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticChain(pub u64);

#[async_trait]
impl ChainProvider for StaticChain {
    async fn chain_id(&self) -> Result<u64, ChainError> {
        Ok(self.0)
    }
}
