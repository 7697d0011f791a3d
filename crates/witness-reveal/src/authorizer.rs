//! # Decryption Authorizer
//!
//! Reveals one confidential credibility score after the connected wallet
//! signs the session challenge. Each attempt is a typestate machine:
//!
//! ```text
//! Idle ──with_challenge()──▶ ChallengeBuilt ──request_signature()──▶ AwaitingSignature
//!                                                                     │
//!                                                     verify() ───────┤
//!                                                                     ▼
//!                                                          Authorized | Rejected
//! ```
//!
//! `RevealAttempt<Idle>` has no `verify()`, and only `RevealAttempt<Authorized>`
//! exists after a signature has been checked, so a value cannot be revealed
//! on an unverified signature.
//!
//! ## Authorization Order
//!
//! 1. No connected address: `NotConnected`, and the wallet is never asked.
//! 2. Same testimony already being revealed: `AlreadyInFlight`.
//! 3. Wallet refuses: `SigningRejected`.
//! 4. Signature does not verify against the connected address:
//!    `InvalidSignature`.
//! 5. Wait the reveal delay.
//! 6. Decode the value, or fail with `Decode`.
//!
//! Nothing is cached. Every reveal needs a fresh signature.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use witness_core::{ChallengeMessage, TestimonyId, Timestamp, WalletAddress};
use witness_crypto::ed25519::verify_for_address;
use witness_crypto::{
    challenge_fingerprint, ConfidentialCodec, ConfidentialValue, Ed25519Signature, MarkerCodec,
};

use crate::context::SessionContext;
use crate::error::AuthorizationError;
use crate::provider::{SigningFailure, WalletProvider};

/// Default pause between authorization and reveal.
pub const DEFAULT_REVEAL_DELAY: Duration = Duration::from_millis(1500);

// ─── States ──────────────────────────────────────────────────────────

/// No challenge yet.
#[derive(Debug, Clone)]
pub struct Idle;

/// Challenge built from the session context.
#[derive(Debug, Clone)]
pub struct ChallengeBuilt {
    challenge: ChallengeMessage,
}

/// Challenge handed to the wallet.
#[derive(Debug, Clone)]
pub struct AwaitingSignature {
    challenge: ChallengeMessage,
}

/// Signature verified against the connected address.
#[derive(Debug, Clone)]
pub struct Authorized {
    challenge: ChallengeMessage,
    signature: Ed25519Signature,
}

/// Signing failed or the signature did not verify (terminal).
#[derive(Debug, Clone)]
pub struct Rejected {
    reason: RejectionReason,
}

/// Why an attempt ended in [`Rejected`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    Signing(SigningFailure),
    InvalidSignature(String),
}

mod private {
    pub trait Sealed {}
    impl Sealed for super::Idle {}
    impl Sealed for super::ChallengeBuilt {}
    impl Sealed for super::AwaitingSignature {}
    impl Sealed for super::Authorized {}
    impl Sealed for super::Rejected {}
}

/// Marker trait for reveal attempt states. Sealed.
pub trait RevealState: private::Sealed + std::fmt::Debug {
    fn name() -> &'static str;

    fn is_terminal() -> bool {
        false
    }
}

impl RevealState for Idle {
    fn name() -> &'static str {
        "IDLE"
    }
}
impl RevealState for ChallengeBuilt {
    fn name() -> &'static str {
        "CHALLENGE_BUILT"
    }
}
impl RevealState for AwaitingSignature {
    fn name() -> &'static str {
        "AWAITING_SIGNATURE"
    }
}
impl RevealState for Authorized {
    fn name() -> &'static str {
        "AUTHORIZED"
    }
    fn is_terminal() -> bool {
        true
    }
}
impl RevealState for Rejected {
    fn name() -> &'static str {
        "REJECTED"
    }
    fn is_terminal() -> bool {
        true
    }
}

// ─── Attempt ─────────────────────────────────────────────────────────

/// One state change of an attempt.
#[derive(Debug, Clone)]
pub struct TransitionRecord {
    pub from_state: &'static str,
    pub to_state: &'static str,
    pub timestamp: Timestamp,
}

/// A single reveal attempt for one testimony, parameterized by its state.
#[derive(Debug)]
pub struct RevealAttempt<S: RevealState> {
    testimony_id: TestimonyId,
    address: WalletAddress,
    transition_log: Vec<TransitionRecord>,
    state: S,
}

impl<S: RevealState> RevealAttempt<S> {
    pub fn testimony_id(&self) -> &TestimonyId {
        &self.testimony_id
    }

    pub fn address(&self) -> &WalletAddress {
        &self.address
    }

    pub fn state_name(&self) -> &'static str {
        S::name()
    }

    pub fn is_terminal(&self) -> bool {
        S::is_terminal()
    }

    pub fn transition_log(&self) -> &[TransitionRecord] {
        &self.transition_log
    }

    fn transition_to<T: RevealState>(mut self, state: T) -> RevealAttempt<T> {
        self.transition_log.push(TransitionRecord {
            from_state: S::name(),
            to_state: T::name(),
            timestamp: Timestamp::now(),
        });
        RevealAttempt {
            testimony_id: self.testimony_id,
            address: self.address,
            transition_log: self.transition_log,
            state,
        }
    }
}

impl RevealAttempt<Idle> {
    /// Start an attempt for `testimony_id` on behalf of `address`.
    pub fn new(testimony_id: TestimonyId, address: WalletAddress) -> Self {
        Self {
            testimony_id,
            address,
            transition_log: Vec::new(),
            state: Idle,
        }
    }

    pub fn with_challenge(self, context: &SessionContext) -> RevealAttempt<ChallengeBuilt> {
        let challenge = context.challenge();
        self.transition_to(ChallengeBuilt { challenge })
    }
}

impl RevealAttempt<ChallengeBuilt> {
    pub fn challenge(&self) -> &ChallengeMessage {
        &self.state.challenge
    }

    /// Mark the challenge as handed to the wallet.
    pub fn request_signature(self) -> RevealAttempt<AwaitingSignature> {
        let challenge = self.state.challenge.clone();
        self.transition_to(AwaitingSignature { challenge })
    }
}

impl RevealAttempt<AwaitingSignature> {
    pub fn challenge(&self) -> &ChallengeMessage {
        &self.state.challenge
    }

    /// Check the wallet's answer against the challenge and the address.
    pub fn verify(
        self,
        signed: Result<Ed25519Signature, SigningFailure>,
    ) -> Result<RevealAttempt<Authorized>, RevealAttempt<Rejected>> {
        let signature = match signed {
            Ok(signature) => signature,
            Err(failure) => {
                return Err(self.transition_to(Rejected {
                    reason: RejectionReason::Signing(failure),
                }))
            }
        };
        match verify_for_address(&self.state.challenge, &signature, &self.address) {
            Ok(()) => {
                let challenge = self.state.challenge.clone();
                Ok(self.transition_to(Authorized {
                    challenge,
                    signature,
                }))
            }
            Err(e) => Err(self.transition_to(Rejected {
                reason: RejectionReason::InvalidSignature(e.to_string()),
            })),
        }
    }
}

impl RevealAttempt<Authorized> {
    pub fn challenge(&self) -> &ChallengeMessage {
        &self.state.challenge
    }

    pub fn signature(&self) -> &Ed25519Signature {
        &self.state.signature
    }
}

impl RevealAttempt<Rejected> {
    pub fn reason(&self) -> &RejectionReason {
        &self.state.reason
    }

    pub fn into_error(self) -> AuthorizationError {
        match self.state.reason {
            RejectionReason::Signing(failure) => AuthorizationError::SigningRejected {
                reason: failure.to_string(),
            },
            RejectionReason::InvalidSignature(detail) => {
                AuthorizationError::InvalidSignature(detail)
            }
        }
    }
}

// ─── In-flight guard ─────────────────────────────────────────────────

/// Holds a testimony's in-flight slot; releases it on drop.
struct InFlightSlot<'a> {
    set: &'a Mutex<HashSet<TestimonyId>>,
    id: TestimonyId,
}

impl<'a> InFlightSlot<'a> {
    fn acquire(
        set: &'a Mutex<HashSet<TestimonyId>>,
        id: &TestimonyId,
    ) -> Result<Self, AuthorizationError> {
        if !set.lock().insert(id.clone()) {
            return Err(AuthorizationError::AlreadyInFlight(id.clone()));
        }
        Ok(Self {
            set,
            id: id.clone(),
        })
    }
}

impl Drop for InFlightSlot<'_> {
    fn drop(&mut self) {
        self.set.lock().remove(&self.id);
    }
}

// ─── Authorizer ──────────────────────────────────────────────────────

/// Gates reveals of confidential values behind wallet signatures.
pub struct DecryptionAuthorizer<C = MarkerCodec> {
    wallet: Arc<dyn WalletProvider>,
    context: Arc<SessionContext>,
    codec: C,
    reveal_delay: Duration,
    in_flight: Mutex<HashSet<TestimonyId>>,
}

impl DecryptionAuthorizer<MarkerCodec> {
    pub fn new(wallet: Arc<dyn WalletProvider>, context: Arc<SessionContext>) -> Self {
        Self::with_codec(wallet, context, MarkerCodec)
    }
}

impl<C: ConfidentialCodec> DecryptionAuthorizer<C> {
    pub fn with_codec(
        wallet: Arc<dyn WalletProvider>,
        context: Arc<SessionContext>,
        codec: C,
    ) -> Self {
        Self {
            wallet,
            context,
            codec,
            reveal_delay: DEFAULT_REVEAL_DELAY,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Override the pause between authorization and reveal.
    pub fn with_reveal_delay(mut self, delay: Duration) -> Self {
        self.reveal_delay = delay;
        self
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    /// Whether a reveal of `id` is currently running.
    pub fn is_in_flight(&self, id: &TestimonyId) -> bool {
        self.in_flight.lock().contains(id)
    }

    /// Reveal the plaintext behind `token` once the wallet has signed.
    pub async fn authorize(
        &self,
        testimony_id: &TestimonyId,
        token: &ConfidentialValue,
    ) -> Result<f64, AuthorizationError> {
        let address = self
            .wallet
            .connected_address()
            .ok_or(AuthorizationError::NotConnected)?;
        let _slot = InFlightSlot::acquire(&self.in_flight, testimony_id)?;

        let attempt = RevealAttempt::new(testimony_id.clone(), address)
            .with_challenge(&self.context)
            .request_signature();
        let fingerprint = challenge_fingerprint(attempt.challenge());
        tracing::debug!(id = %testimony_id, challenge = %fingerprint, "requesting reveal signature");

        let signed = self.wallet.sign_message(attempt.challenge()).await;
        let authorized = match attempt.verify(signed) {
            Ok(authorized) => authorized,
            Err(rejected) => {
                tracing::warn!(
                    id = %testimony_id,
                    challenge = %fingerprint,
                    reason = ?rejected.reason(),
                    "reveal rejected"
                );
                return Err(rejected.into_error());
            }
        };

        tokio::time::sleep(self.reveal_delay).await;
        let value = self.codec.decode(token)?;
        tracing::info!(
            id = %testimony_id,
            address = %authorized.address(),
            challenge = %fingerprint,
            "credibility revealed"
        );
        Ok(value)
    }
}
