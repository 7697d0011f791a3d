//! # Challenge Messages — Deterministic Signing Input
//!
//! A `ChallengeMessage` is the exact text a viewer's wallet signs to
//! authorize revealing one confidential value.
//!
//! ## Security Invariant
//!
//! The inner string is private and the only constructor is
//! [`build_challenge()`]. Signing and verification in `witness-crypto`
//! accept `&ChallengeMessage`, so a signature can only ever cover text in
//! the canonical line format:
//!
//! ```text
//! publickey:<public key>
//! contractAddresses:<contract address>
//! contractsChainId:<chain id>
//! startTimestamp:<epoch seconds>
//! durationDays:<days>
//! ```
//!
//! Lines are joined by `\n` with no trailing newline. Identical inputs give
//! byte-identical messages.

/// Text produced exclusively by [`build_challenge()`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChallengeMessage(String);

/// Build the challenge message for a reveal session.
pub fn build_challenge(
    public_key: &str,
    contract_address: &str,
    chain_id: u64,
    start_timestamp: i64,
    duration_days: u32,
) -> ChallengeMessage {
    ChallengeMessage(format!(
        "publickey:{public_key}\ncontractAddresses:{contract_address}\ncontractsChainId:{chain_id}\nstartTimestamp:{start_timestamp}\ndurationDays:{duration_days}"
    ))
}

impl ChallengeMessage {
    /// The message text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The message bytes, as signed.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl AsRef<[u8]> for ChallengeMessage {
    fn as_ref(&self) -> &[u8] {
        self.0.as_bytes()
    }
}
