//! # SHA-256 Challenge Fingerprints
//!
//! Challenge messages embed a 2000-digit session public key. Logs refer to
//! a challenge by the SHA-256 of its bytes instead of echoing it.

use sha2::{Digest, Sha256};
use witness_core::ChallengeMessage;

/// Lowercase hex SHA-256 of the challenge message bytes.
pub fn challenge_fingerprint(message: &ChallengeMessage) -> String {
    Sha256::digest(message.as_bytes())
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}
