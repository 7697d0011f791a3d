//! # Domain Identity Newtypes
//!
//! Newtype wrappers for the identifiers in the witness stack. These prevent
//! accidental identifier confusion — you cannot pass a `CaseId` where a
//! `TestimonyId` is expected.
//!
//! ## Testimony Id Format
//!
//! Fresh ids are `testimony-<unix millis>-<4 base-36 chars>`. Ids read back
//! from the store are opaque: any non-empty string without whitespace is
//! accepted so that records written by other clients stay addressable.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::WitnessError;

const ID_SUFFIX_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 4;

/// Prefix for per-testimony store keys.
pub const RECORD_KEY_PREFIX: &str = "testimony_";

/// Unique identifier for a testimony.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TestimonyId(String);

/// Identifier of a case in the case catalog (e.g. `case-1`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaseId(String);

/// Address of a connected wallet.
///
/// For the Ed25519 wallets used here this is the lowercase hex encoding of
/// the 32-byte public key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WalletAddress(String);

impl TestimonyId {
    /// Generate a fresh identifier from the wall clock and a random suffix.
    pub fn generate() -> Self {
        let millis = chrono::Utc::now().timestamp_millis();
        let mut rng = rand::thread_rng();
        let suffix: String = (0..ID_SUFFIX_LEN)
            .map(|_| ID_SUFFIX_ALPHABET[rng.gen_range(0..ID_SUFFIX_ALPHABET.len())] as char)
            .collect();
        Self(format!("testimony-{millis}-{suffix}"))
    }

    /// Wrap an existing identifier.
    ///
    /// # Errors
    ///
    /// Rejects empty strings and strings containing whitespace.
    pub fn new(id: impl Into<String>) -> Result<Self, WitnessError> {
        let id = id.into();
        if id.is_empty() {
            return Err(WitnessError::Validation(
                "testimony id must not be empty".to_string(),
            ));
        }
        if id.chars().any(char::is_whitespace) {
            return Err(WitnessError::Validation(format!(
                "testimony id must not contain whitespace: {id:?}"
            )));
        }
        Ok(Self(id))
    }

    /// The key under which this testimony's record is stored.
    pub fn record_key(&self) -> String {
        format!("{RECORD_KEY_PREFIX}{}", self.0)
    }

    /// Access the identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TestimonyId {
    type Error = WitnessError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TestimonyId> for String {
    fn from(id: TestimonyId) -> Self {
        id.0
    }
}

impl CaseId {
    /// Wrap a case identifier. Membership in the catalog is checked
    /// separately by [`crate::Case::lookup()`].
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Access the identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl WalletAddress {
    /// Wrap a wallet address, normalizing to lowercase.
    pub fn new(address: impl AsRef<str>) -> Self {
        Self(address.as_ref().trim().to_lowercase())
    }

    /// Access the address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TestimonyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for CaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
