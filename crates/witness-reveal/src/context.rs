//! # Session Context
//!
//! The fixed parameters every challenge in a session is built from. They
//! are gathered once, when the session starts, and never change:
//!
//! | Field | Source |
//! |---|---|
//! | `public_key` | `0x` + 2000 random hex digits |
//! | `contract_address` | the store reader's [`address()`](witness_store::KeyValueReader::address) |
//! | `chain_id` | the [`ChainProvider`] |
//! | `start_timestamp` | wall clock at initialization |
//! | `duration_days` | configuration, default 30 |

use rand::RngCore;
use witness_core::{build_challenge, ChallengeMessage, Timestamp};
use witness_store::KeyValueReader;

use crate::error::AuthorizationError;
use crate::provider::ChainProvider;

/// Default validity window of a session, in days.
pub const DEFAULT_DURATION_DAYS: u32 = 30;

/// Random bytes behind the session public key (two hex digits each).
const PUBLIC_KEY_BYTES: usize = 1000;

/// Immutable parameters of one reveal session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    public_key: String,
    contract_address: String,
    chain_id: u64,
    start_timestamp: Timestamp,
    duration_days: u32,
}

impl SessionContext {
    /// Gather the session parameters from the store and the chain.
    ///
    /// # Errors
    ///
    /// `Store` if the contract address cannot be read, `Chain` if the chain
    /// id cannot be fetched.
    pub async fn initialize(
        reader: &dyn KeyValueReader,
        chain: &dyn ChainProvider,
        duration_days: u32,
    ) -> Result<Self, AuthorizationError> {
        let contract_address = reader.address().await?;
        let chain_id = chain.chain_id().await?;
        let ctx = Self::new(
            random_public_key(),
            contract_address,
            chain_id,
            Timestamp::now(),
            duration_days,
        );
        tracing::debug!(
            contract = %ctx.contract_address,
            chain_id,
            start = ctx.start_timestamp.epoch_secs(),
            duration_days,
            "reveal session initialized"
        );
        Ok(ctx)
    }

    /// Assemble a context from known values.
    pub fn new(
        public_key: impl Into<String>,
        contract_address: impl Into<String>,
        chain_id: u64,
        start_timestamp: Timestamp,
        duration_days: u32,
    ) -> Self {
        Self {
            public_key: public_key.into(),
            contract_address: contract_address.into(),
            chain_id,
            start_timestamp,
            duration_days,
        }
    }

    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    pub fn contract_address(&self) -> &str {
        &self.contract_address
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn start_timestamp(&self) -> Timestamp {
        self.start_timestamp
    }

    pub fn duration_days(&self) -> u32 {
        self.duration_days
    }

    /// End of the validity window.
    pub fn expires_at(&self) -> Timestamp {
        Timestamp::from_utc(
            *self.start_timestamp.as_datetime()
                + chrono::Duration::days(i64::from(self.duration_days)),
        )
    }

    /// The message a wallet signs to authorize a reveal in this session.
    pub fn challenge(&self) -> ChallengeMessage {
        build_challenge(
            &self.public_key,
            &self.contract_address,
            self.chain_id,
            self.start_timestamp.epoch_secs(),
            self.duration_days,
        )
    }
}

fn random_public_key() -> String {
    let mut bytes = [0u8; PUBLIC_KEY_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    let mut key = String::with_capacity(2 + PUBLIC_KEY_BYTES * 2);
    key.push_str("0x");
    for b in bytes {
        key.push_str(&format!("{b:02x}"));
    }
    key
}
