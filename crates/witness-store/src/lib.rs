//! # witness-store — Key-Value Backend Interface
//!
//! Testimonies live in an external key-value store addressed by string keys
//! with byte payloads (UTF-8 JSON in practice). The store is reached
//! through two accessors:
//!
//! - [`KeyValueReader`] — read-only: availability probe, `get`, and the
//!   backend's contract address.
//! - [`KeyValueWriter`] — signer-bound: everything a reader can do, plus
//!   `set`.
//!
//! A missing key reads as an empty payload, and writing an empty payload is
//! how a key is cleared. There is no delete.
//!
//! ## Backends
//!
//! - [`MemoryStore`] — `parking_lot`-guarded map, for tests and embedding.
//! - [`DirStore`] — one file per key under a root directory, named by the
//!   SHA-256 of the key.
//!
//! ## Crate Policy
//!
//! - No dependency on other `witness-*` crates; the store knows nothing
//!   about testimonies.
//! - Locks are never held across `.await`.

pub mod dir;
pub mod memory;

pub use dir::DirStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by a key-value backend.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backend reports itself as not ready.
    #[error("store is not available")]
    Unavailable,

    /// The key cannot be addressed by this backend.
    #[error("invalid store key {0:?}")]
    InvalidKey(String),

    /// Underlying I/O failed.
    #[error("io error on key {key:?}: {source}")]
    Io {
        /// The key being read or written.
        key: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// Read-only access to the backend.
#[async_trait]
pub trait KeyValueReader: Send + Sync {
    /// Whether the backend is ready to serve reads.
    async fn is_available(&self) -> Result<bool, StoreError>;

    /// Fetch the payload stored under `key`. Absent keys read as empty.
    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError>;

    /// Address of the backing contract, used in reveal challenges.
    async fn address(&self) -> Result<String, StoreError>;
}

/// Signer-bound access to the backend.
#[async_trait]
pub trait KeyValueWriter: KeyValueReader {
    /// Store `value` under `key`, replacing any previous payload.
    async fn set(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;
}

/// Longest key any backend accepts.
pub const MAX_KEY_LEN: usize = 512;

/// Reject keys no backend can address.
pub(crate) fn validate_key(key: &str) -> Result<(), StoreError> {
    if key.is_empty() || key.len() > MAX_KEY_LEN || key.chars().any(char::is_control) {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}
