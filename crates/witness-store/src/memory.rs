//! # In-Memory Backend
//!
//! Thread-safe, cloneable key-value map. Clones share the same data and the
//! same availability flag.
//!
//! All operations are synchronous under the hood (the lock is
//! `parking_lot`, not `tokio::sync`) because no lock is held across an
//! `.await`. `parking_lot::RwLock` does not poison.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::{validate_key, KeyValueReader, KeyValueWriter, StoreError};

/// In-memory key-value backend.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    data: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    available: Arc<AtomicBool>,
    address: String,
}

impl MemoryStore {
    /// Create an empty, available store with the given contract address.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
            available: Arc::new(AtomicBool::new(true)),
            address: address.into(),
        }
    }

    /// Flip the availability probe.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Write a payload directly, bypassing the async interface.
    pub fn insert_raw(&self, key: impl Into<String>, value: impl Into<Vec<u8>>) {
        self.data.write().insert(key.into(), value.into());
    }

    /// Read a payload directly, bypassing the async interface.
    pub fn get_raw(&self, key: &str) -> Option<Vec<u8>> {
        self.data.read().get(key).cloned()
    }

    /// Number of keys holding a non-empty payload.
    pub fn len(&self) -> usize {
        self.data.read().values().filter(|v| !v.is_empty()).count()
    }

    /// Whether no key holds a non-empty payload.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new("memory")
    }
}

#[async_trait]
impl KeyValueReader for MemoryStore {
    async fn is_available(&self) -> Result<bool, StoreError> {
        Ok(self.available.load(Ordering::SeqCst))
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        validate_key(key)?;
        Ok(self.data.read().get(key).cloned().unwrap_or_default())
    }

    async fn address(&self) -> Result<String, StoreError> {
        Ok(self.address.clone())
    }
}

#[async_trait]
impl KeyValueWriter for MemoryStore {
    async fn set(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        validate_key(key)?;
        if !self.available.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable);
        }
        self.data.write().insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn absent_key_reads_empty() {
        let store = MemoryStore::default();
        assert!(store.get("missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn set_then_get() {
        let store = MemoryStore::new("0xabc");
        store.set("k", b"v").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), b"v");
        assert_eq!(store.address().await.unwrap(), "0xabc");
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn clones_share_data_and_availability() {
        let store = MemoryStore::default();
        let other = store.clone();
        other.set("k", b"v").await.unwrap();
        assert_eq!(store.get_raw("k").unwrap(), b"v");

        store.set_available(false);
        assert!(!other.is_available().await.unwrap());
        assert!(matches!(
            other.set("k", b"w").await,
            Err(StoreError::Unavailable)
        ));
    }

    #[tokio::test]
    async fn empty_payload_clears() {
        let store = MemoryStore::default();
        store.set("k", b"v").await.unwrap();
        store.set("k", b"").await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn invalid_key_rejected() {
        let store = MemoryStore::default();
        assert!(matches!(
            store.get("").await,
            Err(StoreError::InvalidKey(_))
        ));
    }
}
