//! # Directory Backend
//!
//! Stores each key as one file under a root directory. The file name is the
//! SHA-256 of the key, `{root}/{sha256(key)}.json`, so arbitrary keys map
//! to safe, fixed-length names.
//!
//! Each write goes to its own uniquely named temporary file in the root and
//! is renamed into place, so a reader never observes a half-written payload
//! and concurrent writers to one key never share a temporary file. The store is available
//! exactly when the root exists and is a directory.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::{validate_key, KeyValueReader, KeyValueWriter, StoreError};

/// Filesystem-backed key-value store.
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
    address: String,
}

impl DirStore {
    /// Open a store rooted at `root`. The directory is not created; a
    /// missing root reports the store as unavailable.
    pub fn open(root: impl Into<PathBuf>, address: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            address: address.into(),
        }
    }

    /// Open a store rooted at `root`, creating the directory if needed.
    pub async fn create(
        root: impl Into<PathBuf>,
        address: impl Into<String>,
    ) -> Result<Self, StoreError> {
        let store = Self::open(root, address);
        tokio::fs::create_dir_all(&store.root)
            .await
            .map_err(|source| StoreError::Io {
                key: store.root.display().to_string(),
                source,
            })?;
        Ok(store)
    }

    /// Returns the root directory of this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Compute the file path for a key.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let digest: String = Sha256::digest(key.as_bytes())
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect();
        self.root.join(format!("{digest}.json"))
    }
}

#[async_trait]
impl KeyValueReader for DirStore {
    async fn is_available(&self) -> Result<bool, StoreError> {
        match tokio::fs::metadata(&self.root).await {
            Ok(meta) => Ok(meta.is_dir()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(source) => Err(StoreError::Io {
                key: self.root.display().to_string(),
                source,
            }),
        }
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        validate_key(key)?;
        match tokio::fs::read(self.path_for(key)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(source) => Err(StoreError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    async fn address(&self) -> Result<String, StoreError> {
        Ok(self.address.clone())
    }
}

#[async_trait]
impl KeyValueWriter for DirStore {
    async fn set(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        validate_key(key)?;
        if !self.is_available().await? {
            return Err(StoreError::Unavailable);
        }
        let path = self.path_for(key);
        let root = self.root.clone();
        let payload = value.to_vec();
        let io_err = |source| StoreError::Io {
            key: key.to_string(),
            source,
        };
        tokio::task::spawn_blocking(move || -> std::io::Result<()> {
            let mut tmp = tempfile::NamedTempFile::new_in(&root)?;
            tmp.write_all(&payload)?;
            tmp.persist(&path).map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .map_err(|e| io_err(std::io::Error::other(e)))?
        .map_err(io_err)?;
        tracing::debug!(key, bytes = value.len(), "stored payload");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_root_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirStore::open(dir.path().join("absent"), "0x0");
        assert!(!store.is_available().await.unwrap());
        assert!(matches!(
            store.set("k", b"v").await,
            Err(StoreError::Unavailable)
        ));
    }

    #[tokio::test]
    async fn create_then_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirStore::create(dir.path().join("store"), "0xabc")
            .await
            .unwrap();
        assert!(store.is_available().await.unwrap());
        assert!(store.get("testimony_keys").await.unwrap().is_empty());

        store.set("testimony_keys", b"[\"a\"]").await.unwrap();
        assert_eq!(store.get("testimony_keys").await.unwrap(), b"[\"a\"]");

        store.set("testimony_keys", b"[]").await.unwrap();
        assert_eq!(store.get("testimony_keys").await.unwrap(), b"[]");
    }

    #[tokio::test]
    async fn reopen_sees_previous_writes() {
        let dir = tempfile::tempdir().unwrap();
        let first = DirStore::create(dir.path(), "0x0").await.unwrap();
        first.set("k", b"persisted").await.unwrap();

        let second = DirStore::open(dir.path(), "0x0");
        assert_eq!(second.get("k").await.unwrap(), b"persisted");
    }

    #[tokio::test]
    async fn concurrent_writes_to_one_key_stay_whole() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirStore::create(dir.path(), "0x0").await.unwrap();
        let long_a = vec![b'a'; 64 * 1024];
        let long_b = vec![b'b'; 16 * 1024];

        let (first, second) = tokio::join!(
            store.set("testimony_keys", &long_a),
            store.set("testimony_keys", &long_b),
        );
        first.unwrap();
        second.unwrap();

        let stored = store.get("testimony_keys").await.unwrap();
        assert!(stored == long_a || stored == long_b);

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        let expected = store.path_for("testimony_keys");
        assert_eq!(leftovers, vec![expected.file_name().unwrap().to_owned()]);
    }

    #[test]
    fn path_is_digest_named() {
        let store = DirStore::open("/tmp/store", "0x0");
        let path = store.path_for("testimony_keys");
        let name = path.file_name().unwrap().to_str().unwrap();
        assert_eq!(name.len(), 64 + ".json".len());
        assert_ne!(path, store.path_for("testimony_other"));
    }
}
