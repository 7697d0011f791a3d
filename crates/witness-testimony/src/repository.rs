//! # Testimony Repository
//!
//! Loads and stores testimonies through the key-value backend.
//!
//! ## Keys
//!
//! | Key | Payload |
//! |---|---|
//! | `testimony_keys` | JSON array of testimony ids, in append order |
//! | `testimony_<id>` | [`TestimonyRecord`] JSON |
//! | `testimony_journal` | `{"pending": "<id>"}` while an append is in flight |
//!
//! ## Read Path
//!
//! Reads never fail. An unavailable backend, a missing or unparsable index,
//! and malformed records all degrade to empty or partial results with a
//! `warn!` log line. Partial results are expected while another client is
//! mid-append.
//!
//! ## Append Path
//!
//! An append touches two keys, the record and the index, and the backend
//! offers no transaction across them. The pending id is journaled first:
//!
//! ```text
//! journal := {pending: id}  →  record := json  →  index += id  →  journal := ""
//! ```
//!
//! If the process dies between the record write and the index write, the
//! next append (or an explicit [`TestimonyRepository::recover()`]) finds the
//! journal, sees the record exists, and links the id into the index.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use witness_core::{CaseId, TestimonyId};
use witness_crypto::{ConfidentialCodec, MarkerCodec};
use witness_store::{KeyValueReader, KeyValueWriter, StoreError};

use crate::contradiction::ContradictionAnalyzer;
use crate::error::{AppendStage, RepositoryError};
use crate::record::{NewTestimony, Testimony, TestimonyRecord};
use crate::snapshot::LoadSnapshot;

/// Key of the testimony index.
pub const INDEX_KEY: &str = "testimony_keys";

/// Key of the append journal.
pub const JOURNAL_KEY: &str = "testimony_journal";

#[derive(Debug, Serialize, Deserialize)]
struct JournalEntry {
    pending: TestimonyId,
}

enum IndexRead {
    Missing,
    Parsed(Vec<String>),
    Corrupt(String),
}

/// Repository of testimonies over a key-value backend.
#[derive(Clone)]
pub struct TestimonyRepository<C = MarkerCodec> {
    reader: Arc<dyn KeyValueReader>,
    codec: C,
}

impl TestimonyRepository<MarkerCodec> {
    /// Create a repository using the placeholder credibility codec.
    pub fn new(reader: Arc<dyn KeyValueReader>) -> Self {
        Self::with_codec(reader, MarkerCodec)
    }
}

impl<C: ConfidentialCodec> TestimonyRepository<C> {
    /// Create a repository with an explicit credibility codec.
    pub fn with_codec(reader: Arc<dyn KeyValueReader>, codec: C) -> Self {
        Self { reader, codec }
    }

    /// The codec used to encode submitted scores.
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Ask the backend whether it is available.
    pub async fn check_availability(&self) -> Result<bool, RepositoryError> {
        Ok(self.reader.is_available().await?)
    }

    /// Ids in the index, in append order, without duplicates.
    ///
    /// Empty when the backend is unavailable or the index is missing,
    /// blank, or unparsable.
    pub async fn list_keys(&self) -> Vec<TestimonyId> {
        if !self.probe().await {
            return Vec::new();
        }
        self.read_keys().await
    }

    /// Every readable testimony, newest first.
    ///
    /// Records that are missing or fail to parse are skipped. Ties on
    /// timestamp keep index order.
    pub async fn load_all(&self) -> Vec<Testimony> {
        if !self.probe().await {
            return Vec::new();
        }
        let keys = self.read_keys().await;
        let mut list = Vec::with_capacity(keys.len());
        let mut skipped = 0usize;
        for id in keys {
            match self.load_record(&id).await {
                Ok(Some(testimony)) => list.push(testimony),
                Ok(None) => {
                    skipped += 1;
                    tracing::debug!(id = %id, "indexed testimony has no record yet");
                }
                Err(e) => {
                    skipped += 1;
                    tracing::warn!(id = %id, error = %e, "skipping unreadable testimony");
                }
            }
        }
        list.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        tracing::debug!(loaded = list.len(), skipped, "loaded testimonies");
        list
    }

    /// Load a single testimony by id.
    ///
    /// # Errors
    ///
    /// Unlike [`Self::load_all()`], errors surface: this backs an explicit
    /// user action.
    pub async fn find(&self, id: &TestimonyId) -> Result<Option<Testimony>, RepositoryError> {
        if !self.reader.is_available().await? {
            return Err(RepositoryError::Unavailable);
        }
        self.load_record(id).await
    }

    /// Load, analyze, and freeze one view of the store.
    pub async fn snapshot<A: ConfidentialCodec>(
        &self,
        analyzer: &ContradictionAnalyzer<A>,
    ) -> LoadSnapshot {
        let testimonies = self.load_all().await;
        let contradictions = analyzer.find_contradictions(&testimonies);
        LoadSnapshot::new(testimonies, contradictions)
    }

    /// Validate, encode, and append a new submission.
    pub async fn submit(
        &self,
        writer: &dyn KeyValueWriter,
        case_id: &CaseId,
        submission: NewTestimony,
    ) -> Result<Testimony, RepositoryError> {
        let testimony = Testimony::create(&self.codec, case_id, submission)?;
        self.append(writer, &testimony).await?;
        Ok(testimony)
    }

    /// Write a testimony record and link it into the index.
    ///
    /// Reconciles any interrupted earlier append first. Appending an id
    /// already in the index rewrites the record and leaves the index alone.
    /// Backend failures at any step, recovery included, come back as
    /// [`RepositoryError::Submission`] tagged with the failing stage.
    pub async fn append(
        &self,
        writer: &dyn KeyValueWriter,
        testimony: &Testimony,
    ) -> Result<(), RepositoryError> {
        let id = &testimony.id;
        let available = writer
            .is_available()
            .await
            .map_err(submission_error(id, AppendStage::Probe))?;
        if !available {
            return Err(RepositoryError::Unavailable);
        }
        self.recover(writer).await.map_err(|e| match e {
            RepositoryError::Store(source) => RepositoryError::Submission {
                id: id.clone(),
                stage: AppendStage::Recover,
                source,
            },
            other => other,
        })?;

        let record = serde_json::to_vec(&testimony.to_record())?;
        let journal = serde_json::to_vec(&JournalEntry {
            pending: id.clone(),
        })?;

        writer
            .set(JOURNAL_KEY, &journal)
            .await
            .map_err(submission_error(id, AppendStage::Journal))?;
        writer
            .set(&id.record_key(), &record)
            .await
            .map_err(submission_error(id, AppendStage::Record))?;

        let index = writer
            .get(INDEX_KEY)
            .await
            .map_err(submission_error(id, AppendStage::Index))?;
        let mut keys = index_for_update(&index)?;
        if !keys.iter().any(|k| k == id.as_str()) {
            keys.push(id.as_str().to_string());
            writer
                .set(INDEX_KEY, &serde_json::to_vec(&keys)?)
                .await
                .map_err(submission_error(id, AppendStage::Index))?;
        }

        if let Err(e) = writer.set(JOURNAL_KEY, b"").await {
            // Harmless: the next append sees the id already indexed.
            tracing::warn!(id = %id, error = %e, "could not clear append journal");
        }
        tracing::info!(id = %id, case = %testimony.case_id, "testimony appended");
        Ok(())
    }

    /// Finish or discard an append interrupted by a crash.
    ///
    /// Returns the id that was re-linked into the index, if any.
    pub async fn recover(
        &self,
        writer: &dyn KeyValueWriter,
    ) -> Result<Option<TestimonyId>, RepositoryError> {
        let raw = writer.get(JOURNAL_KEY).await?;
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        let entry: JournalEntry = match serde_json::from_slice(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "discarding unparsable append journal");
                writer.set(JOURNAL_KEY, b"").await?;
                return Ok(None);
            }
        };
        let pending = entry.pending;

        let mut relinked = false;
        if writer.get(&pending.record_key()).await?.is_empty() {
            tracing::debug!(id = %pending, "interrupted append never wrote its record");
        } else {
            let mut keys = index_for_update(&writer.get(INDEX_KEY).await?)?;
            if !keys.iter().any(|k| k == pending.as_str()) {
                keys.push(pending.as_str().to_string());
                writer.set(INDEX_KEY, &serde_json::to_vec(&keys)?).await?;
                relinked = true;
                tracing::warn!(id = %pending, "re-linked orphaned testimony into the index");
            }
        }
        writer.set(JOURNAL_KEY, b"").await?;
        Ok(relinked.then_some(pending))
    }

    async fn probe(&self) -> bool {
        match self.reader.is_available().await {
            Ok(true) => true,
            Ok(false) => {
                tracing::warn!("testimony store is not available");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "testimony store availability probe failed");
                false
            }
        }
    }

    async fn read_keys(&self) -> Vec<TestimonyId> {
        let bytes = match self.reader.get(INDEX_KEY).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(error = %e, "could not read testimony index");
                return Vec::new();
            }
        };
        match parse_index(&bytes) {
            IndexRead::Missing => Vec::new(),
            IndexRead::Corrupt(reason) => {
                tracing::warn!(%reason, "ignoring unparsable testimony index");
                Vec::new()
            }
            IndexRead::Parsed(raw) => ids_from_index(raw),
        }
    }

    async fn load_record(&self, id: &TestimonyId) -> Result<Option<Testimony>, RepositoryError> {
        let key = id.record_key();
        let bytes = self.reader.get(&key).await?;
        if bytes.is_empty() {
            return Ok(None);
        }
        let record = TestimonyRecord::parse(&key, &bytes)?;
        Ok(Some(Testimony::from_record(id.clone(), record)))
    }
}

fn submission_error(
    id: &TestimonyId,
    stage: AppendStage,
) -> impl FnOnce(StoreError) -> RepositoryError + '_ {
    move |source| RepositoryError::Submission {
        id: id.clone(),
        stage,
        source,
    }
}

fn parse_index(bytes: &[u8]) -> IndexRead {
    let Ok(text) = std::str::from_utf8(bytes) else {
        return IndexRead::Corrupt("index is not UTF-8".to_string());
    };
    if text.trim().is_empty() {
        return IndexRead::Missing;
    }
    match serde_json::from_str::<Vec<String>>(text) {
        Ok(raw) => IndexRead::Parsed(raw),
        Err(e) => IndexRead::Corrupt(e.to_string()),
    }
}

fn index_for_update(bytes: &[u8]) -> Result<Vec<String>, RepositoryError> {
    match parse_index(bytes) {
        IndexRead::Missing => Ok(Vec::new()),
        IndexRead::Parsed(raw) => Ok(raw),
        IndexRead::Corrupt(reason) => Err(RepositoryError::CorruptIndex(reason)),
    }
}

fn ids_from_index(raw: Vec<String>) -> Vec<TestimonyId> {
    let mut seen = HashSet::new();
    let mut ids = Vec::with_capacity(raw.len());
    for entry in raw {
        match TestimonyId::new(entry) {
            Ok(id) => {
                if seen.insert(id.clone()) {
                    ids.push(id);
                }
            }
            Err(e) => tracing::warn!(error = %e, "skipping invalid index entry"),
        }
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use witness_store::MemoryStore;

    fn repo(store: &MemoryStore) -> TestimonyRepository {
        TestimonyRepository::new(Arc::new(store.clone()))
    }

    fn record_json(witness: &str, ts: i64, case: &str, credibility: &str) -> Vec<u8> {
        serde_json::to_vec(&serde_json::json!({
            "witness": witness,
            "content": format!("statement by {witness}"),
            "timestamp": ts,
            "caseId": case,
            "credibility": credibility,
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn list_keys_missing_index_is_empty() {
        let store = MemoryStore::default();
        assert!(repo(&store).list_keys().await.is_empty());
    }

    #[tokio::test]
    async fn list_keys_degrades_on_bad_index() {
        let store = MemoryStore::default();
        let payloads: [&[u8]; 5] = [b"", b"   ", b"{\"not\":\"an array\"}", b"[1,2", &[0xff, 0x00]];
        for payload in payloads {
            store.insert_raw(INDEX_KEY, payload.to_vec());
            assert!(repo(&store).list_keys().await.is_empty());
        }
    }

    #[tokio::test]
    async fn list_keys_preserves_order_and_dedups() {
        let store = MemoryStore::default();
        store.insert_raw(INDEX_KEY, br#"["b","a","b","","c"]"#.to_vec());
        let keys: Vec<String> = repo(&store)
            .list_keys()
            .await
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[tokio::test]
    async fn load_all_sorts_newest_first() {
        let store = MemoryStore::default();
        store.insert_raw(INDEX_KEY, br#"["old","new","mid"]"#.to_vec());
        store.insert_raw("testimony_old", record_json("A", 100, "case-1", "FHE-NTA="));
        store.insert_raw("testimony_new", record_json("B", 300, "case-1", "FHE-NTA="));
        store.insert_raw("testimony_mid", record_json("C", 200, "case-2", "FHE-NTA="));

        let ids: Vec<String> = repo(&store)
            .load_all()
            .await
            .into_iter()
            .map(|t| t.id.to_string())
            .collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
    }

    #[tokio::test]
    async fn load_all_skips_malformed_and_missing() {
        let store = MemoryStore::default();
        store.insert_raw(INDEX_KEY, br#"["a","bad","b","ghost"]"#.to_vec());
        store.insert_raw("testimony_a", record_json("A", 1, "case-1", "FHE-NTA="));
        store.insert_raw("testimony_bad", b"{\"witness\": ".to_vec());
        store.insert_raw("testimony_b", record_json("B", 2, "case-1", "FHE-NTU="));

        let loaded = repo(&store).load_all().await;
        assert_eq!(loaded.len(), 2);
        assert!(loaded.iter().all(|t| t.id.as_str() != "bad"));
    }

    #[tokio::test]
    async fn load_all_unavailable_is_empty() {
        let store = MemoryStore::default();
        store.insert_raw(INDEX_KEY, br#"["a"]"#.to_vec());
        store.insert_raw("testimony_a", record_json("A", 1, "case-1", "FHE-NTA="));
        store.set_available(false);
        let repo = repo(&store);
        assert!(repo.load_all().await.is_empty());
        assert!(repo.list_keys().await.is_empty());
        assert!(!repo.check_availability().await.unwrap());
    }

    #[tokio::test]
    async fn append_writes_record_and_index() {
        let store = MemoryStore::default();
        let repo = repo(&store);
        let t = repo
            .submit(
                &store,
                &CaseId::new("case-1"),
                NewTestimony {
                    witness: "Miss Scarlet".into(),
                    content: "Heard a shot".into(),
                    credibility: 80.0,
                },
            )
            .await
            .unwrap();

        assert_eq!(repo.list_keys().await, vec![t.id.clone()]);
        assert_eq!(repo.find(&t.id).await.unwrap(), Some(t.clone()));
        assert!(store.get_raw(JOURNAL_KEY).unwrap().is_empty());

        let stored: serde_json::Value =
            serde_json::from_slice(&store.get_raw(&t.id.record_key()).unwrap()).unwrap();
        assert_eq!(stored["caseId"], "case-1");
        assert_eq!(stored["credibility"], "FHE-ODA=");
    }

    #[tokio::test]
    async fn append_is_idempotent_on_index() {
        let store = MemoryStore::default();
        let repo = repo(&store);
        let t = Testimony::create(
            &MarkerCodec,
            &CaseId::new("case-2"),
            NewTestimony {
                witness: "W".into(),
                ..NewTestimony::default()
            },
        )
        .unwrap();
        repo.append(&store, &t).await.unwrap();
        repo.append(&store, &t).await.unwrap();
        assert_eq!(repo.list_keys().await.len(), 1);
    }

    #[tokio::test]
    async fn append_refuses_to_clobber_corrupt_index() {
        let store = MemoryStore::default();
        store.insert_raw(INDEX_KEY, b"[\"a\", oops".to_vec());
        let repo = repo(&store);
        let err = repo
            .submit(
                &store,
                &CaseId::new("case-1"),
                NewTestimony {
                    witness: "W".into(),
                    ..NewTestimony::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::CorruptIndex(_)));
        assert_eq!(store.get_raw(INDEX_KEY).unwrap(), b"[\"a\", oops");
    }

    #[tokio::test]
    async fn append_unavailable_fails() {
        let store = MemoryStore::default();
        store.set_available(false);
        let err = repo(&store)
            .submit(
                &store,
                &CaseId::new("case-1"),
                NewTestimony {
                    witness: "W".into(),
                    ..NewTestimony::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Unavailable));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn recover_relinks_orphaned_record() {
        let store = MemoryStore::default();
        store.insert_raw(INDEX_KEY, br#"["a"]"#.to_vec());
        store.insert_raw("testimony_a", record_json("A", 1, "case-1", "FHE-NTA="));
        store.insert_raw("testimony_orphan", record_json("O", 2, "case-1", "FHE-NTA="));
        store.insert_raw(JOURNAL_KEY, br#"{"pending":"orphan"}"#.to_vec());

        let repo = repo(&store);
        let recovered = repo.recover(&store).await.unwrap();
        assert_eq!(recovered.map(String::from).as_deref(), Some("orphan"));
        assert_eq!(repo.list_keys().await.len(), 2);
        assert!(store.get_raw(JOURNAL_KEY).unwrap().is_empty());
        assert_eq!(repo.recover(&store).await.unwrap(), None);
    }

    #[tokio::test]
    async fn recover_discards_journal_without_record() {
        let store = MemoryStore::default();
        store.insert_raw(JOURNAL_KEY, br#"{"pending":"never-written"}"#.to_vec());
        let repo = repo(&store);
        assert_eq!(repo.recover(&store).await.unwrap(), None);
        assert!(repo.list_keys().await.is_empty());
        assert!(store.get_raw(JOURNAL_KEY).unwrap().is_empty());
    }

    #[tokio::test]
    async fn recover_discards_garbage_journal() {
        let store = MemoryStore::default();
        store.insert_raw(JOURNAL_KEY, b"???".to_vec());
        assert_eq!(repo(&store).recover(&store).await.unwrap(), None);
        assert!(store.get_raw(JOURNAL_KEY).unwrap().is_empty());
    }

    #[tokio::test]
    async fn find_surfaces_malformed_record() {
        let store = MemoryStore::default();
        store.insert_raw("testimony_bad", b"nope".to_vec());
        let id = TestimonyId::new("bad").unwrap();
        assert!(matches!(
            repo(&store).find(&id).await,
            Err(RepositoryError::Record(_))
        ));
        let missing = TestimonyId::new("missing").unwrap();
        assert_eq!(repo(&store).find(&missing).await.unwrap(), None);
    }
}
