//! # Testimony Records
//!
//! `Testimony` is the in-memory model. `TestimonyRecord` is the JSON shape
//! stored under `testimony_<id>`:
//!
//! ```json
//! {"witness": "...", "content": "...", "timestamp": 1700000000,
//!  "caseId": "case-1", "credibility": "FHE-NTA="}
//! ```
//!
//! The id is not part of the record; it is carried by the key. Records are
//! written once and never mutated.

use serde::{Deserialize, Serialize};
use witness_core::{Case, CaseId, RecordError, TestimonyId, Timestamp};
use witness_crypto::{ConfidentialCodec, ConfidentialValue};

use crate::error::RepositoryError;

/// Highest credibility score a witness can submit.
pub const MAX_CREDIBILITY: f64 = 100.0;

/// A witness testimony.
#[derive(Debug, Clone, PartialEq)]
pub struct Testimony {
    /// Unique testimony identifier.
    pub id: TestimonyId,
    /// Display name of the witness.
    pub witness: String,
    /// Raw testimony text. Stored unencrypted.
    pub encrypted_content: String,
    /// Creation time; newest testimonies sort first.
    pub timestamp: Timestamp,
    /// Case the testimony is filed against.
    pub case_id: CaseId,
    /// Confidential credibility score.
    pub credibility: ConfidentialValue,
}

/// Stored JSON form of a testimony.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestimonyRecord {
    pub witness: String,
    pub content: String,
    pub timestamp: Timestamp,
    pub case_id: CaseId,
    pub credibility: ConfidentialValue,
}

/// A submission before it has an id, a timestamp, or an encoded score.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTestimony {
    pub witness: String,
    pub content: String,
    /// Plaintext credibility, 0–100.
    pub credibility: f64,
}

impl Default for NewTestimony {
    fn default() -> Self {
        Self {
            witness: String::new(),
            content: String::new(),
            credibility: 50.0,
        }
    }
}

impl Testimony {
    /// Stamp, encode, and validate a new submission.
    ///
    /// # Errors
    ///
    /// `RepositoryError::Invalid` for a blank witness name, a case outside
    /// the catalog, or a credibility outside 0–100. `RepositoryError::Codec`
    /// if the codec refuses the score.
    pub fn create(
        codec: &impl ConfidentialCodec,
        case_id: &CaseId,
        submission: NewTestimony,
    ) -> Result<Self, RepositoryError> {
        let witness = submission.witness.trim();
        if witness.is_empty() {
            return Err(RepositoryError::Invalid(
                "witness name must not be empty".to_string(),
            ));
        }
        if Case::lookup(case_id).is_none() {
            return Err(RepositoryError::Invalid(format!("unknown case {case_id}")));
        }
        let score = submission.credibility;
        if !(0.0..=MAX_CREDIBILITY).contains(&score) {
            return Err(RepositoryError::Invalid(format!(
                "credibility must be between 0 and {MAX_CREDIBILITY}, got {score}"
            )));
        }
        Ok(Self {
            id: TestimonyId::generate(),
            witness: witness.to_string(),
            encrypted_content: submission.content,
            timestamp: Timestamp::now(),
            case_id: case_id.clone(),
            credibility: codec.encode(score)?,
        })
    }

    /// Rebuild a testimony from its key and stored record.
    pub fn from_record(id: TestimonyId, record: TestimonyRecord) -> Self {
        Self {
            id,
            witness: record.witness,
            encrypted_content: record.content,
            timestamp: record.timestamp,
            case_id: record.case_id,
            credibility: record.credibility,
        }
    }

    /// The stored form of this testimony.
    pub fn to_record(&self) -> TestimonyRecord {
        TestimonyRecord {
            witness: self.witness.clone(),
            content: self.encrypted_content.clone(),
            timestamp: self.timestamp,
            case_id: self.case_id.clone(),
            credibility: self.credibility.clone(),
        }
    }
}

impl TestimonyRecord {
    /// Parse a stored payload.
    pub fn parse(key: &str, bytes: &[u8]) -> Result<Self, RecordError> {
        let text = std::str::from_utf8(bytes).map_err(|_| RecordError::NotUtf8 {
            key: key.to_string(),
        })?;
        serde_json::from_str(text).map_err(|source| RecordError::Malformed {
            key: key.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use witness_crypto::MarkerCodec;

    fn submission(witness: &str, credibility: f64) -> NewTestimony {
        NewTestimony {
            witness: witness.to_string(),
            content: "I saw a figure on the stairs".to_string(),
            credibility,
        }
    }

    #[test]
    fn create_encodes_and_stamps() {
        let case = CaseId::new("case-1");
        let t = Testimony::create(&MarkerCodec, &case, submission("  Mrs. Peacock ", 50.0)).unwrap();
        assert_eq!(t.witness, "Mrs. Peacock");
        assert_eq!(t.case_id, case);
        assert_eq!(t.credibility.as_str(), "FHE-NTA=");
        assert!(t.id.as_str().starts_with("testimony-"));
    }

    #[test]
    fn create_rejects_bad_input() {
        let case = CaseId::new("case-1");
        assert!(matches!(
            Testimony::create(&MarkerCodec, &case, submission("   ", 50.0)),
            Err(RepositoryError::Invalid(_))
        ));
        assert!(matches!(
            Testimony::create(&MarkerCodec, &CaseId::new("case-42"), submission("A", 50.0)),
            Err(RepositoryError::Invalid(_))
        ));
        assert!(Testimony::create(&MarkerCodec, &case, submission("A", 100.5)).is_err());
        assert!(Testimony::create(&MarkerCodec, &case, submission("A", -1.0)).is_err());
        assert!(Testimony::create(&MarkerCodec, &case, submission("A", f64::NAN)).is_err());
    }

    #[test]
    fn default_submission_is_midscale() {
        assert_eq!(NewTestimony::default().credibility, 50.0);
    }

    #[test]
    fn record_json_shape() {
        let record = TestimonyRecord {
            witness: "Colonel Mustard".into(),
            content: "Library, 11pm".into(),
            timestamp: Timestamp::from_epoch_secs(1_700_000_000).unwrap(),
            case_id: CaseId::new("case-2"),
            credibility: ConfidentialValue::from_token("FHE-NTA="),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "witness": "Colonel Mustard",
                "content": "Library, 11pm",
                "timestamp": 1_700_000_000,
                "caseId": "case-2",
                "credibility": "FHE-NTA=",
            })
        );
    }

    #[test]
    fn parse_accepts_legacy_numeric_credibility() {
        let raw = br#"{"witness":"W","content":"C","timestamp":1,"caseId":"case-1","credibility":65}"#;
        let record = TestimonyRecord::parse("testimony_x", raw).unwrap();
        assert_eq!(record.credibility.as_str(), "65");
    }

    #[test]
    fn parse_reports_key_on_failure() {
        let err = TestimonyRecord::parse("testimony_bad", b"{not json").unwrap_err();
        assert!(err.to_string().contains("testimony_bad"));

        let err = TestimonyRecord::parse("testimony_bin", &[0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, RecordError::NotUtf8 { .. }));

        // Missing caseId.
        let raw = br#"{"witness":"W","content":"C","timestamp":1,"credibility":"FHE-NTA="}"#;
        assert!(TestimonyRecord::parse("testimony_partial", raw).is_err());
    }

    #[test]
    fn record_roundtrip_through_testimony() {
        let case = CaseId::new("case-3");
        let t = Testimony::create(&MarkerCodec, &case, submission("Butler", 12.0)).unwrap();
        let back = Testimony::from_record(t.id.clone(), t.to_record());
        assert_eq!(back, t);
    }
}
