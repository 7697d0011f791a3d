//! # Contradiction Analysis
//!
//! Finds every unordered pair of same-case testimonies whose confidential
//! credibility scores the codec judges contradictory (`|a - b| < tolerance`).
//!
//! ## Algorithm
//!
//! 1. Bucket testimonies by case. Cross-case pairs are never compared.
//! 2. Decode each score once. Undecodable scores drop that testimony from
//!    the analysis with a `warn!`.
//! 3. Sort each bucket by score and sweep: for each testimony, walk forward
//!    while the gap stays under the tolerance.
//!
//! This is O(n log n + k) for k reported pairs, and reports exactly the set
//! the all-pairs predicate would. The output order is unspecified; treat
//! it as a set.

use std::collections::BTreeMap;

use serde::Serialize;
use witness_core::{CaseId, TestimonyId};
use witness_crypto::{ConfidentialCodec, MarkerCodec, DEFAULT_TOLERANCE};

use crate::record::Testimony;

/// Two same-case testimonies with contradictory credibility.
///
/// Unordered: the constructor puts the smaller id first, so `(a, b)` and
/// `(b, a)` compare and hash equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ContradictionPair {
    case_id: CaseId,
    first: TestimonyId,
    second: TestimonyId,
}

impl ContradictionPair {
    /// Build a normalized pair.
    pub fn new(case_id: CaseId, a: TestimonyId, b: TestimonyId) -> Self {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        Self {
            case_id,
            first,
            second,
        }
    }

    /// Case both testimonies belong to.
    pub fn case_id(&self) -> &CaseId {
        &self.case_id
    }

    /// Lexicographically smaller id.
    pub fn first(&self) -> &TestimonyId {
        &self.first
    }

    /// Lexicographically larger id.
    pub fn second(&self) -> &TestimonyId {
        &self.second
    }

    /// Whether `id` is one side of the pair.
    pub fn involves(&self, id: &TestimonyId) -> bool {
        &self.first == id || &self.second == id
    }
}

/// Per-case statistics over one load.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseSummary {
    pub case_id: CaseId,
    pub testimony_count: usize,
    /// Mean decoded credibility; 0 when no score decodes.
    pub average_credibility: f64,
    pub contradiction_count: usize,
}

/// Detects contradictory testimony pairs.
#[derive(Debug, Clone)]
pub struct ContradictionAnalyzer<C = MarkerCodec> {
    codec: C,
    tolerance: f64,
}

impl Default for ContradictionAnalyzer<MarkerCodec> {
    fn default() -> Self {
        Self::new(MarkerCodec, DEFAULT_TOLERANCE)
    }
}

impl<C: ConfidentialCodec> ContradictionAnalyzer<C> {
    /// Create an analyzer with the given codec and tolerance.
    pub fn new(codec: C, tolerance: f64) -> Self {
        Self { codec, tolerance }
    }

    /// Tolerance in percentage points.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// All contradictory same-case pairs in `testimonies`.
    pub fn find_contradictions(&self, testimonies: &[Testimony]) -> Vec<ContradictionPair> {
        let mut buckets: BTreeMap<&CaseId, Vec<(f64, &TestimonyId)>> = BTreeMap::new();
        for t in testimonies {
            match self.codec.decode(&t.credibility) {
                Ok(score) => buckets.entry(&t.case_id).or_default().push((score, &t.id)),
                Err(e) => {
                    tracing::warn!(id = %t.id, error = %e, "excluding undecodable credibility from analysis");
                }
            }
        }

        let mut pairs = Vec::new();
        for (case_id, mut scored) in buckets {
            scored.sort_by(|a, b| a.0.total_cmp(&b.0));
            for (i, (low, low_id)) in scored.iter().enumerate() {
                for (high, high_id) in &scored[i + 1..] {
                    if !(high - low < self.tolerance) {
                        break;
                    }
                    if low_id != high_id {
                        pairs.push(ContradictionPair::new(
                            case_id.clone(),
                            (*low_id).clone(),
                            (*high_id).clone(),
                        ));
                    }
                }
            }
        }
        tracing::debug!(
            testimonies = testimonies.len(),
            contradictions = pairs.len(),
            tolerance = self.tolerance,
            "contradiction scan complete"
        );
        pairs
    }

    /// Count, mean credibility, and contradictions for one case.
    pub fn summarize(
        &self,
        case_id: &CaseId,
        testimonies: &[Testimony],
        pairs: &[ContradictionPair],
    ) -> CaseSummary {
        let in_case: Vec<&Testimony> = testimonies
            .iter()
            .filter(|t| &t.case_id == case_id)
            .collect();
        let scores: Vec<f64> = in_case
            .iter()
            .filter_map(|t| self.codec.decode(&t.credibility).ok())
            .collect();
        let average_credibility = if scores.is_empty() {
            0.0
        } else {
            scores.iter().sum::<f64>() / scores.len() as f64
        };
        CaseSummary {
            case_id: case_id.clone(),
            testimony_count: in_case.len(),
            average_credibility,
            contradiction_count: pairs.iter().filter(|p| p.case_id() == case_id).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use witness_core::Timestamp;

    fn testimony(id: &str, case: &str, score: f64) -> Testimony {
        Testimony {
            id: TestimonyId::new(id).unwrap(),
            witness: format!("witness {id}"),
            encrypted_content: String::new(),
            timestamp: Timestamp::from_epoch_secs(0).unwrap(),
            case_id: CaseId::new(case),
            credibility: MarkerCodec.encode(score).unwrap(),
        }
    }

    fn as_set(pairs: Vec<ContradictionPair>) -> HashSet<ContradictionPair> {
        pairs.into_iter().collect()
    }

    /// The all-pairs definition, for comparison.
    fn naive(testimonies: &[Testimony], tolerance: f64) -> HashSet<ContradictionPair> {
        let mut out = HashSet::new();
        for (i, a) in testimonies.iter().enumerate() {
            for b in &testimonies[i + 1..] {
                if a.case_id == b.case_id
                    && a.id != b.id
                    && MarkerCodec
                        .is_contradictory(&a.credibility, &b.credibility, tolerance)
                        .unwrap()
                {
                    out.insert(ContradictionPair::new(
                        a.case_id.clone(),
                        a.id.clone(),
                        b.id.clone(),
                    ));
                }
            }
        }
        out
    }

    #[test]
    fn same_case_close_scores_pair_up() {
        let a = testimony("A", "case-1", 50.0);
        let b = testimony("B", "case-1", 55.0);
        let c = testimony("C", "case-2", 90.0);
        let pairs = ContradictionAnalyzer::default().find_contradictions(&[a, b, c]);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].first().as_str(), "A");
        assert_eq!(pairs[0].second().as_str(), "B");
        assert_eq!(pairs[0].case_id().as_str(), "case-1");
    }

    #[test]
    fn cross_case_never_pairs_even_when_equal() {
        let a = testimony("A", "case-1", 70.0);
        let b = testimony("B", "case-2", 70.0);
        assert!(ContradictionAnalyzer::default()
            .find_contradictions(&[a, b])
            .is_empty());
    }

    #[test]
    fn order_independent() {
        let list = vec![
            testimony("A", "case-1", 50.0),
            testimony("B", "case-1", 55.0),
            testimony("C", "case-1", 62.0),
            testimony("D", "case-2", 10.0),
            testimony("E", "case-2", 19.5),
        ];
        let analyzer = ContradictionAnalyzer::default();
        let forward = as_set(analyzer.find_contradictions(&list));
        let mut reversed = list.clone();
        reversed.reverse();
        assert_eq!(forward, as_set(analyzer.find_contradictions(&reversed)));
        assert_eq!(forward, naive(&list, DEFAULT_TOLERANCE));
        assert_eq!(forward.len(), 3);
    }

    #[test]
    fn boundary_gap_is_not_contradictory() {
        let a = testimony("A", "case-1", 60.0);
        let b = testimony("B", "case-1", 70.0);
        assert!(ContradictionAnalyzer::default()
            .find_contradictions(&[a, b])
            .is_empty());
    }

    #[test]
    fn undecodable_scores_are_excluded() {
        let a = testimony("A", "case-1", 50.0);
        let mut b = testimony("B", "case-1", 51.0);
        b.credibility = witness_crypto::ConfidentialValue::from_token("FHE-%%%");
        let c = testimony("C", "case-1", 52.0);
        let pairs = ContradictionAnalyzer::default().find_contradictions(&[a, b, c]);
        assert_eq!(pairs.len(), 1);
        assert!(!pairs[0].involves(&TestimonyId::new("B").unwrap()));
    }

    #[test]
    fn non_positive_tolerance_finds_nothing() {
        let list = vec![testimony("A", "case-1", 50.0), testimony("B", "case-1", 50.0)];
        assert!(ContradictionAnalyzer::new(MarkerCodec, 0.0)
            .find_contradictions(&list)
            .is_empty());
        assert_eq!(
            ContradictionAnalyzer::default().find_contradictions(&list).len(),
            1
        );
    }

    #[test]
    fn pair_is_unordered() {
        let case = CaseId::new("case-1");
        let a = TestimonyId::new("a").unwrap();
        let b = TestimonyId::new("b").unwrap();
        assert_eq!(
            ContradictionPair::new(case.clone(), a.clone(), b.clone()),
            ContradictionPair::new(case, b, a)
        );
    }

    #[test]
    fn summarize_case() {
        let list = vec![
            testimony("A", "case-1", 40.0),
            testimony("B", "case-1", 45.0),
            testimony("C", "case-1", 80.0),
            testimony("D", "case-2", 10.0),
        ];
        let analyzer = ContradictionAnalyzer::default();
        let pairs = analyzer.find_contradictions(&list);
        let summary = analyzer.summarize(&CaseId::new("case-1"), &list, &pairs);
        assert_eq!(summary.testimony_count, 3);
        assert_eq!(summary.average_credibility, 55.0);
        assert_eq!(summary.contradiction_count, 1);

        let empty = analyzer.summarize(&CaseId::new("case-3"), &list, &pairs);
        assert_eq!(empty.testimony_count, 0);
        assert_eq!(empty.average_credibility, 0.0);
    }
}
