//! Immutable view of one load.
//!
//! A snapshot pairs the testimonies from a single [`load_all`] with the
//! contradictions computed over exactly that list. Consumers hold the
//! snapshot behind an `Arc` and swap it whole on refresh, so a reader never
//! sees a contradiction set computed against a different testimony list.
//!
//! [`load_all`]: crate::TestimonyRepository::load_all

use std::sync::Arc;

use witness_core::{CaseId, TestimonyId, Timestamp};

use crate::contradiction::ContradictionPair;
use crate::record::Testimony;

#[derive(Debug, Clone)]
pub struct LoadSnapshot {
    testimonies: Arc<[Testimony]>,
    contradictions: Arc<[ContradictionPair]>,
    loaded_at: Timestamp,
}

impl LoadSnapshot {
    pub fn new(testimonies: Vec<Testimony>, contradictions: Vec<ContradictionPair>) -> Self {
        Self {
            testimonies: testimonies.into(),
            contradictions: contradictions.into(),
            loaded_at: Timestamp::now(),
        }
    }

    /// Testimonies, newest first.
    pub fn testimonies(&self) -> &[Testimony] {
        &self.testimonies
    }

    pub fn contradictions(&self) -> &[ContradictionPair] {
        &self.contradictions
    }

    pub fn loaded_at(&self) -> Timestamp {
        self.loaded_at
    }

    /// Testimonies filed against `case_id`, newest first.
    pub fn for_case<'a>(&'a self, case_id: &'a CaseId) -> impl Iterator<Item = &'a Testimony> {
        self.testimonies.iter().filter(move |t| &t.case_id == case_id)
    }

    pub fn find(&self, id: &TestimonyId) -> Option<&Testimony> {
        self.testimonies.iter().find(|t| &t.id == id)
    }

    pub fn contradictions_for_case<'a>(
        &'a self,
        case_id: &'a CaseId,
    ) -> impl Iterator<Item = &'a ContradictionPair> {
        self.contradictions
            .iter()
            .filter(move |p| p.case_id() == case_id)
    }

    /// Whether `id` appears in any contradictory pair.
    pub fn is_contradicted(&self, id: &TestimonyId) -> bool {
        self.contradictions.iter().any(|p| p.involves(id))
    }
}
