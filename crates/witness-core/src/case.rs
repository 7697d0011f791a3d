//! # Case Catalog — Static Reference Data
//!
//! The fixed set of cases testimonies can be filed against. Cases are never
//! created or mutated at runtime; they only scope queries and validate
//! submissions.

use serde::Serialize;

use crate::identity::CaseId;

/// A case testimonies are filed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Case {
    /// Catalog identifier (e.g. `case-1`).
    pub id: &'static str,
    /// Short title.
    pub title: &'static str,
    /// One-line description.
    pub description: &'static str,
}

/// Every case known to the stack, in display order.
pub static CASE_CATALOG: [Case; 3] = [
    Case {
        id: "case-1",
        title: "The Midnight Murder",
        description: "Banker found dead in his penthouse",
    },
    Case {
        id: "case-2",
        title: "The Vanished Diamonds",
        description: "Museum heist with no forced entry",
    },
    Case {
        id: "case-3",
        title: "The Poisoned Chalice",
        description: "Political assassination at gala event",
    },
];

impl Case {
    /// Find a case by identifier.
    pub fn lookup(id: &CaseId) -> Option<&'static Case> {
        CASE_CATALOG.iter().find(|c| c.id == id.as_str())
    }

    /// The case identifier as a `CaseId`.
    pub fn case_id(&self) -> CaseId {
        CaseId::new(self.id)
    }
}

impl std::fmt::Display for Case {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.title, self.id)
    }
}
