//! Term types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use warden_shared::types::{DormId, TermId};

use crate::fines::Fine;
use crate::ledger::LedgerEntry;

/// Lifecycle of a term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TermStatus {
    /// Created ahead of time, not yet in effect.
    Planned,
    /// The term all current postings belong to.
    Active,
    /// Closed.
    Archived,
}

impl TermStatus {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::Active => "active",
            Self::Archived => "archived",
        }
    }

    /// Parses from string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "planned" => Some(Self::Planned),
            "active" => Some(Self::Active),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }
}

/// A stored academic term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    /// Term ID.
    pub id: TermId,
    /// Owning dorm.
    pub dorm_id: DormId,
    /// Display label, e.g. "1st Semester AY 2026-2027".
    pub label: String,
    /// First day of the term.
    pub starts_on: NaiveDate,
    /// Last day of the term.
    pub ends_on: NaiveDate,
    /// Lifecycle status.
    pub status: TermStatus,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// The resolved active term, passed explicitly to every term-scoped computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveTerm {
    /// Term ID.
    pub id: TermId,
    /// Owning dorm.
    pub dorm_id: DormId,
    /// Display label.
    pub label: String,
    /// First day of the term.
    pub starts_on: NaiveDate,
    /// Last day of the term.
    pub ends_on: NaiveDate,
}

impl ActiveTerm {
    /// Returns true if `date` falls inside the term.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.starts_on <= date && date <= self.ends_on
    }

    /// Returns true if the entry belongs to this term.
    ///
    /// Term-stamped entries match by ID. Legacy entries without a term match
    /// when they were posted inside the term's date range.
    #[must_use]
    pub fn includes(&self, entry: &LedgerEntry) -> bool {
        match entry.term_id {
            Some(term_id) => term_id == self.id,
            None => self.contains(entry.posted_at.date_naive()),
        }
    }

    /// Returns whether a fine belongs to this term, by stamp or by issue date.
    #[must_use]
    pub fn includes_fine(&self, fine: &Fine) -> bool {
        match fine.term_id {
            Some(term_id) => term_id == self.id,
            None => self.contains(fine.issued_at.date_naive()),
        }
    }
}

impl From<Term> for ActiveTerm {
    fn from(term: Term) -> Self {
        Self {
            id: term.id,
            dorm_id: term.dorm_id,
            label: term.label,
            starts_on: term.starts_on,
            ends_on: term.ends_on,
        }
    }
}
