//! Aggregation result types.

use rust_decimal::Decimal;
use serde::Serialize;
use warden_shared::types::OccupantId;

use crate::fines::Fine;
use crate::ledger::{EntryType, LedgerCategory, LedgerEntry};
use crate::occupants::Occupant;
use crate::term::ActiveTerm;

/// Charged and paid totals for one bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryTotals {
    /// Sum of charges.
    pub charged: Decimal,
    /// Sum of payments (positive).
    pub paid: Decimal,
    /// `charged - paid`.
    pub balance: Decimal,
}

impl CategoryTotals {
    /// Folds one active entry into the totals.
    pub fn add(&mut self, entry: &LedgerEntry) {
        match entry.entry_type() {
            EntryType::Charge => self.charged += entry.amount().value(),
            EntryType::Payment => self.paid += entry.amount().value(),
        }
        self.balance = self.charged - self.paid;
    }

    /// Sums two buckets.
    #[must_use]
    pub fn combined(&self, other: &Self) -> Self {
        let charged = self.charged + other.charged;
        let paid = self.paid + other.paid;
        Self {
            charged,
            paid,
            balance: charged - paid,
        }
    }
}

/// Totals per ledger category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryBreakdown {
    /// Maintenance fees.
    pub maintenance: CategoryTotals,
    /// Fines.
    pub fines: CategoryTotals,
    /// Contributions.
    pub contributions: CategoryTotals,
}

impl CategoryBreakdown {
    /// Returns one category's totals.
    #[must_use]
    pub const fn get(&self, category: LedgerCategory) -> &CategoryTotals {
        match category {
            LedgerCategory::Maintenance => &self.maintenance,
            LedgerCategory::Fines => &self.fines,
            LedgerCategory::Contributions => &self.contributions,
        }
    }

    /// Folds one active entry into its category.
    pub fn add(&mut self, entry: &LedgerEntry) {
        let bucket = match entry.category {
            LedgerCategory::Maintenance => &mut self.maintenance,
            LedgerCategory::Fines => &mut self.fines,
            LedgerCategory::Contributions => &mut self.contributions,
        };
        bucket.add(entry);
    }

    /// Grand total across categories.
    #[must_use]
    pub fn total(&self) -> CategoryTotals {
        self.maintenance
            .combined(&self.fines)
            .combined(&self.contributions)
    }
}

/// One occupant's clearance status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClearanceRow {
    /// Occupant ID.
    pub occupant_id: OccupantId,
    /// Display name.
    pub display_name: String,
    /// Student number.
    pub student_id: Option<String>,
    /// Per-category totals for the term.
    pub breakdown: CategoryBreakdown,
    /// Grand total balance for the term.
    pub balance: Decimal,
    /// True when `balance <= 0`.
    pub is_cleared: bool,
}

/// Row order of a clearance list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearanceOrder {
    /// Highest balance first, ties by name. Staff dashboards.
    WorstFirst,
    /// Occupant list order. Self-service views.
    Natural,
}

/// Dorm-wide dashboard statistics for the active term.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    /// The term the figures cover.
    pub term: ActiveTerm,
    /// Per-category totals over every entry of the term.
    pub totals: CategoryBreakdown,
    /// Sum of charges in the term.
    pub total_charged: Decimal,
    /// Sum of payments in the term.
    pub total_paid: Decimal,
    /// `total_charged - total_paid`.
    pub collectibles: Decimal,
    /// All-time payments minus all-time approved expenses.
    pub cash_on_hand: Decimal,
    /// Active fines issued in the term.
    pub total_fines_active: u64,
    /// Fines whose ledger pairing awaits reconciliation.
    pub fines_needing_reconciliation: u64,
    /// Active occupants.
    pub active_occupants: usize,
    /// Active occupants with `balance <= 0`.
    pub cleared_occupants: usize,
    /// One row per active occupant.
    pub clearance: Vec<ClearanceRow>,
}

/// Everything shown on one occupant's statement page.
#[derive(Debug, Clone, Serialize)]
pub struct OccupantReport {
    /// The occupant.
    pub occupant: Occupant,
    /// The term the figures cover.
    pub term: ActiveTerm,
    /// Per-category totals for the term.
    pub breakdown: CategoryBreakdown,
    /// Grand total balance for the term.
    pub balance: Decimal,
    /// True when `balance <= 0`.
    pub is_cleared: bool,
    /// The occupant's active entries in the term, newest first.
    pub entries: Vec<LedgerEntry>,
    /// The occupant's fines in the term, voided ones included.
    pub fines: Vec<Fine>,
}
