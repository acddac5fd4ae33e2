//! Clearance computations.

use std::collections::HashMap;

use rust_decimal::Decimal;
use warden_shared::types::OccupantId;

use crate::fines::Fine;
use crate::ledger::{EntryType, LedgerEntry};
use crate::occupants::Occupant;
use crate::records::{Expense, ExpenseStatus};
use crate::term::ActiveTerm;

use super::types::{CategoryBreakdown, ClearanceOrder, ClearanceRow, DashboardStats};

/// Stateless aggregation over snapshots of store data.
pub struct ClearanceAggregator;

impl ClearanceAggregator {
    /// Totals for one occupant in the term.
    #[must_use]
    pub fn occupant_breakdown(
        entries: &[LedgerEntry],
        occupant_id: OccupantId,
        term: &ActiveTerm,
    ) -> CategoryBreakdown {
        let mut breakdown = CategoryBreakdown::default();
        for entry in entries
            .iter()
            .filter(|e| e.occupant_id == occupant_id && counts_in(e, term))
        {
            breakdown.add(entry);
        }
        breakdown
    }

    /// Dorm totals for the term, including entries of occupants who are no longer active.
    #[must_use]
    pub fn dorm_totals(entries: &[LedgerEntry], term: &ActiveTerm) -> CategoryBreakdown {
        let mut breakdown = CategoryBreakdown::default();
        for entry in entries.iter().filter(|e| counts_in(e, term)) {
            breakdown.add(entry);
        }
        breakdown
    }

    /// All-time payments minus all-time approved expenses.
    #[must_use]
    pub fn cash_on_hand(entries: &[LedgerEntry], expenses: &[Expense]) -> Decimal {
        let payments: Decimal = entries
            .iter()
            .filter(|e| e.is_active() && e.entry_type() == EntryType::Payment)
            .map(|e| e.amount().value())
            .sum();
        let spent: Decimal = expenses
            .iter()
            .filter(|e| e.status == ExpenseStatus::Approved)
            .map(|e| e.amount.value())
            .sum();
        payments - spent
    }

    /// One row per active occupant.
    #[must_use]
    pub fn clearance_list(
        occupants: &[Occupant],
        entries: &[LedgerEntry],
        term: &ActiveTerm,
        order: ClearanceOrder,
    ) -> Vec<ClearanceRow> {
        let mut per_occupant: HashMap<OccupantId, CategoryBreakdown> = HashMap::new();
        for entry in entries.iter().filter(|e| counts_in(e, term)) {
            per_occupant.entry(entry.occupant_id).or_default().add(entry);
        }

        let mut rows: Vec<ClearanceRow> = occupants
            .iter()
            .filter(|o| o.is_active())
            .map(|occupant| {
                let breakdown = per_occupant.get(&occupant.id).copied().unwrap_or_default();
                let balance = breakdown.total().balance;
                ClearanceRow {
                    occupant_id: occupant.id,
                    display_name: occupant.display_name.clone(),
                    student_id: occupant.student_id.clone(),
                    breakdown,
                    balance,
                    is_cleared: balance <= Decimal::ZERO,
                }
            })
            .collect();

        if order == ClearanceOrder::WorstFirst {
            rows.sort_by(|a, b| {
                b.balance
                    .cmp(&a.balance)
                    .then_with(|| a.display_name.cmp(&b.display_name))
                    .then_with(|| a.occupant_id.cmp(&b.occupant_id))
            });
        }
        rows
    }

    /// Full dashboard snapshot for the term.
    ///
    /// `entries` may span every term; only the active term's feed balances,
    /// while all of them feed cash on hand.
    #[must_use]
    pub fn dashboard(
        term: &ActiveTerm,
        occupants: &[Occupant],
        entries: &[LedgerEntry],
        expenses: &[Expense],
        fines: &[Fine],
    ) -> DashboardStats {
        let totals = Self::dorm_totals(entries, term);
        let grand = totals.total();
        let clearance = Self::clearance_list(occupants, entries, term, ClearanceOrder::WorstFirst);
        let term_fines: Vec<&Fine> = fines.iter().filter(|f| term.includes_fine(f)).collect();

        DashboardStats {
            term: term.clone(),
            totals,
            total_charged: grand.charged,
            total_paid: grand.paid,
            collectibles: grand.charged - grand.paid,
            cash_on_hand: Self::cash_on_hand(entries, expenses),
            total_fines_active: term_fines.iter().filter(|f| f.is_active()).count() as u64,
            fines_needing_reconciliation: fines.iter().filter(|f| f.needs_reconciliation).count()
                as u64,
            active_occupants: clearance.len(),
            cleared_occupants: clearance.iter().filter(|r| r.is_cleared).count(),
            clearance,
        }
    }
}

fn counts_in(entry: &LedgerEntry, term: &ActiveTerm) -> bool {
    entry.is_active() && term.includes(entry)
}
