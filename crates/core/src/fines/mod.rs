//! Fine lifecycle.
//!
//! A fine moves `Active -> Voided`, and back to `Active` only through the
//! admin override. Every active fine is paired with exactly one active
//! `sa_fines` charge carrying its `fine_id` and its peso amount. The engine
//! writes the fine first and the charge second; when the second write fails
//! the fine is flagged `needs_reconciliation` and [`FineSyncPlan`] later
//! computes the ledger changes that restore the pairing.
//!
//! # Modules
//!
//! - `types` - Fines, fine rules, and operation inputs and outcomes
//! - `sync` - Pure planning of ledger changes for a fine

pub mod sync;
pub mod types;

#[cfg(test)]
mod sync_props;

pub use sync::{FineSyncPlan, SyncStep};
pub use types::{
    CreateFineRuleInput, Fine, FineFilter, FineRule, FineStatus, IssueFineInput,
    IssueFineOutcome, ReconcileReport, Severity, UpdateFineRuleInput, VoidFineOutcome,
    fine_charge_note,
};
