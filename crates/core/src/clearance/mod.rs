//! Balance and clearance aggregation.
//!
//! Pure read-side computation over occupants, entries, and expenses,
//! recomputed from scratch on every call. Nothing is cached.
//!
//! # Rules
//!
//! - Voided entries never count.
//! - Balances are scoped to the active term; cash on hand is all-time.
//! - Each category's balance stands on its own. Only the grand total nets
//!   across categories, and the grand total alone decides `is_cleared`.
//!
//! # Modules
//!
//! - `types` - Totals, clearance rows, dashboard and occupant report payloads
//! - `aggregator` - The computations

pub mod aggregator;
pub mod types;

#[cfg(test)]
mod aggregator_props;

pub use aggregator::ClearanceAggregator;
pub use types::{
    CategoryBreakdown, CategoryTotals, ClearanceOrder, ClearanceRow, DashboardStats,
    OccupantReport,
};
