//! Collaborator records the engine reads and, through overrides, rewrites.
//!
//! Expenses, events, cleaning rosters, and evaluation scores are owned by
//! other parts of the dorm system. The engine reads approved expenses for
//! cash on hand, events for contribution reports, and exposes admin
//! overrides for the rest.

pub mod types;

pub use types::{
    CleaningAssignment, CleaningWeek, EvaluationScore, Event, Expense, ExpenseStatus,
};
