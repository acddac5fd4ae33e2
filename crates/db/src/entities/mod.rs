//! `SeaORM` entity definitions.
//!
//! One module per table, plus the Postgres enum types shared between them.

pub mod audit_events;
pub mod cleaning_assignments;
pub mod cleaning_weeks;
pub mod dorms;
pub mod evaluation_scores;
pub mod events;
pub mod expenses;
pub mod fine_rules;
pub mod fines;
pub mod ledger_entries;
pub mod occupants;
pub mod sea_orm_active_enums;
pub mod terms;
