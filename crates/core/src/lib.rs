//! Ledger and clearance engine for Warden.
//!
//! This crate contains the dormitory bookkeeping rules with ZERO web or
//! database dependencies. Persistence is reached through the async ports in
//! [`store`]; an in-memory implementation ships for tests and tooling.
//!
//! # Modules
//!
//! - `access` - Roles, capabilities, and the access table
//! - `term` - Active term resolution and auto-creation windows
//! - `ledger` - Entries, category aliases, validation, and queries
//! - `fines` - Fines, fine rules, and fine/charge pairing plans
//! - `clearance` - Per-occupant balances, dashboard totals, clearance lists
//! - `overrides` - Admin override inputs and change tracking
//! - `audit` - Audit events and the failure-tolerant recorder
//! - `receipts` - Payment receipt drafts
//! - `reports` - Tabular report workbooks
//! - `engine` - The operations that tie everything together

pub mod access;
pub mod audit;
pub mod clearance;
pub mod engine;
pub mod error;
pub mod fines;
pub mod ledger;
pub mod occupants;
pub mod overrides;
pub mod receipts;
pub mod records;
pub mod reports;
pub mod store;
pub mod term;

pub use access::{AccessPolicy, ActorContext, Capability, Role};
pub use engine::Engine;
pub use error::{EngineError, EngineResult};
pub use store::{MemoryStore, Store, StoreError, StoreResult};
