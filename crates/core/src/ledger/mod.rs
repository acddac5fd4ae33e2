//! Ledger entries: charges and payments per occupant.
//!
//! This module implements the ledger entry store's domain side:
//! - Canonical categories and alias normalization
//! - The tagged charge/payment posting and its stored sign convention
//! - Input validation for direct postings
//! - The lazily paged read path every aggregate is built on

pub mod category;
pub mod query;
pub mod types;
pub mod validation;

#[cfg(test)]
mod posting_props;

pub use category::CategoryAliases;
pub use query::{EntryFilter, EntryQuery, sort_newest_first};
pub use types::{
    EntryType, LedgerCategory, LedgerEntry, PAYABLE_DEADLINE_KEY, Posting, RecordEntryInput,
    VoidEntryOutcome, VoidInfo,
};
pub use validation::{ValidatedEntry, validate_record};
