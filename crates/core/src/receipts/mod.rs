//! Payment receipt drafts.
//!
//! Receipts are a read-only side channel: drafting one never touches the
//! ledger. Sending is left to whatever mail transport the caller uses.

pub mod composer;

pub use composer::{ReceiptComposer, ReceiptDraft};
