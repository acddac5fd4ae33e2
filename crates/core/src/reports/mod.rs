//! Tabular report generation.
//!
//! Reports are keyed by name and produce named sheets with fixed column
//! sets, always followed by a `Metadata` sheet:
//! - `fines-ledger` - Fines issued and the fines ledger
//! - `occupant-statement` - One occupant's balances, entries, and fines
//! - `maintenance-ledger` - Maintenance balances per occupant
//! - `event-contributions` - Contribution totals per event
//! - `evaluation-rankings` - Occupants ranked by evaluation score
//!
//! Builders are pure. The engine gathers the records through the ledger read
//! path and checks access per key before calling [`ReportService::build`].

pub mod error;
pub mod service;
pub mod types;


pub use error::ReportError;
pub use service::ReportService;
pub use types::{
    METADATA_SHEET, ReportContext, ReportData, ReportFilter, ReportKey, Sheet, Workbook,
};
