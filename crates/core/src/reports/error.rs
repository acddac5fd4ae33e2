//! Report error types.

use chrono::NaiveDate;
use thiserror::Error;

use crate::error::EngineError;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The report key is not one of the known reports.
    #[error("unknown report: {0}")]
    UnknownKey(String),

    /// Invalid date range.
    #[error("invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Start date.
        start: NaiveDate,
        /// End date.
        end: NaiveDate,
    },

    /// The report needs an occupant filter.
    #[error("the {0} report requires an occupant")]
    OccupantRequired(&'static str),

    /// The workbook has no sheet with this name.
    #[error("sheet not found: {0}")]
    SheetNotFound(String),

    /// CSV encoding failed.
    #[error("csv encoding failed: {0}")]
    Csv(#[from] csv::Error),
}

impl From<ReportError> for EngineError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::SheetNotFound(name) => Self::NotFound(format!("sheet {name}")),
            other => Self::InvalidInput(other.to_string()),
        }
    }
}
