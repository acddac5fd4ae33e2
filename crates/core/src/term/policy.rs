//! Calendar rules for academic terms.
//!
//! The academic year runs August to July:
//! - August 1 to December 31: first semester
//! - January 1 to May 31: second semester
//! - June 1 to July 31: midyear term

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// Label and date range of the term containing a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermWindow {
    /// Display label.
    pub label: String,
    /// First day.
    pub starts_on: NaiveDate,
    /// Last day.
    pub ends_on: NaiveDate,
}

/// Deterministic term calendar.
pub struct TermPolicy;

impl TermPolicy {
    /// Returns the term window containing `date`.
    #[must_use]
    pub fn window_for(date: NaiveDate) -> TermWindow {
        let year = date.year();
        match date.month() {
            8..=12 => TermWindow {
                label: format!("1st Semester AY {}-{}", year, year + 1),
                starts_on: ymd(year, 8, 1),
                ends_on: ymd(year, 12, 31),
            },
            1..=5 => TermWindow {
                label: format!("2nd Semester AY {}-{}", year - 1, year),
                starts_on: ymd(year, 1, 1),
                ends_on: ymd(year, 5, 31),
            },
            _ => TermWindow {
                label: format!("Midyear AY {}-{}", year - 1, year),
                starts_on: ymd(year, 6, 1),
                ends_on: ymd(year, 7, 31),
            },
        }
    }
}

// Only called with fixed month/day pairs that exist in every year.
fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}
