//! Report data types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use warden_shared::types::{DormId, OccupantId};

use crate::access::Role;
use crate::fines::{Fine, FineRule};
use crate::ledger::LedgerEntry;
use crate::occupants::Occupant;
use crate::records::{EvaluationScore, Event};

use super::error::ReportError;

/// Name of the sheet every workbook ends with.
pub const METADATA_SHEET: &str = "Metadata";

/// The reports the engine can generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportKey {
    /// Fines issued in the range and the fines ledger.
    FinesLedger,
    /// One occupant's balances and entries.
    OccupantStatement,
    /// Maintenance fee balances per occupant.
    MaintenanceLedger,
    /// Contribution totals per event.
    EventContributions,
    /// Occupants ranked by evaluation score.
    EvaluationRankings,
}

impl ReportKey {
    /// All report keys.
    pub const ALL: [Self; 5] = [
        Self::FinesLedger,
        Self::OccupantStatement,
        Self::MaintenanceLedger,
        Self::EventContributions,
        Self::EvaluationRankings,
    ];

    /// Returns the URL-safe report name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::FinesLedger => "fines-ledger",
            Self::OccupantStatement => "occupant-statement",
            Self::MaintenanceLedger => "maintenance-ledger",
            Self::EventContributions => "event-contributions",
            Self::EvaluationRankings => "evaluation-rankings",
        }
    }

    /// Parses a report name.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::UnknownKey` for anything else.
    pub fn parse(s: &str) -> Result<Self, ReportError> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| ReportError::UnknownKey(s.to_string()))
    }

    /// Returns whether a role may generate this report.
    ///
    /// The occupant statement is open to every role; occupants are further
    /// limited to their own statement by the engine.
    #[must_use]
    pub const fn allows(&self, role: Role) -> bool {
        use Role::{
            Admin, Adviser, AssistantAdviser, EventOfficer, Officer, StudentAssistant, Treasurer,
        };
        match self {
            Self::FinesLedger => {
                matches!(role, Admin | Adviser | AssistantAdviser | StudentAssistant)
            }
            Self::MaintenanceLedger | Self::EvaluationRankings => {
                matches!(role, Admin | Adviser | AssistantAdviser)
            }
            Self::EventContributions => {
                matches!(role, Admin | Adviser | Treasurer | Officer | EventOfficer)
            }
            Self::OccupantStatement => true,
        }
    }
}

impl std::fmt::Display for ReportKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Query filters for a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ReportFilter {
    /// First day included.
    #[serde(default)]
    pub from: Option<NaiveDate>,
    /// Last day included.
    #[serde(default)]
    pub to: Option<NaiveDate>,
    /// Limit to one occupant.
    #[serde(default)]
    pub occupant_id: Option<OccupantId>,
}

impl ReportFilter {
    /// Rejects ranges that end before they start.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::InvalidDateRange`.
    pub fn validate(&self) -> Result<(), ReportError> {
        match (self.from, self.to) {
            (Some(start), Some(end)) if start > end => {
                Err(ReportError::InvalidDateRange { start, end })
            }
            _ => Ok(()),
        }
    }

    /// Returns whether a date falls inside the range.
    #[must_use]
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.from.is_none_or(|from| date >= from) && self.to.is_none_or(|to| date <= to)
    }

    /// Returns whether a record belongs to the filtered occupant.
    #[must_use]
    pub fn includes_occupant(&self, occupant_id: OccupantId) -> bool {
        self.occupant_id.is_none_or(|id| id == occupant_id)
    }
}

/// Who and when a workbook was generated for.
#[derive(Debug, Clone)]
pub struct ReportContext {
    /// Dorm the report covers.
    pub dorm_id: DormId,
    /// Dorm display name.
    pub dorm_name: String,
    /// Generation timestamp.
    pub generated_at: DateTime<Utc>,
}

/// Records a report is built from. Builders only read the parts they need.
#[derive(Debug, Clone, Default)]
pub struct ReportData {
    /// Occupants of the dorm.
    pub occupants: Vec<Occupant>,
    /// Active ledger entries.
    pub entries: Vec<LedgerEntry>,
    /// Fines, voided included.
    pub fines: Vec<Fine>,
    /// Fine rules, inactive included.
    pub rules: Vec<FineRule>,
    /// Events.
    pub events: Vec<Event>,
    /// Evaluation scores.
    pub scores: Vec<EvaluationScore>,
}

/// A named table with a fixed column set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sheet {
    /// Sheet name.
    pub name: String,
    /// Column headers.
    pub columns: Vec<String>,
    /// Rows, one cell per column.
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    /// Creates an empty sheet.
    #[must_use]
    pub fn new(name: &str, columns: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            columns: columns.iter().map(ToString::to_string).collect(),
            rows: Vec::new(),
        }
    }

    /// Appends a row.
    pub fn push(&mut self, row: Vec<String>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    /// Renders the sheet as CSV with a header row.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Csv` if encoding fails.
    pub fn to_csv(&self) -> Result<String, ReportError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| ReportError::Csv(e.into_error().into()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// A generated report.
#[derive(Debug, Clone, Serialize)]
pub struct Workbook {
    /// Which report this is.
    pub report: ReportKey,
    /// Sheets in display order, metadata last.
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    /// Finds a sheet by name, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::SheetNotFound`.
    pub fn sheet(&self, name: &str) -> Result<&Sheet, ReportError> {
        self.sheets
            .iter()
            .find(|sheet| sheet.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| ReportError::SheetNotFound(name.to_string()))
    }
}
