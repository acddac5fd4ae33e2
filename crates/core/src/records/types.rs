//! Collaborator record types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use warden_shared::types::{
    Amount, CleaningAssignmentId, CleaningWeekId, DormId, EvaluationScoreId, EventId, ExpenseId,
    OccupantId, TermId,
};

/// Expense approval state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseStatus {
    /// Awaiting approval.
    Pending,
    /// Approved; counts against cash on hand.
    Approved,
    /// Rejected.
    Rejected,
}

impl ExpenseStatus {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parses from string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// A dorm expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    /// Expense ID.
    pub id: ExpenseId,
    /// Owning dorm.
    pub dorm_id: DormId,
    /// Term the expense was filed in.
    pub term_id: Option<TermId>,
    /// What the money was spent on.
    pub description: String,
    /// Amount spent.
    pub amount: Amount,
    /// Approval state.
    pub status: ExpenseStatus,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// A dorm event that may collect contributions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Event ID.
    pub id: EventId,
    /// Owning dorm.
    pub dorm_id: DormId,
    /// Term the event belongs to.
    pub term_id: Option<TermId>,
    /// Title.
    pub title: String,
    /// Description.
    pub description: Option<String>,
    /// Start time.
    pub starts_at: DateTime<Utc>,
    /// Venue.
    pub location: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// One week of the cleaning roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleaningWeek {
    /// Week ID.
    pub id: CleaningWeekId,
    /// Owning dorm.
    pub dorm_id: DormId,
    /// Monday of the week.
    pub week_start: NaiveDate,
    /// Floor level resting this week, if any.
    pub rest_level: Option<i32>,
}

/// An occupant's cleaning area for a week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleaningAssignment {
    /// Assignment ID.
    pub id: CleaningAssignmentId,
    /// Owning dorm.
    pub dorm_id: DormId,
    /// Week the assignment belongs to.
    pub week_id: CleaningWeekId,
    /// Area to clean.
    pub area: String,
    /// Assigned occupant.
    pub occupant_id: OccupantId,
}

/// A single evaluation score given to an occupant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationScore {
    /// Score ID.
    pub id: EvaluationScoreId,
    /// Owning dorm.
    pub dorm_id: DormId,
    /// Evaluated occupant.
    pub occupant_id: OccupantId,
    /// Term of the evaluation.
    pub term_id: Option<TermId>,
    /// Criterion evaluated.
    pub criterion: String,
    /// Score given.
    pub score: Decimal,
    /// Highest possible score.
    pub max_score: Decimal,
    /// Evaluator comment.
    pub comment: Option<String>,
    /// When the score was recorded.
    pub recorded_at: DateTime<Utc>,
}
