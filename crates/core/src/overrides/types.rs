//! Override inputs and outcome.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;
use warden_shared::types::{
    CleaningAssignmentId, CleaningWeekId, EvaluationScoreId, EventId, FineId, FineRuleId,
    LedgerEntryId, OccupantId,
};

use crate::occupants::OccupantStatus;

use super::patch::FieldPatch;

/// Override of an occupant's profile.
#[derive(Debug, Clone, Default)]
pub struct OccupantOverride {
    /// Occupant to change.
    pub occupant_id: OccupantId,
    /// New display name.
    pub display_name: Option<String>,
    /// Student number.
    pub student_id: FieldPatch<String>,
    /// Contact email.
    pub email: FieldPatch<String>,
    /// Residency status.
    pub status: Option<OccupantStatus>,
    /// Why the override is made.
    pub reason: String,
}

/// Override of a fine.
#[derive(Debug, Clone, Default)]
pub struct FineOverride {
    /// Fine to change.
    pub fine_id: FineId,
    /// New peso amount.
    pub pesos: Option<Decimal>,
    /// New demerit points.
    pub points: Option<i32>,
    /// Issuer note.
    pub note: FieldPatch<String>,
    /// Applied rule.
    pub rule_id: FieldPatch<FineRuleId>,
    /// Reactivate the fine if it is voided.
    pub restore_if_voided: bool,
    /// Why the override is made.
    pub reason: String,
}

/// Reassignment of a ledger entry to another occupant.
#[derive(Debug, Clone, Default)]
pub struct EntryOwnerOverride {
    /// Entry to move. Fine-linked entries move together with their fine.
    pub entry_id: LedgerEntryId,
    /// New owner.
    pub occupant_id: OccupantId,
    /// Why the override is made.
    pub reason: String,
}

/// Restore of a voided ledger entry.
#[derive(Debug, Clone, Default)]
pub struct RestoreEntryInput {
    /// Entry to restore.
    pub entry_id: LedgerEntryId,
    /// Why the override is made.
    pub reason: String,
}

/// Override of an event.
#[derive(Debug, Clone, Default)]
pub struct EventOverride {
    /// Event to change.
    pub event_id: EventId,
    /// New title.
    pub title: Option<String>,
    /// Description.
    pub description: FieldPatch<String>,
    /// New start time.
    pub starts_at: Option<DateTime<Utc>>,
    /// Venue.
    pub location: FieldPatch<String>,
    /// Why the override is made.
    pub reason: String,
}

/// Override of the payable deadline on an event's contribution charges.
#[derive(Debug, Clone, Default)]
pub struct EventDeadlineOverride {
    /// Event whose charges change.
    pub event_id: EventId,
    /// New deadline; `Clear` removes it.
    pub deadline: FieldPatch<NaiveDate>,
    /// Why the override is made.
    pub reason: String,
}

/// Override of a cleaning assignment.
#[derive(Debug, Clone, Default)]
pub struct CleaningAssignmentOverride {
    /// Assignment to change.
    pub assignment_id: CleaningAssignmentId,
    /// New assignee.
    pub occupant_id: Option<OccupantId>,
    /// New area.
    pub area: Option<String>,
    /// Why the override is made.
    pub reason: String,
}

/// Override of the resting floor for a cleaning week.
#[derive(Debug, Clone, Default)]
pub struct CleaningRestLevelOverride {
    /// Week to change.
    pub week_id: CleaningWeekId,
    /// New rest level; `Clear` means no floor rests.
    pub rest_level: FieldPatch<i32>,
    /// Why the override is made.
    pub reason: String,
}

/// Override of an evaluation score.
#[derive(Debug, Clone, Default)]
pub struct EvaluationScoreOverride {
    /// Score to change.
    pub score_id: EvaluationScoreId,
    /// New score, within `0..=max_score`.
    pub score: Option<Decimal>,
    /// Evaluator comment.
    pub comment: FieldPatch<String>,
    /// Why the override is made.
    pub reason: String,
}

/// Result of any override.
#[derive(Debug, Clone, Serialize)]
pub struct OverrideOutcome {
    /// Kind of record changed.
    pub entity_type: String,
    /// ID of the record changed.
    pub entity_id: Uuid,
    /// Fields that changed.
    pub changed_fields: Vec<String>,
    /// Rows written, including linked ledger entries.
    pub rows_affected: u64,
    /// False when a linked ledger update failed and needs reconciliation.
    pub ledger_synced: bool,
}
