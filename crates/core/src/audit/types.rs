//! Audit event types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use warden_shared::types::{AuditEventId, DormId, UserId};

use crate::access::{ActorContext, Role};

/// Audited actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditAction {
    /// Occupant enrolled.
    #[serde(rename = "occupant.enroll")]
    OccupantEnroll,
    /// Ledger entry recorded.
    #[serde(rename = "ledger.record")]
    LedgerRecord,
    /// Ledger entry voided.
    #[serde(rename = "ledger.void")]
    LedgerVoid,
    /// Fine issued.
    #[serde(rename = "fine.issue")]
    FineIssue,
    /// Fine voided.
    #[serde(rename = "fine.void")]
    FineVoid,
    /// Fine ledger links repaired.
    #[serde(rename = "fine.reconcile")]
    FineReconcile,
    /// Fine rule created.
    #[serde(rename = "fine_rule.create")]
    FineRuleCreate,
    /// Fine rule updated or deactivated.
    #[serde(rename = "fine_rule.update")]
    FineRuleUpdate,
    /// Occupant overridden.
    #[serde(rename = "override.occupant")]
    OverrideOccupant,
    /// Fine overridden.
    #[serde(rename = "override.fine")]
    OverrideFine,
    /// Ledger entry owner reassigned.
    #[serde(rename = "override.ledger_entry_owner")]
    OverrideEntryOwner,
    /// Voided ledger entry restored.
    #[serde(rename = "override.ledger_entry_restore")]
    RestoreEntry,
    /// Event overridden.
    #[serde(rename = "override.event")]
    OverrideEvent,
    /// Event payable deadline overridden.
    #[serde(rename = "override.event_deadline")]
    OverrideEventDeadline,
    /// Cleaning assignment overridden.
    #[serde(rename = "override.cleaning_assignment")]
    OverrideCleaningAssignment,
    /// Cleaning rest level overridden.
    #[serde(rename = "override.cleaning_rest_level")]
    OverrideCleaningRestLevel,
    /// Evaluation score overridden.
    #[serde(rename = "override.evaluation_score")]
    OverrideEvaluationScore,
}

impl AuditAction {
    /// All actions.
    pub const ALL: [Self; 17] = [
        Self::OccupantEnroll,
        Self::LedgerRecord,
        Self::LedgerVoid,
        Self::FineIssue,
        Self::FineVoid,
        Self::FineReconcile,
        Self::FineRuleCreate,
        Self::FineRuleUpdate,
        Self::OverrideOccupant,
        Self::OverrideFine,
        Self::OverrideEntryOwner,
        Self::RestoreEntry,
        Self::OverrideEvent,
        Self::OverrideEventDeadline,
        Self::OverrideCleaningAssignment,
        Self::OverrideCleaningRestLevel,
        Self::OverrideEvaluationScore,
    ];

    /// Returns the dotted action name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OccupantEnroll => "occupant.enroll",
            Self::LedgerRecord => "ledger.record",
            Self::LedgerVoid => "ledger.void",
            Self::FineIssue => "fine.issue",
            Self::FineVoid => "fine.void",
            Self::FineReconcile => "fine.reconcile",
            Self::FineRuleCreate => "fine_rule.create",
            Self::FineRuleUpdate => "fine_rule.update",
            Self::OverrideOccupant => "override.occupant",
            Self::OverrideFine => "override.fine",
            Self::OverrideEntryOwner => "override.ledger_entry_owner",
            Self::RestoreEntry => "override.ledger_entry_restore",
            Self::OverrideEvent => "override.event",
            Self::OverrideEventDeadline => "override.event_deadline",
            Self::OverrideCleaningAssignment => "override.cleaning_assignment",
            Self::OverrideCleaningRestLevel => "override.cleaning_rest_level",
            Self::OverrideEvaluationScore => "override.evaluation_score",
        }
    }

    /// Parses a dotted action name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.as_str() == s)
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One audit trail row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Event ID.
    pub id: AuditEventId,
    /// Dorm the mutation happened in.
    pub dorm_id: DormId,
    /// Acting user.
    pub actor_id: UserId,
    /// Acting user's role at the time.
    pub actor_role: Role,
    /// What was done.
    pub action: AuditAction,
    /// Kind of record touched (`ledger_entry`, `fine`, ...).
    pub entity_type: String,
    /// ID of the record touched.
    pub entity_id: Uuid,
    /// Structured details, including before/after values for overrides.
    pub metadata: Value,
    /// When the mutation happened.
    pub created_at: DateTime<Utc>,
}

impl AuditEvent {
    /// Creates an event for `actor` stamped now.
    #[must_use]
    pub fn new(
        actor: &ActorContext,
        action: AuditAction,
        entity_type: &str,
        entity_id: Uuid,
        metadata: Value,
    ) -> Self {
        Self {
            id: AuditEventId::new(),
            dorm_id: actor.dorm_id,
            actor_id: actor.user_id,
            actor_role: actor.role,
            action,
            entity_type: entity_type.to_string(),
            entity_id,
            metadata,
            created_at: Utc::now(),
        }
    }
}

/// Filter for reading the audit trail.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditFilter {
    /// Only events for this entity type.
    #[serde(default)]
    pub entity_type: Option<String>,
    /// Only events for this entity.
    #[serde(default)]
    pub entity_id: Option<Uuid>,
    /// Only this action.
    #[serde(default)]
    pub action: Option<AuditAction>,
    /// Maximum rows, newest first.
    #[serde(default)]
    pub limit: Option<u32>,
}

impl AuditFilter {
    /// Returns true if the event passes the filter (ignores `limit`).
    #[must_use]
    pub fn matches(&self, event: &AuditEvent) -> bool {
        self.entity_type
            .as_deref()
            .is_none_or(|t| event.entity_type == t)
            && self.entity_id.is_none_or(|id| event.entity_id == id)
            && self.action.is_none_or(|a| event.action == a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_names_round_trip() {
        for action in AuditAction::ALL {
            assert_eq!(AuditAction::parse(action.as_str()), Some(action));
            assert_eq!(
                serde_json::to_value(action).unwrap(),
                serde_json::Value::String(action.as_str().to_string())
            );
        }
    }
}
