//! Fine and fine rule types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use warden_shared::types::{Amount, DormId, FineId, FineRuleId, OccupantId, TermId, UserId};

use crate::ledger::{LedgerEntry, VoidInfo};

/// Rule severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Minor infraction.
    Minor,
    /// Major infraction.
    Major,
    /// Grave infraction.
    Grave,
}

impl Severity {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Minor => "minor",
            Self::Major => "major",
            Self::Grave => "grave",
        }
    }

    /// Parses from string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "minor" => Some(Self::Minor),
            "major" => Some(Self::Major),
            "grave" => Some(Self::Grave),
            _ => None,
        }
    }
}

/// A catalogued violation with default penalties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FineRule {
    /// Rule ID.
    pub id: FineRuleId,
    /// Owning dorm.
    pub dorm_id: DormId,
    /// Short title.
    pub title: String,
    /// Longer description.
    pub description: Option<String>,
    /// Severity.
    pub severity: Severity,
    /// Default peso amount.
    pub default_pesos: Amount,
    /// Default demerit points.
    pub default_points: i32,
    /// Inactive rules cannot be used for new fines.
    pub active: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Fine status derived from its void fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FineStatus {
    /// In force.
    Active,
    /// Voided.
    Voided,
}

impl FineStatus {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Voided => "voided",
        }
    }
}

/// A disciplinary fine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fine {
    /// Fine ID.
    pub id: FineId,
    /// Owning dorm.
    pub dorm_id: DormId,
    /// Fined occupant.
    pub occupant_id: OccupantId,
    /// Term the fine was issued in.
    pub term_id: Option<TermId>,
    /// Rule applied, if any.
    pub rule_id: Option<FineRuleId>,
    /// Peso penalty.
    pub pesos: Amount,
    /// Demerit points.
    pub points: i32,
    /// Note from the issuer.
    pub note: Option<String>,
    /// Who issued the fine.
    pub issued_by: UserId,
    /// When the fine was issued.
    pub issued_at: DateTime<Utc>,
    /// Void details. `None` while the fine is active.
    pub void: Option<VoidInfo>,
    /// Set when the paired ledger charge could not be kept in sync.
    pub needs_reconciliation: bool,
}

impl Fine {
    /// Returns the derived status.
    #[must_use]
    pub const fn status(&self) -> FineStatus {
        if self.void.is_some() {
            FineStatus::Voided
        } else {
            FineStatus::Active
        }
    }

    /// Returns true while the fine is in force.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.void.is_none()
    }
}

/// Note written on a fine's ledger charge.
#[must_use]
pub fn fine_charge_note(note: Option<&str>, rule_title: Option<&str>) -> String {
    let detail = note
        .filter(|n| !n.trim().is_empty())
        .or(rule_title)
        .unwrap_or("Violation");
    format!("Fine: {detail}")
}

/// Filter for listing fines.
#[derive(Debug, Clone, Default)]
pub struct FineFilter {
    /// Only fines of this occupant.
    pub occupant_id: Option<OccupantId>,
    /// Only fines stamped with this term.
    pub term_id: Option<TermId>,
    /// Include voided fines.
    pub include_voided: bool,
    /// Only fines flagged for reconciliation.
    pub needs_reconciliation: bool,
}

impl FineFilter {
    /// Returns true if the fine passes the filter.
    #[must_use]
    pub fn matches(&self, fine: &Fine) -> bool {
        self.occupant_id.is_none_or(|id| fine.occupant_id == id)
            && self.term_id.is_none_or(|id| fine.term_id == Some(id))
            && (self.include_voided || fine.is_active())
            && (!self.needs_reconciliation || fine.needs_reconciliation)
    }
}

/// Input for issuing a fine.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssueFineInput {
    /// Occupant to fine.
    pub occupant_id: OccupantId,
    /// Rule to apply; supplies defaults for omitted amounts.
    #[serde(default)]
    pub rule_id: Option<FineRuleId>,
    /// Peso penalty; defaults to the rule's. Required without a rule.
    #[serde(default)]
    pub pesos: Option<Decimal>,
    /// Demerit points; defaults to the rule's, else zero.
    #[serde(default)]
    pub points: Option<i32>,
    /// Issuer note.
    #[serde(default)]
    pub note: Option<String>,
}

/// Result of issuing a fine.
#[derive(Debug, Clone, Serialize)]
pub struct IssueFineOutcome {
    /// The stored fine.
    pub fine: Fine,
    /// The paired charge, when it was written.
    pub entry: Option<LedgerEntry>,
    /// False when the charge write failed and the fine awaits reconciliation.
    pub ledger_synced: bool,
}

/// Result of voiding a fine.
#[derive(Debug, Clone, Serialize)]
pub struct VoidFineOutcome {
    /// The fine after the call.
    pub fine: Fine,
    /// Linked entries voided by this call.
    pub entries_voided: u64,
    /// False when voiding linked entries failed.
    pub ledger_synced: bool,
    /// False when the fine was already voided.
    pub changed: bool,
}

/// Summary of a reconciliation pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconcileReport {
    /// Fines examined.
    pub fines_checked: usize,
    /// Fines that needed ledger changes.
    pub fines_repaired: usize,
    /// Charges posted.
    pub charges_posted: u64,
    /// Charges whose amount was corrected.
    pub charges_patched: u64,
    /// Entries voided.
    pub entries_voided: u64,
    /// Fines that still failed to sync.
    pub failures: usize,
}

/// Input for creating a fine rule.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFineRuleInput {
    /// Short title.
    pub title: String,
    /// Longer description.
    #[serde(default)]
    pub description: Option<String>,
    /// Severity.
    pub severity: Severity,
    /// Default peso amount.
    pub default_pesos: Decimal,
    /// Default demerit points.
    #[serde(default)]
    pub default_points: i32,
}

/// Input for updating a fine rule. Omitted fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateFineRuleInput {
    /// New title.
    #[serde(default)]
    pub title: Option<String>,
    /// New description.
    #[serde(default)]
    pub description: Option<String>,
    /// New severity.
    #[serde(default)]
    pub severity: Option<Severity>,
    /// New default peso amount.
    #[serde(default)]
    pub default_pesos: Option<Decimal>,
    /// New default points.
    #[serde(default)]
    pub default_points: Option<i32>,
    /// Reactivate or deactivate.
    #[serde(default)]
    pub active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_charge_note_prefers_issuer_note() {
        assert_eq!(fine_charge_note(Some("late curfew"), Some("Curfew")), "Fine: late curfew");
        assert_eq!(fine_charge_note(Some("  "), Some("Curfew")), "Fine: Curfew");
        assert_eq!(fine_charge_note(None, None), "Fine: Violation");
    }
}
