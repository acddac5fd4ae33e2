//! Row and domain conversions.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde_json::Value;
use uuid::Uuid;
use warden_core::StoreError;
use warden_core::access::Role;
use warden_core::audit::{AuditAction, AuditEvent};
use warden_core::fines::{Fine, FineRule, Severity};
use warden_core::ledger::{CategoryAliases, EntryType, LedgerEntry, Posting, VoidInfo};
use warden_core::occupants::{Occupant, OccupantStatus};
use warden_core::records::{
    CleaningAssignment, CleaningWeek, EvaluationScore, Event, Expense, ExpenseStatus,
};
use warden_core::term::{Term, TermStatus};
use warden_shared::types::{Amount, UserId};

use crate::entities::{
    audit_events, cleaning_assignments, cleaning_weeks, evaluation_scores, events, expenses,
    fine_rules, fines, ledger_entries, occupants, sea_orm_active_enums as db_enums, terms,
};

pub(crate) fn utc(value: DateTimeWithTimeZone) -> DateTime<Utc> {
    value.with_timezone(&Utc)
}

pub(crate) fn tz(value: DateTime<Utc>) -> DateTimeWithTimeZone {
    value.into()
}

fn amount(value: Decimal, column: &str) -> Result<Amount, StoreError> {
    Amount::new(value).map_err(|e| StoreError::Corrupt(format!("{column}: {e}")))
}

fn void_info(
    voided_at: Option<DateTimeWithTimeZone>,
    voided_by: Option<Uuid>,
    reason: Option<String>,
) -> Result<Option<VoidInfo>, StoreError> {
    match (voided_at, voided_by) {
        (None, _) => Ok(None),
        (Some(at), Some(by)) => Ok(Some(VoidInfo {
            voided_at: utc(at),
            voided_by: UserId::from_uuid(by),
            reason: reason.unwrap_or_default(),
        })),
        (Some(_), None) => Err(StoreError::Corrupt(
            "voided row has no voided_by".to_string(),
        )),
    }
}

// ===== Terms =====

pub(crate) const fn term_status(status: db_enums::TermStatus) -> TermStatus {
    match status {
        db_enums::TermStatus::Planned => TermStatus::Planned,
        db_enums::TermStatus::Active => TermStatus::Active,
        db_enums::TermStatus::Archived => TermStatus::Archived,
    }
}

pub(crate) fn term(model: terms::Model) -> Term {
    Term {
        id: model.id.into(),
        dorm_id: model.dorm_id.into(),
        label: model.label,
        starts_on: model.starts_on,
        ends_on: model.ends_on,
        status: term_status(model.status),
        created_at: utc(model.created_at),
    }
}

// ===== Occupants =====

pub(crate) const fn occupant_status(status: OccupantStatus) -> db_enums::OccupantStatus {
    match status {
        OccupantStatus::Active => db_enums::OccupantStatus::Active,
        OccupantStatus::Left => db_enums::OccupantStatus::Left,
        OccupantStatus::Removed => db_enums::OccupantStatus::Removed,
    }
}

pub(crate) fn occupant(model: occupants::Model) -> Occupant {
    Occupant {
        id: model.id.into(),
        dorm_id: model.dorm_id.into(),
        user_id: model.user_id.map(UserId::from_uuid),
        display_name: model.display_name,
        student_id: model.student_id,
        email: model.email,
        status: match model.status {
            db_enums::OccupantStatus::Active => OccupantStatus::Active,
            db_enums::OccupantStatus::Left => OccupantStatus::Left,
            db_enums::OccupantStatus::Removed => OccupantStatus::Removed,
        },
        created_at: utc(model.created_at),
        updated_at: utc(model.updated_at),
    }
}

pub(crate) fn occupant_row(occupant: &Occupant) -> occupants::Model {
    occupants::Model {
        id: occupant.id.into_inner(),
        dorm_id: occupant.dorm_id.into_inner(),
        user_id: occupant.user_id.map(UserId::into_inner),
        display_name: occupant.display_name.clone(),
        student_id: occupant.student_id.clone(),
        email: occupant.email.clone(),
        status: occupant_status(occupant.status),
        created_at: tz(occupant.created_at),
        updated_at: tz(occupant.updated_at),
    }
}

// ===== Ledger entries =====

pub(crate) const fn entry_type(entry_type: EntryType) -> db_enums::EntryType {
    match entry_type {
        EntryType::Charge => db_enums::EntryType::Charge,
        EntryType::Payment => db_enums::EntryType::Payment,
    }
}

/// Rebuilds an entry from its row.
///
/// The ledger name goes through the alias table and the posting is rebuilt
/// from `entry_type`; a stored sign that disagrees is logged and ignored.
pub(crate) fn entry(
    model: ledger_entries::Model,
    aliases: &CategoryAliases,
) -> Result<LedgerEntry, StoreError> {
    let category = aliases
        .normalize(&model.ledger)
        .map_err(|e| StoreError::Corrupt(format!("ledger entry {}: {e}", model.id)))?;
    let kind = match model.entry_type {
        db_enums::EntryType::Charge => EntryType::Charge,
        db_enums::EntryType::Payment => EntryType::Payment,
    };
    let (posting, drift) = Posting::from_stored(kind, model.amount);
    if drift {
        tracing::warn!(
            entry_id = %model.id,
            entry_type = %kind,
            stored_amount = %model.amount,
            "stored amount sign disagrees with entry type; using entry type"
        );
    }

    let metadata = match model.metadata {
        Value::Object(map) => Value::Object(map),
        Value::Null => Value::Object(serde_json::Map::new()),
        other => {
            tracing::warn!(entry_id = %model.id, "ledger entry metadata is not an object");
            serde_json::json!({ "legacy": other })
        }
    };

    Ok(LedgerEntry {
        id: model.id.into(),
        dorm_id: model.dorm_id.into(),
        occupant_id: model.occupant_id.into(),
        term_id: model.term_id.map(Into::into),
        category,
        posting,
        event_id: model.event_id.map(Into::into),
        fine_id: model.fine_id.map(Into::into),
        note: model.note,
        method: model.method,
        metadata,
        posted_at: utc(model.posted_at),
        created_by: model.created_by.map(UserId::from_uuid),
        void: void_info(model.voided_at, model.voided_by, model.void_reason)?,
    })
}

pub(crate) fn entry_row(entry: &LedgerEntry) -> ledger_entries::Model {
    let void = entry.void.as_ref();
    ledger_entries::Model {
        id: entry.id.into_inner(),
        dorm_id: entry.dorm_id.into_inner(),
        occupant_id: entry.occupant_id.into_inner(),
        term_id: entry.term_id.map(|id| id.into_inner()),
        ledger: entry.category.as_str().to_string(),
        entry_type: entry_type(entry.entry_type()),
        amount: entry.signed_amount(),
        event_id: entry.event_id.map(|id| id.into_inner()),
        fine_id: entry.fine_id.map(|id| id.into_inner()),
        note: entry.note.clone(),
        method: entry.method.clone(),
        metadata: entry.metadata.clone(),
        posted_at: tz(entry.posted_at),
        created_by: entry.created_by.map(UserId::into_inner),
        voided_at: void.map(|v| tz(v.voided_at)),
        voided_by: void.map(|v| v.voided_by.into_inner()),
        void_reason: void.map(|v| v.reason.clone()),
    }
}

// ===== Fines =====

pub(crate) fn fine(model: fines::Model) -> Result<Fine, StoreError> {
    Ok(Fine {
        id: model.id.into(),
        dorm_id: model.dorm_id.into(),
        occupant_id: model.occupant_id.into(),
        term_id: model.term_id.map(Into::into),
        rule_id: model.rule_id.map(Into::into),
        pesos: amount(model.pesos, "fines.pesos")?,
        points: model.points,
        note: model.note,
        issued_by: UserId::from_uuid(model.issued_by),
        issued_at: utc(model.issued_at),
        void: void_info(model.voided_at, model.voided_by, model.void_reason)?,
        needs_reconciliation: model.needs_reconciliation,
    })
}

pub(crate) fn fine_row(fine: &Fine) -> fines::Model {
    let void = fine.void.as_ref();
    fines::Model {
        id: fine.id.into_inner(),
        dorm_id: fine.dorm_id.into_inner(),
        occupant_id: fine.occupant_id.into_inner(),
        term_id: fine.term_id.map(|id| id.into_inner()),
        rule_id: fine.rule_id.map(|id| id.into_inner()),
        pesos: fine.pesos.value(),
        points: fine.points,
        note: fine.note.clone(),
        issued_by: fine.issued_by.into_inner(),
        issued_at: tz(fine.issued_at),
        voided_at: void.map(|v| tz(v.voided_at)),
        voided_by: void.map(|v| v.voided_by.into_inner()),
        void_reason: void.map(|v| v.reason.clone()),
        needs_reconciliation: fine.needs_reconciliation,
    }
}

pub(crate) fn fine_rule(model: fine_rules::Model) -> Result<FineRule, StoreError> {
    Ok(FineRule {
        id: model.id.into(),
        dorm_id: model.dorm_id.into(),
        title: model.title,
        description: model.description,
        severity: match model.severity {
            db_enums::FineSeverity::Minor => Severity::Minor,
            db_enums::FineSeverity::Major => Severity::Major,
            db_enums::FineSeverity::Grave => Severity::Grave,
        },
        default_pesos: amount(model.default_pesos, "fine_rules.default_pesos")?,
        default_points: model.default_points,
        active: model.active,
        created_at: utc(model.created_at),
    })
}

pub(crate) fn fine_rule_row(rule: &FineRule) -> fine_rules::Model {
    fine_rules::Model {
        id: rule.id.into_inner(),
        dorm_id: rule.dorm_id.into_inner(),
        title: rule.title.clone(),
        description: rule.description.clone(),
        severity: match rule.severity {
            Severity::Minor => db_enums::FineSeverity::Minor,
            Severity::Major => db_enums::FineSeverity::Major,
            Severity::Grave => db_enums::FineSeverity::Grave,
        },
        default_pesos: rule.default_pesos.value(),
        default_points: rule.default_points,
        active: rule.active,
        created_at: tz(rule.created_at),
    }
}

// ===== Collaborator records =====

pub(crate) fn expense(model: expenses::Model) -> Result<Expense, StoreError> {
    Ok(Expense {
        id: model.id.into(),
        dorm_id: model.dorm_id.into(),
        term_id: model.term_id.map(Into::into),
        description: model.description,
        amount: amount(model.amount, "expenses.amount")?,
        status: match model.status {
            db_enums::ExpenseStatus::Pending => ExpenseStatus::Pending,
            db_enums::ExpenseStatus::Approved => ExpenseStatus::Approved,
            db_enums::ExpenseStatus::Rejected => ExpenseStatus::Rejected,
        },
        created_at: utc(model.created_at),
    })
}

pub(crate) fn event(model: events::Model) -> Event {
    Event {
        id: model.id.into(),
        dorm_id: model.dorm_id.into(),
        term_id: model.term_id.map(Into::into),
        title: model.title,
        description: model.description,
        starts_at: utc(model.starts_at),
        location: model.location,
        created_at: utc(model.created_at),
    }
}

pub(crate) fn event_row(event: &Event) -> events::Model {
    events::Model {
        id: event.id.into_inner(),
        dorm_id: event.dorm_id.into_inner(),
        term_id: event.term_id.map(|id| id.into_inner()),
        title: event.title.clone(),
        description: event.description.clone(),
        starts_at: tz(event.starts_at),
        location: event.location.clone(),
        created_at: tz(event.created_at),
    }
}

pub(crate) fn cleaning_week(model: cleaning_weeks::Model) -> CleaningWeek {
    CleaningWeek {
        id: model.id.into(),
        dorm_id: model.dorm_id.into(),
        week_start: model.week_start,
        rest_level: model.rest_level,
    }
}

pub(crate) fn cleaning_week_row(week: &CleaningWeek) -> cleaning_weeks::Model {
    cleaning_weeks::Model {
        id: week.id.into_inner(),
        dorm_id: week.dorm_id.into_inner(),
        week_start: week.week_start,
        rest_level: week.rest_level,
    }
}

pub(crate) fn cleaning_assignment(model: cleaning_assignments::Model) -> CleaningAssignment {
    CleaningAssignment {
        id: model.id.into(),
        dorm_id: model.dorm_id.into(),
        week_id: model.week_id.into(),
        area: model.area,
        occupant_id: model.occupant_id.into(),
    }
}

pub(crate) fn cleaning_assignment_row(
    assignment: &CleaningAssignment,
) -> cleaning_assignments::Model {
    cleaning_assignments::Model {
        id: assignment.id.into_inner(),
        dorm_id: assignment.dorm_id.into_inner(),
        week_id: assignment.week_id.into_inner(),
        area: assignment.area.clone(),
        occupant_id: assignment.occupant_id.into_inner(),
    }
}

pub(crate) fn evaluation_score(model: evaluation_scores::Model) -> EvaluationScore {
    EvaluationScore {
        id: model.id.into(),
        dorm_id: model.dorm_id.into(),
        occupant_id: model.occupant_id.into(),
        term_id: model.term_id.map(Into::into),
        criterion: model.criterion,
        score: model.score,
        max_score: model.max_score,
        comment: model.comment,
        recorded_at: utc(model.recorded_at),
    }
}

pub(crate) fn evaluation_score_row(score: &EvaluationScore) -> evaluation_scores::Model {
    evaluation_scores::Model {
        id: score.id.into_inner(),
        dorm_id: score.dorm_id.into_inner(),
        occupant_id: score.occupant_id.into_inner(),
        term_id: score.term_id.map(|id| id.into_inner()),
        criterion: score.criterion.clone(),
        score: score.score,
        max_score: score.max_score,
        comment: score.comment.clone(),
        recorded_at: tz(score.recorded_at),
    }
}

// ===== Audit =====

pub(crate) fn audit_event(model: audit_events::Model) -> Result<AuditEvent, StoreError> {
    let actor_role = Role::parse(&model.actor_role).ok_or_else(|| {
        StoreError::Corrupt(format!("audit event {}: unknown role '{}'", model.id, model.actor_role))
    })?;
    let action = AuditAction::parse(&model.action).ok_or_else(|| {
        StoreError::Corrupt(format!("audit event {}: unknown action '{}'", model.id, model.action))
    })?;
    Ok(AuditEvent {
        id: model.id.into(),
        dorm_id: model.dorm_id.into(),
        actor_id: UserId::from_uuid(model.actor_id),
        actor_role,
        action,
        entity_type: model.entity_type,
        entity_id: model.entity_id,
        metadata: model.metadata,
        created_at: utc(model.created_at),
    })
}

pub(crate) fn audit_row(event: &AuditEvent) -> audit_events::Model {
    audit_events::Model {
        id: event.id.into_inner(),
        dorm_id: event.dorm_id.into_inner(),
        actor_id: event.actor_id.into_inner(),
        actor_role: event.actor_role.as_str().to_string(),
        action: event.action.as_str().to_string(),
        entity_type: event.entity_type.clone(),
        entity_id: event.entity_id,
        metadata: event.metadata.clone(),
        created_at: tz(event.created_at),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use warden_core::ledger::LedgerCategory;

    fn row(ledger: &str, entry_type: db_enums::EntryType, amount: Decimal) -> ledger_entries::Model {
        let posted = Utc.with_ymd_and_hms(2026, 9, 1, 8, 0, 0).unwrap();
        ledger_entries::Model {
            id: Uuid::now_v7(),
            dorm_id: Uuid::now_v7(),
            occupant_id: Uuid::now_v7(),
            term_id: None,
            ledger: ledger.to_string(),
            entry_type,
            amount,
            event_id: None,
            fine_id: None,
            note: None,
            method: None,
            metadata: serde_json::json!({}),
            posted_at: tz(posted),
            created_by: None,
            voided_at: None,
            voided_by: None,
            void_reason: None,
        }
    }

    #[test]
    fn test_legacy_alias_reads_as_canonical() {
        let model = row("treasurer_events", db_enums::EntryType::Charge, dec!(100));
        let entry = entry(model, &CategoryAliases::default()).unwrap();
        assert_eq!(entry.category, LedgerCategory::Contributions);
    }

    #[test]
    fn test_entry_type_wins_over_stored_sign() {
        let model = row("maintenance_fee", db_enums::EntryType::Payment, dec!(250));
        let entry = entry(model, &CategoryAliases::default()).unwrap();
        assert_eq!(entry.entry_type(), EntryType::Payment);
        assert_eq!(entry.signed_amount(), dec!(-250));
    }

    #[test]
    fn test_unknown_ledger_is_corrupt() {
        let model = row("laundry", db_enums::EntryType::Charge, dec!(1));
        let err = entry(model, &CategoryAliases::default()).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));
    }

    #[test]
    fn test_void_without_actor_is_corrupt() {
        let mut model = row("sa_fines", db_enums::EntryType::Charge, dec!(1));
        model.voided_at = Some(model.posted_at);
        let err = entry(model, &CategoryAliases::default()).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));
    }

    #[test]
    fn test_entry_row_stores_signed_amount() {
        let model = row("maintenance_fee", db_enums::EntryType::Payment, dec!(-75));
        let entry = entry(model, &CategoryAliases::default()).unwrap();
        let stored = entry_row(&entry);
        assert_eq!(stored.amount, dec!(-75));
        assert_eq!(stored.ledger, "maintenance_fee");
    }
}
