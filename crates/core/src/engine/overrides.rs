//! Admin overrides.
//!
//! Every override follows the same steps: admin check, reason check, load,
//! sparse change set, `NoChangesProvided` when empty, write, audit with
//! before and after values.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde_json::json;
use uuid::Uuid;

use crate::access::{AccessPolicy, ActorContext, Capability};
use crate::audit::AuditAction;
use crate::error::{EngineError, EngineResult};
use crate::fines::{Fine, fine_charge_note};
use crate::ledger::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, non_negative_amount, optional_text, require_reason,
    required_text,
};
use crate::ledger::{EntryFilter, EntryType, LedgerCategory, VoidInfo};
use crate::overrides::{
    ChangeSet, CleaningAssignmentOverride, CleaningRestLevelOverride, EntryOwnerOverride,
    EvaluationScoreOverride, EventDeadlineOverride, EventOverride, FieldPatch, FineOverride,
    OccupantOverride, OverrideOutcome, RestoreEntryInput,
};
use crate::store::StoreError;

use super::Engine;
use super::occupants::{validate_display_name, validate_email, validate_student_id};

const MAX_AREA_LEN: usize = 100;

/// Normalizes a text patch: blank text clears the field.
fn text_patch(patch: FieldPatch<String>, field: &str, max_len: usize) -> EngineResult<FieldPatch<String>> {
    Ok(match patch {
        FieldPatch::Keep => FieldPatch::Keep,
        FieldPatch::Clear => FieldPatch::Clear,
        FieldPatch::Set(text) => optional_text(Some(&text), field, max_len)?
            .map_or(FieldPatch::Clear, FieldPatch::Set),
    })
}

fn outcome(entity_type: &str, entity_id: Uuid, changes: &ChangeSet, rows: u64, synced: bool) -> OverrideOutcome {
    OverrideOutcome {
        entity_type: entity_type.to_string(),
        entity_id,
        changed_fields: changes.fields(),
        rows_affected: rows,
        ledger_synced: synced,
    }
}

impl Engine {
    fn begin_override(actor: &ActorContext, reason: &str) -> EngineResult<String> {
        AccessPolicy::require(actor, Capability::Override)?;
        require_reason(reason)
    }

    async fn finish_override(
        &self,
        actor: &ActorContext,
        action: AuditAction,
        outcome: &OverrideOutcome,
        changes: &ChangeSet,
        reason: &str,
    ) {
        tracing::info!(
            action = %action,
            entity_type = %outcome.entity_type,
            entity_id = %outcome.entity_id,
            fields = ?outcome.changed_fields,
            rows_affected = outcome.rows_affected,
            "override applied"
        );
        let mut metadata = changes.audit_metadata(reason);
        if let Some(map) = metadata.as_object_mut() {
            map.insert("rows_affected".to_string(), json!(outcome.rows_affected));
            map.insert("ledger_synced".to_string(), json!(outcome.ledger_synced));
        }
        self.record_audit(actor, action, &outcome.entity_type, outcome.entity_id, metadata)
            .await;
    }

    /// Overrides an occupant's profile fields or status.
    pub async fn override_occupant(
        &self,
        actor: &ActorContext,
        input: OccupantOverride,
    ) -> EngineResult<OverrideOutcome> {
        let reason = Self::begin_override(actor, &input.reason)?;
        let mut occupant = self.occupant(actor.dorm_id, input.occupant_id).await?;

        let display_name = input
            .display_name
            .as_deref()
            .map(validate_display_name)
            .transpose()?;
        let student_id = match input.student_id {
            FieldPatch::Set(text) => match validate_student_id(Some(&text))? {
                Some(id) => FieldPatch::Set(id),
                None => FieldPatch::Clear,
            },
            other => other,
        };
        let email = match input.email {
            FieldPatch::Set(text) => match validate_email(Some(&text))? {
                Some(address) => FieldPatch::Set(address),
                None => FieldPatch::Clear,
            },
            other => other,
        };

        let mut changes = ChangeSet::new();
        if let Some(name) = changes.track("display_name", &occupant.display_name, display_name) {
            occupant.display_name = name;
        }
        if let Some(id) = changes.track_patch("student_id", &occupant.student_id, student_id) {
            occupant.student_id = id;
        }
        if let Some(address) = changes.track_patch("email", &occupant.email, email) {
            occupant.email = address;
        }
        if let Some(status) = changes.track("status", &occupant.status, input.status) {
            occupant.status = status;
        }
        changes.require_changes()?;

        occupant.updated_at = chrono::Utc::now();
        self.store.update_occupant(&occupant).await?;

        let result = outcome("occupant", occupant.id.into_inner(), &changes, 1, true);
        self.finish_override(actor, AuditAction::OverrideOccupant, &result, &changes, &reason)
            .await;
        Ok(result)
    }

    /// Overrides a fine, optionally restoring it when voided.
    ///
    /// Amount or note changes patch the fine's still-active charges. A restore
    /// brings back the payments voided along with the fine and posts a fresh
    /// charge for the current amount. Earlier voided charges stay voided.
    pub async fn override_fine(
        &self,
        actor: &ActorContext,
        input: FineOverride,
    ) -> EngineResult<OverrideOutcome> {
        let reason = Self::begin_override(actor, &input.reason)?;
        let mut fine = self.fine(actor.dorm_id, input.fine_id).await?;

        let pesos = input
            .pesos
            .map(|value| non_negative_amount(value, "pesos"))
            .transpose()?;
        if input.points.is_some_and(|p| p < 0) {
            return Err(EngineError::invalid("points must not be negative"));
        }
        let note = text_patch(input.note, "note", MAX_NOTE_LEN)?;
        if let FieldPatch::Set(rule_id) = &input.rule_id {
            self.fine_rule(actor.dorm_id, *rule_id).await?;
        }

        let mut changes = ChangeSet::new();
        let pesos_changed = if let Some(pesos) = changes.track("pesos", &fine.pesos, pesos) {
            fine.pesos = pesos;
            true
        } else {
            false
        };
        if let Some(points) = changes.track("points", &fine.points, input.points) {
            fine.points = points;
        }
        let note_changed = if let Some(note) = changes.track_patch("note", &fine.note, note) {
            fine.note = note;
            true
        } else {
            false
        };
        let rule_changed = if let Some(rule_id) = changes.track_patch("rule_id", &fine.rule_id, input.rule_id) {
            fine.rule_id = rule_id;
            true
        } else {
            false
        };
        let prior_void = if input.restore_if_voided { fine.void.take() } else { None };
        let restoring = prior_void.is_some();
        if restoring {
            changes.record("status", "voided", "active");
        }
        changes.require_changes()?;

        self.store.update_fine(&fine).await?;
        let mut rows = 1;
        let mut synced = true;

        let ledger_touched = restoring || pesos_changed || note_changed || rule_changed;
        if fine.is_active() && ledger_touched {
            let title = match fine.rule_id {
                Some(rule_id) => Some(self.fine_rule(actor.dorm_id, rule_id).await?.title),
                None => None,
            };
            let charge_note = fine_charge_note(fine.note.as_deref(), title.as_deref());

            let result = if let Some(prior_void) = &prior_void {
                self.restore_fine_ledger(actor, &fine, prior_void, &charge_note)
                    .await
            } else {
                self.store
                    .patch_fine_charges(actor.dorm_id, fine.id, fine.pesos, &charge_note)
                    .await
            };
            match result {
                Ok(synced_rows) => rows += synced_rows,
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        fine_id = %fine.id,
                        "fine overridden but its ledger charge could not be synchronized"
                    );
                    self.flag_for_reconciliation(&mut fine).await;
                    synced = false;
                }
            }
        }

        let result = outcome("fine", fine.id.into_inner(), &changes, rows, synced);
        self.finish_override(actor, AuditAction::OverrideFine, &result, &changes, &reason)
            .await;
        Ok(result)
    }

    async fn restore_fine_ledger(
        &self,
        actor: &ActorContext,
        fine: &Fine,
        prior_void: &VoidInfo,
        charge_note: &str,
    ) -> Result<u64, StoreError> {
        let revived = self.revive_fine_payments(actor, fine, prior_void).await?;
        let tally = self.sync_fine_ledger(actor, fine, charge_note).await?;
        Ok(revived + tally.total())
    }

    /// Moves a ledger entry to another occupant.
    ///
    /// For a fine-linked entry every entry sharing the fine moves in one
    /// statement, and the fine moves with them.
    pub async fn override_ledger_entry_owner(
        &self,
        actor: &ActorContext,
        input: EntryOwnerOverride,
    ) -> EngineResult<OverrideOutcome> {
        let reason = Self::begin_override(actor, &input.reason)?;
        let entry = self.entry(actor.dorm_id, input.entry_id).await?;
        let target = self.postable_occupant(actor.dorm_id, input.occupant_id).await?;

        let mut changes = ChangeSet::new();
        changes.track("occupant_id", &entry.occupant_id, Some(target.id));
        changes.require_changes()?;

        let rows = match entry.fine_id {
            Some(fine_id) => {
                let mut rows = self
                    .store
                    .reassign_fine_entries(actor.dorm_id, fine_id, target.id)
                    .await?;
                if let Some(mut fine) = self.store.get_fine(actor.dorm_id, fine_id).await? {
                    if fine.occupant_id != target.id {
                        changes.record("fine.occupant_id", &fine.occupant_id, &target.id);
                        fine.occupant_id = target.id;
                        self.store.update_fine(&fine).await?;
                        rows += 1;
                    }
                }
                rows
            }
            None => {
                self.store
                    .reassign_entry(actor.dorm_id, entry.id, target.id)
                    .await?
            }
        };

        let result = outcome("ledger_entry", entry.id.into_inner(), &changes, rows, true);
        self.finish_override(actor, AuditAction::OverrideEntryOwner, &result, &changes, &reason)
            .await;
        Ok(result)
    }

    /// Restores a voided ledger entry.
    ///
    /// Charges paired with a fine are restored through the fine instead, so
    /// the fine never ends up with two charges.
    pub async fn restore_ledger_entry(
        &self,
        actor: &ActorContext,
        input: RestoreEntryInput,
    ) -> EngineResult<OverrideOutcome> {
        let reason = Self::begin_override(actor, &input.reason)?;
        let entry = self.entry(actor.dorm_id, input.entry_id).await?;

        let Some(void) = entry.void.clone() else {
            return Err(EngineError::NoChangesProvided);
        };
        if entry.fine_id.is_some() && entry.entry_type() == EntryType::Charge {
            return Err(EngineError::invalid(
                "fine charges are restored by restoring the fine",
            ));
        }

        if !self.store.restore_entry(actor.dorm_id, entry.id).await? {
            return Err(EngineError::NoChangesProvided);
        }

        let mut changes = ChangeSet::new();
        changes.record("void", &void, &serde_json::Value::Null);

        let result = outcome("ledger_entry", entry.id.into_inner(), &changes, 1, true);
        self.finish_override(actor, AuditAction::RestoreEntry, &result, &changes, &reason)
            .await;
        Ok(result)
    }

    /// Overrides an event's details.
    pub async fn override_event(
        &self,
        actor: &ActorContext,
        input: EventOverride,
    ) -> EngineResult<OverrideOutcome> {
        let reason = Self::begin_override(actor, &input.reason)?;
        let mut event = self
            .store
            .get_event(actor.dorm_id, input.event_id)
            .await?
            .ok_or_else(|| EngineError::not_found("event"))?;

        let title = input
            .title
            .as_deref()
            .map(|t| required_text(t, "title", MAX_NAME_LEN))
            .transpose()?;
        let description = text_patch(input.description, "description", MAX_NOTE_LEN)?;
        let location = text_patch(input.location, "location", MAX_NAME_LEN)?;

        let mut changes = ChangeSet::new();
        if let Some(title) = changes.track("title", &event.title, title) {
            event.title = title;
        }
        if let Some(description) = changes.track_patch("description", &event.description, description) {
            event.description = description;
        }
        if let Some(starts_at) = changes.track("starts_at", &event.starts_at, input.starts_at) {
            event.starts_at = starts_at;
        }
        if let Some(location) = changes.track_patch("location", &event.location, location) {
            event.location = location;
        }
        changes.require_changes()?;

        self.store.update_event(&event).await?;

        let result = outcome("event", event.id.into_inner(), &changes, 1, true);
        self.finish_override(actor, AuditAction::OverrideEvent, &result, &changes, &reason)
            .await;
        Ok(result)
    }

    /// Sets or clears the payable deadline on an event's active contribution charges.
    ///
    /// An event with no active charges is rejected as invalid input, since
    /// there is nothing to carry the deadline.
    pub async fn override_event_deadline(
        &self,
        actor: &ActorContext,
        input: EventDeadlineOverride,
    ) -> EngineResult<OverrideOutcome> {
        let reason = Self::begin_override(actor, &input.reason)?;
        let event = self
            .store
            .get_event(actor.dorm_id, input.event_id)
            .await?
            .ok_or_else(|| EngineError::not_found("event"))?;

        let next: Option<NaiveDate> = match input.deadline {
            FieldPatch::Keep => return Err(EngineError::NoChangesProvided),
            FieldPatch::Set(date) => Some(date),
            FieldPatch::Clear => None,
        };

        let filter = EntryFilter {
            event_id: Some(event.id),
            category: Some(LedgerCategory::Contributions),
            entry_type: Some(EntryType::Charge),
            ..EntryFilter::default()
        };
        let charges = self.load_entries(actor.dorm_id, filter).await?;
        if charges.is_empty() {
            return Err(EngineError::invalid("event has no active contribution charges"));
        }
        let previous: BTreeSet<Option<NaiveDate>> =
            charges.iter().map(|e| e.payable_deadline()).collect();
        if previous.iter().all(|deadline| *deadline == next) {
            return Err(EngineError::NoChangesProvided);
        }

        let rows = self
            .store
            .set_event_deadline(actor.dorm_id, event.id, next)
            .await?;

        let mut changes = ChangeSet::new();
        let previous: Vec<Option<NaiveDate>> = previous.into_iter().collect();
        match previous.as_slice() {
            [single] => changes.record("payable_deadline", single, &next),
            many => changes.record("payable_deadline", many, &next),
        }

        let result = outcome("event", event.id.into_inner(), &changes, rows, true);
        self.finish_override(actor, AuditAction::OverrideEventDeadline, &result, &changes, &reason)
            .await;
        Ok(result)
    }

    /// Overrides a cleaning assignment's occupant or area.
    pub async fn override_cleaning_assignment(
        &self,
        actor: &ActorContext,
        input: CleaningAssignmentOverride,
    ) -> EngineResult<OverrideOutcome> {
        let reason = Self::begin_override(actor, &input.reason)?;
        let mut assignment = self
            .store
            .get_cleaning_assignment(actor.dorm_id, input.assignment_id)
            .await?
            .ok_or_else(|| EngineError::not_found("cleaning assignment"))?;

        if let Some(occupant_id) = input.occupant_id {
            self.postable_occupant(actor.dorm_id, occupant_id).await?;
        }
        let area = input
            .area
            .as_deref()
            .map(|a| required_text(a, "area", MAX_AREA_LEN))
            .transpose()?;

        let mut changes = ChangeSet::new();
        if let Some(occupant_id) = changes.track("occupant_id", &assignment.occupant_id, input.occupant_id) {
            assignment.occupant_id = occupant_id;
        }
        if let Some(area) = changes.track("area", &assignment.area, area) {
            assignment.area = area;
        }
        changes.require_changes()?;

        self.store.update_cleaning_assignment(&assignment).await?;

        let result = outcome("cleaning_assignment", assignment.id.into_inner(), &changes, 1, true);
        self.finish_override(actor, AuditAction::OverrideCleaningAssignment, &result, &changes, &reason)
            .await;
        Ok(result)
    }

    /// Sets or clears the floor that rests during a cleaning week.
    pub async fn override_cleaning_rest_level(
        &self,
        actor: &ActorContext,
        input: CleaningRestLevelOverride,
    ) -> EngineResult<OverrideOutcome> {
        let reason = Self::begin_override(actor, &input.reason)?;
        let mut week = self
            .store
            .get_cleaning_week(actor.dorm_id, input.week_id)
            .await?
            .ok_or_else(|| EngineError::not_found("cleaning week"))?;

        if let FieldPatch::Set(level) = input.rest_level {
            if level < 1 {
                return Err(EngineError::invalid("rest_level must be a floor number of 1 or more"));
            }
        }

        let mut changes = ChangeSet::new();
        if let Some(level) = changes.track_patch("rest_level", &week.rest_level, input.rest_level) {
            week.rest_level = level;
        }
        changes.require_changes()?;

        self.store.update_cleaning_week(&week).await?;

        let result = outcome("cleaning_week", week.id.into_inner(), &changes, 1, true);
        self.finish_override(actor, AuditAction::OverrideCleaningRestLevel, &result, &changes, &reason)
            .await;
        Ok(result)
    }

    /// Overrides an evaluation score or its comment.
    pub async fn override_evaluation_score(
        &self,
        actor: &ActorContext,
        input: EvaluationScoreOverride,
    ) -> EngineResult<OverrideOutcome> {
        let reason = Self::begin_override(actor, &input.reason)?;
        let mut score = self
            .store
            .get_evaluation_score(actor.dorm_id, input.score_id)
            .await?
            .ok_or_else(|| EngineError::not_found("evaluation score"))?;

        if let Some(value) = input.score {
            if value.is_sign_negative() || value > score.max_score {
                return Err(EngineError::invalid(format!(
                    "score must be between 0 and {}",
                    score.max_score
                )));
            }
        }
        let comment = text_patch(input.comment, "comment", MAX_NOTE_LEN)?;

        let mut changes = ChangeSet::new();
        if let Some(value) = changes.track("score", &score.score, input.score) {
            score.score = value;
        }
        if let Some(comment) = changes.track_patch("comment", &score.comment, comment) {
            score.comment = comment;
        }
        changes.require_changes()?;

        self.store.update_evaluation_score(&score).await?;

        let result = outcome("evaluation_score", score.id.into_inner(), &changes, 1, true);
        self.finish_override(actor, AuditAction::OverrideEvaluationScore, &result, &changes, &reason)
            .await;
        Ok(result)
    }
}
