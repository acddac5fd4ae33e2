//! Fine lifecycle operations.

use std::collections::HashMap;

use chrono::Utc;
use serde_json::json;
use warden_shared::types::{DormId, FineId, FineRuleId, LedgerEntryId};

use crate::access::{AccessPolicy, ActorContext, Capability};
use crate::audit::AuditAction;
use crate::error::{EngineError, EngineResult};
use crate::fines::{
    CreateFineRuleInput, Fine, FineFilter, FineRule, FineSyncPlan, IssueFineInput,
    IssueFineOutcome, ReconcileReport, SyncStep, UpdateFineRuleInput, VoidFineOutcome,
    fine_charge_note,
};
use crate::ledger::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, non_negative_amount, optional_text, require_reason,
    required_text,
};
use crate::ledger::{EntryFilter, LedgerCategory, LedgerEntry, Posting, VoidInfo};
use crate::overrides::{ChangeSet, FieldPatch};
use crate::store::StoreError;

use super::Engine;

/// Ledger rows touched while applying a sync plan.
#[derive(Debug, Default, Clone, Copy)]
pub(super) struct SyncTally {
    pub posted: u64,
    pub patched: u64,
    pub voided: u64,
}

impl SyncTally {
    pub(super) const fn total(self) -> u64 {
        self.posted + self.patched + self.voided
    }
}

fn validate_points(points: i32) -> EngineResult<i32> {
    if points < 0 {
        return Err(EngineError::invalid("points must not be negative"));
    }
    Ok(points)
}

impl Engine {
    /// Issues a fine and posts its paired charge.
    ///
    /// If the charge cannot be written the fine still stands, flagged for
    /// reconciliation, and the outcome reports `ledger_synced = false`.
    pub async fn issue_fine(
        &self,
        actor: &ActorContext,
        input: IssueFineInput,
    ) -> EngineResult<IssueFineOutcome> {
        AccessPolicy::require(actor, Capability::ManageFines)?;

        let pesos = input
            .pesos
            .map(|value| non_negative_amount(value, "pesos"))
            .transpose()?;
        let points = input.points.map(validate_points).transpose()?;
        let note = optional_text(input.note.as_deref(), "note", MAX_NOTE_LEN)?;

        let occupant = self.postable_occupant(actor.dorm_id, input.occupant_id).await?;

        let rule = match input.rule_id {
            Some(rule_id) => {
                let rule = self.fine_rule(actor.dorm_id, rule_id).await?;
                if !rule.active {
                    return Err(EngineError::invalid("fine rule is inactive"));
                }
                Some(rule)
            }
            None => None,
        };

        let pesos = pesos
            .or_else(|| rule.as_ref().map(|r| r.default_pesos))
            .ok_or_else(|| EngineError::invalid("pesos is required when no rule is given"))?;
        let points = points
            .or_else(|| rule.as_ref().map(|r| r.default_points))
            .unwrap_or(0);

        let term = self.active_term(actor.dorm_id).await?;
        let now = Utc::now();

        let mut fine = Fine {
            id: FineId::new(),
            dorm_id: actor.dorm_id,
            occupant_id: occupant.id,
            term_id: Some(term.id),
            rule_id: rule.as_ref().map(|r| r.id),
            pesos,
            points,
            note,
            issued_by: actor.user_id,
            issued_at: now,
            void: None,
            needs_reconciliation: false,
        };
        self.store.insert_fine(&fine).await?;

        let charge_note = fine_charge_note(fine.note.as_deref(), rule.as_ref().map(|r| r.title.as_str()));
        let entry = fine_charge(actor, &fine, charge_note);

        let (entry, ledger_synced) = match self.store.insert_entry(&entry).await {
            Ok(()) => (Some(entry), true),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    fine_id = %fine.id,
                    occupant_id = %fine.occupant_id,
                    pesos = %fine.pesos,
                    "fine issued but its ledger charge could not be written"
                );
                self.flag_for_reconciliation(&mut fine).await;
                (None, false)
            }
        };

        tracing::info!(
            fine_id = %fine.id,
            occupant_id = %fine.occupant_id,
            pesos = %fine.pesos,
            ledger_synced,
            "fine issued"
        );
        self.record_audit(
            actor,
            AuditAction::FineIssue,
            "fine",
            fine.id.into_inner(),
            json!({
                "occupant_id": fine.occupant_id,
                "rule_id": fine.rule_id,
                "pesos": fine.pesos,
                "points": fine.points,
                "term_id": fine.term_id,
                "entry_id": entry.as_ref().map(|e| e.id),
                "ledger_synced": ledger_synced,
            }),
        )
        .await;

        Ok(IssueFineOutcome {
            fine,
            entry,
            ledger_synced,
        })
    }

    /// Voids a fine and every active entry linked to it.
    pub async fn void_fine(
        &self,
        actor: &ActorContext,
        fine_id: FineId,
        reason: &str,
    ) -> EngineResult<VoidFineOutcome> {
        AccessPolicy::require(actor, Capability::ManageFines)?;
        let reason = require_reason(reason)?;
        let mut fine = self.fine(actor.dorm_id, fine_id).await?;

        if !fine.is_active() {
            return Ok(VoidFineOutcome {
                fine,
                entries_voided: 0,
                ledger_synced: true,
                changed: false,
            });
        }

        let void = VoidInfo::now(actor.user_id, reason.clone());
        fine.void = Some(void.clone());
        self.store.update_fine(&fine).await?;

        let (entries_voided, ledger_synced) = match self
            .store
            .void_fine_entries(actor.dorm_id, fine.id, &void)
            .await
        {
            Ok(rows) => (rows, true),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    fine_id = %fine.id,
                    "fine voided but its ledger entries could not be voided"
                );
                self.flag_for_reconciliation(&mut fine).await;
                (0, false)
            }
        };

        tracing::info!(fine_id = %fine.id, entries_voided, ledger_synced, "fine voided");
        self.record_audit(
            actor,
            AuditAction::FineVoid,
            "fine",
            fine.id.into_inner(),
            json!({
                "reason": reason,
                "entries_voided": entries_voided,
                "ledger_synced": ledger_synced,
            }),
        )
        .await;

        Ok(VoidFineOutcome {
            fine,
            entries_voided,
            ledger_synced,
            changed: true,
        })
    }

    /// Lists fines of the dorm.
    pub async fn list_fines(&self, actor: &ActorContext, filter: &FineFilter) -> EngineResult<Vec<Fine>> {
        AccessPolicy::require(actor, Capability::ViewDorm)?;
        Ok(self.store.list_fines(actor.dorm_id, filter).await?)
    }

    /// Re-establishes the fine and charge pairing.
    ///
    /// Checks fines flagged `needs_reconciliation`, or every fine when `all`
    /// is set. A fine whose plan fails keeps its flag and is counted in
    /// `failures`.
    pub async fn reconcile_fines(&self, actor: &ActorContext, all: bool) -> EngineResult<ReconcileReport> {
        AccessPolicy::require(actor, Capability::Override)?;

        let filter = FineFilter {
            include_voided: true,
            needs_reconciliation: !all,
            ..FineFilter::default()
        };
        let fines = self.store.list_fines(actor.dorm_id, &filter).await?;
        let titles: HashMap<FineRuleId, String> = self
            .store
            .list_fine_rules(actor.dorm_id, true)
            .await?
            .into_iter()
            .map(|rule| (rule.id, rule.title))
            .collect();

        let mut report = ReconcileReport {
            fines_checked: fines.len(),
            ..ReconcileReport::default()
        };

        for mut fine in fines {
            let title = fine.rule_id.and_then(|id| titles.get(&id)).map(String::as_str);
            let note = fine_charge_note(fine.note.as_deref(), title);

            let tally = match self.sync_fine_ledger(actor, &fine, &note).await {
                Ok(tally) => tally,
                Err(e) => {
                    report.failures += 1;
                    tracing::error!(error = %e, fine_id = %fine.id, "fine reconciliation failed");
                    continue;
                }
            };

            let was_flagged = fine.needs_reconciliation;
            if was_flagged {
                fine.needs_reconciliation = false;
                if let Err(e) = self.store.update_fine(&fine).await {
                    report.failures += 1;
                    tracing::error!(error = %e, fine_id = %fine.id, "failed to clear reconciliation flag");
                    continue;
                }
            }

            if tally.total() == 0 && !was_flagged {
                continue;
            }
            if tally.total() > 0 {
                report.fines_repaired += 1;
            }
            report.charges_posted += tally.posted;
            report.charges_patched += tally.patched;
            report.entries_voided += tally.voided;

            self.record_audit(
                actor,
                AuditAction::FineReconcile,
                "fine",
                fine.id.into_inner(),
                json!({
                    "charges_posted": tally.posted,
                    "charges_patched": tally.patched,
                    "entries_voided": tally.voided,
                    "cleared_flag": was_flagged,
                }),
            )
            .await;
        }

        tracing::info!(
            fines_checked = report.fines_checked,
            fines_repaired = report.fines_repaired,
            failures = report.failures,
            "fine reconciliation finished"
        );
        Ok(report)
    }

    /// Computes and applies the ledger changes that pair `fine` with exactly
    /// one matching charge, or none when the fine is voided.
    pub(super) async fn sync_fine_ledger(
        &self,
        actor: &ActorContext,
        fine: &Fine,
        charge_note: &str,
    ) -> Result<SyncTally, StoreError> {
        let linked = self
            .query(actor.dorm_id, EntryFilter::for_fine(fine.id))
            .collect()
            .await?;
        let plan = FineSyncPlan::compute(fine, &linked, charge_note);

        let mut tally = SyncTally::default();
        for step in plan.steps {
            match step {
                SyncStep::PostCharge { note, .. } => {
                    let entry = fine_charge(actor, fine, note);
                    self.store.insert_entry(&entry).await?;
                    tally.posted += 1;
                }
                SyncStep::PatchCharge { entry_id, amount } => {
                    if self
                        .store
                        .update_entry_amount(actor.dorm_id, entry_id, amount)
                        .await?
                    {
                        tally.patched += 1;
                    }
                }
                SyncStep::VoidEntry { entry_id } => {
                    let void = VoidInfo::now(actor.user_id, "fine reconciliation");
                    tally.voided += self
                        .store
                        .void_entries(actor.dorm_id, &[entry_id], &void)
                        .await?;
                }
            }
        }
        Ok(tally)
    }

    /// Re-activates payments that were voided together with the fine under
    /// `stamp`. Returns the number of entries restored.
    pub(super) async fn revive_fine_payments(
        &self,
        actor: &ActorContext,
        fine: &Fine,
        stamp: &VoidInfo,
    ) -> Result<u64, StoreError> {
        let linked = self
            .query(actor.dorm_id, EntryFilter::for_fine(fine.id))
            .collect()
            .await?;

        let mut revived = 0;
        for entry_id in FineSyncPlan::payments_voided_with(fine.id, stamp, &linked) {
            if self.store.restore_entry(actor.dorm_id, entry_id).await? {
                revived += 1;
            }
        }
        Ok(revived)
    }

    /// Creates a fine rule.
    pub async fn create_fine_rule(
        &self,
        actor: &ActorContext,
        input: CreateFineRuleInput,
    ) -> EngineResult<FineRule> {
        AccessPolicy::require(actor, Capability::ManageFines)?;

        let rule = FineRule {
            id: FineRuleId::new(),
            dorm_id: actor.dorm_id,
            title: required_text(&input.title, "title", MAX_NAME_LEN)?,
            description: optional_text(input.description.as_deref(), "description", MAX_NOTE_LEN)?,
            severity: input.severity,
            default_pesos: non_negative_amount(input.default_pesos, "default_pesos")?,
            default_points: validate_points(input.default_points)?,
            active: true,
            created_at: Utc::now(),
        };
        self.store.insert_fine_rule(&rule).await?;

        tracing::info!(rule_id = %rule.id, title = %rule.title, "fine rule created");
        self.record_audit(
            actor,
            AuditAction::FineRuleCreate,
            "fine_rule",
            rule.id.into_inner(),
            json!({
                "title": rule.title,
                "severity": rule.severity,
                "default_pesos": rule.default_pesos,
                "default_points": rule.default_points,
            }),
        )
        .await;
        Ok(rule)
    }

    /// Updates the supplied fields of a fine rule. A blank description clears it.
    pub async fn update_fine_rule(
        &self,
        actor: &ActorContext,
        rule_id: FineRuleId,
        input: UpdateFineRuleInput,
    ) -> EngineResult<FineRule> {
        AccessPolicy::require(actor, Capability::ManageFines)?;
        let mut rule = self.fine_rule(actor.dorm_id, rule_id).await?;

        let title = input
            .title
            .as_deref()
            .map(|t| required_text(t, "title", MAX_NAME_LEN))
            .transpose()?;
        let description = match input.description.as_deref() {
            None => FieldPatch::Keep,
            Some(text) => optional_text(Some(text), "description", MAX_NOTE_LEN)?
                .map_or(FieldPatch::Clear, FieldPatch::Set),
        };
        let default_pesos = input
            .default_pesos
            .map(|v| non_negative_amount(v, "default_pesos"))
            .transpose()?;
        let default_points = input.default_points.map(validate_points).transpose()?;

        let mut changes = ChangeSet::new();
        if let Some(title) = changes.track("title", &rule.title, title) {
            rule.title = title;
        }
        if let Some(description) = changes.track_patch("description", &rule.description, description) {
            rule.description = description;
        }
        if let Some(severity) = changes.track("severity", &rule.severity, input.severity) {
            rule.severity = severity;
        }
        if let Some(pesos) = changes.track("default_pesos", &rule.default_pesos, default_pesos) {
            rule.default_pesos = pesos;
        }
        if let Some(points) = changes.track("default_points", &rule.default_points, default_points) {
            rule.default_points = points;
        }
        if let Some(active) = changes.track("active", &rule.active, input.active) {
            rule.active = active;
        }
        changes.require_changes()?;

        self.store.update_fine_rule(&rule).await?;
        tracing::info!(rule_id = %rule.id, fields = ?changes.fields(), "fine rule updated");
        self.record_audit(
            actor,
            AuditAction::FineRuleUpdate,
            "fine_rule",
            rule.id.into_inner(),
            changes.audit_metadata("fine rule update"),
        )
        .await;
        Ok(rule)
    }

    /// Soft-deletes a fine rule. Deactivating an inactive rule changes nothing.
    pub async fn deactivate_fine_rule(
        &self,
        actor: &ActorContext,
        rule_id: FineRuleId,
    ) -> EngineResult<FineRule> {
        AccessPolicy::require(actor, Capability::ManageFines)?;
        let rule = self.fine_rule(actor.dorm_id, rule_id).await?;
        if !rule.active {
            return Ok(rule);
        }
        let input = UpdateFineRuleInput {
            active: Some(false),
            ..UpdateFineRuleInput::default()
        };
        self.update_fine_rule(actor, rule_id, input).await
    }

    /// Lists fine rules ordered by title.
    pub async fn list_fine_rules(
        &self,
        actor: &ActorContext,
        include_inactive: bool,
    ) -> EngineResult<Vec<FineRule>> {
        AccessPolicy::require(actor, Capability::ViewDorm)?;
        Ok(self
            .store
            .list_fine_rules(actor.dorm_id, include_inactive)
            .await?)
    }

    pub(super) async fn fine_rule(&self, dorm_id: DormId, id: FineRuleId) -> EngineResult<FineRule> {
        self.store
            .get_fine_rule(dorm_id, id)
            .await?
            .ok_or_else(|| EngineError::not_found("fine rule"))
    }
}

/// Builds the `sa_fines` charge paired with a fine.
pub(super) fn fine_charge(actor: &ActorContext, fine: &Fine, note: String) -> LedgerEntry {
    LedgerEntry {
        id: LedgerEntryId::new(),
        dorm_id: fine.dorm_id,
        occupant_id: fine.occupant_id,
        term_id: fine.term_id,
        category: LedgerCategory::Fines,
        posting: Posting::Charge(fine.pesos),
        event_id: None,
        fine_id: Some(fine.id),
        note: Some(note),
        method: None,
        metadata: json!({}),
        posted_at: Utc::now(),
        created_by: Some(actor.user_id),
        void: None,
    }
}
