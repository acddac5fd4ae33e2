//! Ledger entry operations.

use chrono::Utc;
use serde_json::json;
use warden_shared::types::{LedgerEntryId, PageRequest, PageResponse};

use crate::access::{AccessPolicy, ActorContext, Capability};
use crate::audit::AuditAction;
use crate::error::{EngineError, EngineResult};
use crate::ledger::{
    EntryFilter, EntryQuery, EntryType, LedgerEntry, RecordEntryInput, VoidEntryOutcome,
    VoidInfo, validate_record, validation::require_reason,
};

use super::Engine;

impl Engine {
    /// Records a charge or payment for an occupant in the active term.
    pub async fn record_transaction(
        &self,
        actor: &ActorContext,
        input: RecordEntryInput,
    ) -> EngineResult<LedgerEntry> {
        AccessPolicy::require(actor, Capability::Post(input.category))?;
        let validated = validate_record(&input)?;

        let occupant = self.postable_occupant(actor.dorm_id, input.occupant_id).await?;

        if let Some(fine_id) = input.fine_id {
            let fine = self.fine(actor.dorm_id, fine_id).await?;
            if fine.occupant_id != occupant.id {
                return Err(EngineError::invalid("fine belongs to another occupant"));
            }
            if !fine.is_active() {
                return Err(EngineError::invalid("fine is voided"));
            }
        }
        if let Some(event_id) = input.event_id {
            self.store
                .get_event(actor.dorm_id, event_id)
                .await?
                .ok_or_else(|| EngineError::not_found("event"))?;
        }

        let term = self.active_term(actor.dorm_id).await?;

        let entry = LedgerEntry {
            id: LedgerEntryId::new(),
            dorm_id: actor.dorm_id,
            occupant_id: occupant.id,
            term_id: Some(term.id),
            category: input.category,
            posting: validated.posting,
            event_id: input.event_id,
            fine_id: input.fine_id,
            note: validated.note,
            method: validated.method,
            metadata: validated.metadata,
            posted_at: Utc::now(),
            created_by: Some(actor.user_id),
            void: None,
        };
        self.store.insert_entry(&entry).await?;

        tracing::info!(
            entry_id = %entry.id,
            occupant_id = %entry.occupant_id,
            category = %entry.category,
            entry_type = %entry.entry_type(),
            amount = %entry.amount(),
            "ledger entry recorded"
        );
        self.record_audit(
            actor,
            AuditAction::LedgerRecord,
            "ledger_entry",
            entry.id.into_inner(),
            json!({
                "occupant_id": entry.occupant_id,
                "category": entry.category,
                "entry_type": entry.entry_type(),
                "amount": entry.amount(),
                "term_id": entry.term_id,
                "fine_id": entry.fine_id,
                "event_id": entry.event_id,
            }),
        )
        .await;

        Ok(entry)
    }

    /// Voids an entry. Voiding an already voided entry changes nothing.
    ///
    /// The charge paired with an active fine cannot be voided directly;
    /// voiding the fine voids it.
    pub async fn void_entry(
        &self,
        actor: &ActorContext,
        entry_id: LedgerEntryId,
        reason: &str,
    ) -> EngineResult<VoidEntryOutcome> {
        let reason = require_reason(reason)?;
        let mut entry = self.entry(actor.dorm_id, entry_id).await?;
        AccessPolicy::require(actor, Capability::Post(entry.category))?;

        if !entry.is_active() {
            return Ok(VoidEntryOutcome {
                entry,
                changed: false,
            });
        }

        if let (Some(fine_id), EntryType::Charge) = (entry.fine_id, entry.entry_type()) {
            let fine = self.fine(actor.dorm_id, fine_id).await?;
            if fine.is_active() {
                return Err(EngineError::invalid(
                    "this charge belongs to an active fine; void the fine instead",
                ));
            }
        }

        let void = VoidInfo::now(actor.user_id, reason.clone());
        let changed = self
            .store
            .void_entries(actor.dorm_id, &[entry.id], &void)
            .await?
            > 0;

        if changed {
            entry.void = Some(void);
            tracing::info!(entry_id = %entry.id, "ledger entry voided");
            self.record_audit(
                actor,
                AuditAction::LedgerVoid,
                "ledger_entry",
                entry.id.into_inner(),
                json!({
                    "reason": reason,
                    "category": entry.category,
                    "entry_type": entry.entry_type(),
                    "amount": entry.amount(),
                }),
            )
            .await;
        } else {
            entry = self.entry(actor.dorm_id, entry_id).await?;
        }

        Ok(VoidEntryOutcome { entry, changed })
    }

    /// Returns one page of entries, newest first.
    pub async fn list_entries(
        &self,
        actor: &ActorContext,
        filter: &EntryFilter,
        page: PageRequest,
    ) -> EngineResult<PageResponse<LedgerEntry>> {
        AccessPolicy::require(actor, Capability::ViewDorm)?;
        let page = page.clamped();
        let total = self.store.count_entries(actor.dorm_id, filter).await?;
        let rows = self
            .store
            .fetch_entries(actor.dorm_id, filter, page)
            .await?;
        Ok(PageResponse::new(rows, page, total))
    }

    /// Returns a lazy, restartable query over every matching entry.
    pub fn entry_query(
        &self,
        actor: &ActorContext,
        filter: EntryFilter,
    ) -> EngineResult<EntryQuery<'_>> {
        AccessPolicy::require(actor, Capability::ViewDorm)?;
        Ok(self.query(actor.dorm_id, filter))
    }
}
