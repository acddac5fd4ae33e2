//! The ledger and clearance engine.
//!
//! [`Engine`] is the single entry point for every operation. Each call takes
//! an explicit [`ActorContext`], checks permissions, validates input, and
//! talks to persistence through the [`Store`] port. Calls are independent:
//! nothing is cached between them, and the active term is resolved per call.
//!
//! # Partial failures
//!
//! Fine operations write the fine row and then its ledger rows as separate
//! statements. When the second write fails the operation still succeeds for
//! the fine, the failure is logged at `error`, the fine is flagged
//! `needs_reconciliation`, and the result reports `ledger_synced = false`.
//! [`Engine::reconcile_fines`] repairs flagged fines.
//!
//! Audit writes are best effort and never fail the mutation they describe.
//!
//! # Modules
//!
//! - `ledger` - Recording, voiding, and listing entries
//! - `fines` - Fine lifecycle, reconciliation, and fine rules
//! - `occupants` - Enrollment and occupant listing
//! - `clearance` - Dashboard and occupant reporting data
//! - `overrides` - Admin overrides and entry restore
//! - `reporting` - Reports, receipts, and the audit log

mod clearance;
mod fines;
mod ledger;
mod occupants;
mod overrides;
mod reporting;

#[cfg(test)]
mod fixtures;
#[cfg(test)]
mod scenario_tests;

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde_json::Value;
use uuid::Uuid;
use warden_shared::types::{DormId, FineId, LedgerEntryId, OccupantId};
use warden_shared::{LedgerConfig, ReceiptConfig};

use crate::access::ActorContext;
use crate::audit::{AuditAction, AuditEvent, AuditRecorder};
use crate::error::{EngineError, EngineResult};
use crate::fines::Fine;
use crate::ledger::{CategoryAliases, EntryFilter, EntryQuery, LedgerEntry};
use crate::occupants::{Occupant, OccupantStatus};
use crate::receipts::ReceiptComposer;
use crate::store::Store;
use crate::term::{ActiveTerm, TermResolver};

/// Orchestrates every ledger, fine, clearance, override, and report operation.
pub struct Engine {
    store: Arc<dyn Store>,
    aliases: CategoryAliases,
    receipts: ReceiptComposer,
    audit: AuditRecorder,
    dorm_name: String,
    auto_create_term: bool,
    page_size: u32,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("dorm_name", &self.dorm_name)
            .field("auto_create_term", &self.auto_create_term)
            .field("page_size", &self.page_size)
            .field("audit_failures", &self.audit.failures())
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Creates an engine over a store.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidInput` when a configured category alias
    /// points at an unknown ledger.
    pub fn new(
        store: Arc<dyn Store>,
        ledger: &LedgerConfig,
        receipts: &ReceiptConfig,
    ) -> EngineResult<Self> {
        Ok(Self {
            store,
            aliases: CategoryAliases::with_extra(&ledger.category_aliases)?,
            receipts: ReceiptComposer::new(receipts),
            audit: AuditRecorder::new(),
            dorm_name: receipts.dorm_name.clone(),
            auto_create_term: ledger.auto_create_term,
            page_size: ledger.page_size,
        })
    }

    /// The category alias table used to normalize ledger names.
    #[must_use]
    pub const fn categories(&self) -> &CategoryAliases {
        &self.aliases
    }

    /// Number of audit writes that failed since startup.
    #[must_use]
    pub fn audit_failures(&self) -> u64 {
        self.audit.failures()
    }

    /// Resolves the actor's active term, creating one when allowed.
    ///
    /// Idempotent: repeated calls within the same window return the same term.
    pub async fn ensure_active_term(&self, actor: &ActorContext) -> EngineResult<ActiveTerm> {
        self.active_term(actor.dorm_id).await
    }

    async fn active_term(&self, dorm_id: DormId) -> EngineResult<ActiveTerm> {
        TermResolver::ensure_active(
            self.store.as_ref(),
            dorm_id,
            today(),
            self.auto_create_term,
        )
        .await
    }

    fn query(&self, dorm_id: DormId, filter: EntryFilter) -> EntryQuery<'_> {
        EntryQuery::new(self.store.as_ref(), dorm_id, filter, self.page_size)
    }

    async fn load_entries(&self, dorm_id: DormId, filter: EntryFilter) -> EngineResult<Vec<LedgerEntry>> {
        Ok(self.query(dorm_id, filter).collect().await?)
    }

    async fn occupant(&self, dorm_id: DormId, id: OccupantId) -> EngineResult<Occupant> {
        self.store
            .get_occupant(dorm_id, id)
            .await?
            .ok_or_else(|| EngineError::not_found("occupant"))
    }

    /// Loads an occupant that may still receive postings.
    async fn postable_occupant(&self, dorm_id: DormId, id: OccupantId) -> EngineResult<Occupant> {
        let occupant = self.occupant(dorm_id, id).await?;
        if occupant.status == OccupantStatus::Removed {
            return Err(EngineError::invalid("occupant has been removed"));
        }
        Ok(occupant)
    }

    async fn entry(&self, dorm_id: DormId, id: LedgerEntryId) -> EngineResult<LedgerEntry> {
        self.store
            .get_entry(dorm_id, id)
            .await?
            .ok_or_else(|| EngineError::not_found("ledger entry"))
    }

    async fn fine(&self, dorm_id: DormId, id: FineId) -> EngineResult<Fine> {
        self.store
            .get_fine(dorm_id, id)
            .await?
            .ok_or_else(|| EngineError::not_found("fine"))
    }

    /// Marks a fine as out of sync with the ledger. Best effort.
    async fn flag_for_reconciliation(&self, fine: &mut Fine) {
        fine.needs_reconciliation = true;
        if let Err(e) = self.store.update_fine(fine).await {
            tracing::error!(
                error = %e,
                fine_id = %fine.id,
                "failed to flag fine for reconciliation"
            );
        }
    }

    async fn record_audit(
        &self,
        actor: &ActorContext,
        action: AuditAction,
        entity_type: &str,
        entity_id: Uuid,
        metadata: Value,
    ) {
        let event = AuditEvent::new(actor, action, entity_type, entity_id, metadata);
        self.audit.record(self.store.as_ref(), event).await;
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}
