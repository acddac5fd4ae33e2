//! Reports, receipt previews, and the audit log.

use chrono::Utc;
use warden_shared::types::LedgerEntryId;

use crate::access::{AccessPolicy, ActorContext, Capability};
use crate::audit::{AuditEvent, AuditFilter};
use crate::error::{EngineError, EngineResult};
use crate::fines::FineFilter;
use crate::ledger::{EntryFilter, LedgerCategory};
use crate::receipts::ReceiptDraft;
use crate::reports::{ReportContext, ReportData, ReportError, ReportFilter, ReportKey, ReportService, Workbook};

use super::Engine;

const DEFAULT_AUDIT_LIMIT: u32 = 100;
const MAX_AUDIT_LIMIT: u32 = 1000;

impl Engine {
    /// Generates a report workbook.
    ///
    /// Without a date range the report covers the active term. The occupant
    /// statement requires an occupant, and occupants may only request their own.
    pub async fn generate_report(
        &self,
        actor: &ActorContext,
        key: ReportKey,
        filter: ReportFilter,
    ) -> EngineResult<Workbook> {
        AccessPolicy::require(actor, Capability::Report(key))?;
        filter.validate()?;

        if key == ReportKey::OccupantStatement {
            let occupant_id = filter
                .occupant_id
                .ok_or(ReportError::OccupantRequired(key.as_str()))?;
            let found = self.store.get_occupant(actor.dorm_id, occupant_id).await?;
            AccessPolicy::viewable_occupant(actor, found)?;
        } else if let Some(occupant_id) = filter.occupant_id {
            self.occupant(actor.dorm_id, occupant_id).await?;
        }

        let mut filter = filter;
        if filter.from.is_none() && filter.to.is_none() {
            let term = self.active_term(actor.dorm_id).await?;
            filter.from = Some(term.starts_on);
            filter.to = Some(term.ends_on);
        }

        let data = self.report_data(actor, key, &filter).await?;
        let context = ReportContext {
            dorm_id: actor.dorm_id,
            dorm_name: self.dorm_name.clone(),
            generated_at: Utc::now(),
        };
        let workbook = ReportService::build(key, &context, &filter, &data)?;

        tracing::info!(
            report = %key,
            dorm_id = %actor.dorm_id,
            sheets = workbook.sheets.len(),
            "report generated"
        );
        Ok(workbook)
    }

    async fn report_data(
        &self,
        actor: &ActorContext,
        key: ReportKey,
        filter: &ReportFilter,
    ) -> EngineResult<ReportData> {
        let dorm_id = actor.dorm_id;
        let category = match key {
            ReportKey::FinesLedger => Some(LedgerCategory::Fines),
            ReportKey::MaintenanceLedger => Some(LedgerCategory::Maintenance),
            ReportKey::EventContributions => Some(LedgerCategory::Contributions),
            ReportKey::OccupantStatement | ReportKey::EvaluationRankings => None,
        };

        let mut data = ReportData {
            occupants: self.store.list_occupants(dorm_id).await?,
            ..ReportData::default()
        };

        if key != ReportKey::EvaluationRankings {
            let entry_filter = EntryFilter {
                occupant_id: filter.occupant_id,
                category,
                from: filter.from,
                to: filter.to,
                ..EntryFilter::default()
            };
            data.entries = self.load_entries(dorm_id, entry_filter).await?;
        }

        match key {
            ReportKey::FinesLedger | ReportKey::OccupantStatement => {
                let fine_filter = FineFilter {
                    occupant_id: filter.occupant_id,
                    include_voided: true,
                    ..FineFilter::default()
                };
                data.fines = self.store.list_fines(dorm_id, &fine_filter).await?;
                data.rules = self.store.list_fine_rules(dorm_id, true).await?;
            }
            ReportKey::EventContributions => {
                data.events = self.store.list_events(dorm_id).await?;
            }
            ReportKey::EvaluationRankings => {
                data.scores = self.store.list_evaluation_scores(dorm_id).await?;
            }
            ReportKey::MaintenanceLedger => {}
        }

        Ok(data)
    }

    /// Drafts a receipt for an active payment without touching the ledger.
    pub async fn preview_receipt(
        &self,
        actor: &ActorContext,
        entry_id: LedgerEntryId,
    ) -> EngineResult<ReceiptDraft> {
        let entry = self.entry(actor.dorm_id, entry_id).await?;
        AccessPolicy::require(actor, Capability::Post(entry.category))?;
        let occupant = self.occupant(actor.dorm_id, entry.occupant_id).await?;
        self.receipts.compose(&entry, &occupant)
    }

    /// Lists audit events, newest first.
    pub async fn audit_log(
        &self,
        actor: &ActorContext,
        filter: AuditFilter,
    ) -> EngineResult<Vec<AuditEvent>> {
        AccessPolicy::require(actor, Capability::Override)?;
        let limit = filter.limit.unwrap_or(DEFAULT_AUDIT_LIMIT);
        if limit == 0 {
            return Err(EngineError::invalid("limit must be at least 1"));
        }
        let filter = AuditFilter {
            limit: Some(limit.min(MAX_AUDIT_LIMIT)),
            ..filter
        };
        Ok(self.store.list_audit(actor.dorm_id, &filter).await?)
    }
}
