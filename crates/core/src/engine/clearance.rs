//! Dashboard and occupant reporting data.

use rust_decimal::Decimal;
use warden_shared::types::OccupantId;

use crate::access::{AccessPolicy, ActorContext, Capability};
use crate::clearance::{
    ClearanceAggregator, ClearanceOrder, ClearanceRow, DashboardStats, OccupantReport,
};
use crate::error::EngineResult;
use crate::fines::FineFilter;
use crate::ledger::{EntryFilter, sort_newest_first};

use super::Engine;

impl Engine {
    /// Dorm-wide totals and the clearance list, worst balance first.
    pub async fn dashboard_stats(&self, actor: &ActorContext) -> EngineResult<DashboardStats> {
        AccessPolicy::require(actor, Capability::ViewDorm)?;
        let term = self.active_term(actor.dorm_id).await?;

        let occupants = self.store.list_occupants(actor.dorm_id).await?;
        let entries = self.load_entries(actor.dorm_id, EntryFilter::default()).await?;
        let expenses = self.store.list_expenses(actor.dorm_id).await?;
        let fines = self
            .store
            .list_fines(
                actor.dorm_id,
                &FineFilter {
                    include_voided: true,
                    ..FineFilter::default()
                },
            )
            .await?;

        Ok(ClearanceAggregator::dashboard(
            &term, &occupants, &entries, &expenses, &fines,
        ))
    }

    /// The clearance list of active occupants in the requested order.
    pub async fn clearance_list(
        &self,
        actor: &ActorContext,
        order: ClearanceOrder,
    ) -> EngineResult<Vec<ClearanceRow>> {
        AccessPolicy::require(actor, Capability::ViewDorm)?;
        let term = self.active_term(actor.dorm_id).await?;

        let occupants = self.store.list_occupants(actor.dorm_id).await?;
        let entries = self.load_entries(actor.dorm_id, EntryFilter::default()).await?;

        Ok(ClearanceAggregator::clearance_list(
            &occupants, &entries, &term, order,
        ))
    }

    /// One occupant's term breakdown, entries, and fines.
    ///
    /// Staff may read any occupant; an occupant may read only their own data.
    pub async fn occupant_report(
        &self,
        actor: &ActorContext,
        occupant_id: OccupantId,
    ) -> EngineResult<OccupantReport> {
        let found = self.store.get_occupant(actor.dorm_id, occupant_id).await?;
        let occupant = AccessPolicy::viewable_occupant(actor, found)?;
        let term = self.active_term(actor.dorm_id).await?;

        let filter = EntryFilter {
            occupant_id: Some(occupant.id),
            ..EntryFilter::default()
        };
        let mut entries: Vec<_> = self
            .load_entries(actor.dorm_id, filter)
            .await?
            .into_iter()
            .filter(|entry| term.includes(entry))
            .collect();
        sort_newest_first(&mut entries);

        let breakdown = ClearanceAggregator::occupant_breakdown(&entries, occupant.id, &term);
        let balance = breakdown.total().balance;

        let fines = self
            .store
            .list_fines(
                actor.dorm_id,
                &FineFilter {
                    occupant_id: Some(occupant.id),
                    include_voided: true,
                    ..FineFilter::default()
                },
            )
            .await?
            .into_iter()
            .filter(|fine| term.includes_fine(fine))
            .collect();

        Ok(OccupantReport {
            occupant,
            term,
            breakdown,
            balance,
            is_cleared: balance <= Decimal::ZERO,
            entries,
            fines,
        })
    }
}
