use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};
use uuid::Uuid;
use warden_core::ledger::{
    EntryFilter, EntryType, LedgerCategory, LedgerEntry, PAYABLE_DEADLINE_KEY, VoidInfo,
};
use warden_core::store::{EntryStore, StoreResult};
use warden_shared::types::{
    Amount, DormId, EventId, FineId, LedgerEntryId, OccupantId, PageRequest,
};

use super::{SeaStore, convert, store_err};
use crate::entities::ledger_entries::{self, Column};

fn day_start(date: NaiveDate) -> DateTimeWithTimeZone {
    convert::tz(date.and_time(NaiveTime::MIN).and_utc())
}

impl SeaStore {
    /// Translates an entry filter into a `WHERE` clause.
    ///
    /// Date bounds are inclusive calendar days in UTC, matching
    /// [`EntryFilter::matches`].
    fn entry_condition(&self, dorm_id: DormId, filter: &EntryFilter) -> Condition {
        let mut cond = Condition::all().add(Column::DormId.eq(dorm_id.into_inner()));
        if let Some(id) = filter.occupant_id {
            cond = cond.add(Column::OccupantId.eq(id.into_inner()));
        }
        if let Some(id) = filter.term_id {
            cond = cond.add(Column::TermId.eq(id.into_inner()));
        }
        if let Some(category) = filter.category {
            cond = cond.add(Column::Ledger.is_in(self.aliases.names_for(category)));
        }
        if let Some(entry_type) = filter.entry_type {
            cond = cond.add(Column::EntryType.eq(convert::entry_type(entry_type)));
        }
        if let Some(from) = filter.from {
            cond = cond.add(Column::PostedAt.gte(day_start(from)));
        }
        if let Some(next_day) = filter.to.and_then(|to| to.succ_opt()) {
            cond = cond.add(Column::PostedAt.lt(day_start(next_day)));
        }
        if let Some(id) = filter.fine_id {
            cond = cond.add(Column::FineId.eq(id.into_inner()));
        }
        if let Some(id) = filter.event_id {
            cond = cond.add(Column::EventId.eq(id.into_inner()));
        }
        if !filter.include_voided {
            cond = cond.add(Column::VoidedAt.is_null());
        }
        cond
    }

    async fn void_where(&self, cond: Condition, void: &VoidInfo) -> StoreResult<u64> {
        let result = ledger_entries::Entity::update_many()
            .col_expr(Column::VoidedAt, Expr::value(convert::tz(void.voided_at)))
            .col_expr(Column::VoidedBy, Expr::value(void.voided_by.into_inner()))
            .col_expr(Column::VoidReason, Expr::value(void.reason.clone()))
            .filter(cond)
            .filter(Column::VoidedAt.is_null())
            .exec(&self.db)
            .await
            .map_err(store_err)?;
        Ok(result.rows_affected)
    }

    async fn reassign_where(&self, cond: Condition, occupant_id: OccupantId) -> StoreResult<u64> {
        let result = ledger_entries::Entity::update_many()
            .col_expr(Column::OccupantId, Expr::value(occupant_id.into_inner()))
            .filter(cond)
            .exec(&self.db)
            .await
            .map_err(store_err)?;
        Ok(result.rows_affected)
    }
}

#[async_trait]
impl EntryStore for SeaStore {
    async fn insert_entry(&self, entry: &LedgerEntry) -> StoreResult<()> {
        convert::entry_row(entry)
            .into_active_model()
            .reset_all()
            .insert(&self.db)
            .await
            .map_err(store_err)?;
        Ok(())
    }

    async fn get_entry(&self, dorm_id: DormId, id: LedgerEntryId) -> StoreResult<Option<LedgerEntry>> {
        ledger_entries::Entity::find_by_id(id.into_inner())
            .filter(Column::DormId.eq(dorm_id.into_inner()))
            .one(&self.db)
            .await
            .map_err(store_err)?
            .map(|row| convert::entry(row, &self.aliases))
            .transpose()
    }

    async fn fetch_entries(
        &self,
        dorm_id: DormId,
        filter: &EntryFilter,
        page: PageRequest,
    ) -> StoreResult<Vec<LedgerEntry>> {
        let rows = ledger_entries::Entity::find()
            .filter(self.entry_condition(dorm_id, filter))
            .order_by_desc(Column::PostedAt)
            .order_by_desc(Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(store_err)?;
        rows.into_iter()
            .map(|row| convert::entry(row, &self.aliases))
            .collect()
    }

    async fn count_entries(&self, dorm_id: DormId, filter: &EntryFilter) -> StoreResult<u64> {
        ledger_entries::Entity::find()
            .filter(self.entry_condition(dorm_id, filter))
            .count(&self.db)
            .await
            .map_err(store_err)
    }

    async fn void_entries(
        &self,
        dorm_id: DormId,
        ids: &[LedgerEntryId],
        void: &VoidInfo,
    ) -> StoreResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let ids: Vec<Uuid> = ids.iter().map(|id| id.into_inner()).collect();
        let cond = Condition::all()
            .add(Column::DormId.eq(dorm_id.into_inner()))
            .add(Column::Id.is_in(ids));
        self.void_where(cond, void).await
    }

    async fn void_fine_entries(
        &self,
        dorm_id: DormId,
        fine_id: FineId,
        void: &VoidInfo,
    ) -> StoreResult<u64> {
        let cond = Condition::all()
            .add(Column::DormId.eq(dorm_id.into_inner()))
            .add(Column::FineId.eq(fine_id.into_inner()));
        self.void_where(cond, void).await
    }

    async fn restore_entry(&self, dorm_id: DormId, id: LedgerEntryId) -> StoreResult<bool> {
        let result = ledger_entries::Entity::update_many()
            .col_expr(Column::VoidedAt, Expr::value(None::<DateTimeWithTimeZone>))
            .col_expr(Column::VoidedBy, Expr::value(None::<Uuid>))
            .col_expr(Column::VoidReason, Expr::value(None::<String>))
            .filter(Column::Id.eq(id.into_inner()))
            .filter(Column::DormId.eq(dorm_id.into_inner()))
            .filter(Column::VoidedAt.is_not_null())
            .exec(&self.db)
            .await
            .map_err(store_err)?;
        Ok(result.rows_affected > 0)
    }

    async fn update_entry_amount(
        &self,
        dorm_id: DormId,
        id: LedgerEntryId,
        amount: Amount,
    ) -> StoreResult<bool> {
        let Some(entry) = self.get_entry(dorm_id, id).await? else {
            return Ok(false);
        };
        let signed = entry.posting.with_amount(amount).signed();
        let result = ledger_entries::Entity::update_many()
            .col_expr(Column::Amount, Expr::value(signed))
            .filter(Column::Id.eq(id.into_inner()))
            .filter(Column::DormId.eq(dorm_id.into_inner()))
            .exec(&self.db)
            .await
            .map_err(store_err)?;
        Ok(result.rows_affected > 0)
    }

    async fn patch_fine_charges(
        &self,
        dorm_id: DormId,
        fine_id: FineId,
        amount: Amount,
        note: &str,
    ) -> StoreResult<u64> {
        let result = ledger_entries::Entity::update_many()
            .col_expr(Column::Amount, Expr::value(amount.value()))
            .col_expr(Column::Note, Expr::value(note.to_string()))
            .filter(Column::DormId.eq(dorm_id.into_inner()))
            .filter(Column::FineId.eq(fine_id.into_inner()))
            .filter(Column::EntryType.eq(convert::entry_type(EntryType::Charge)))
            .filter(Column::VoidedAt.is_null())
            .exec(&self.db)
            .await
            .map_err(store_err)?;
        Ok(result.rows_affected)
    }

    async fn reassign_entry(
        &self,
        dorm_id: DormId,
        id: LedgerEntryId,
        occupant_id: OccupantId,
    ) -> StoreResult<u64> {
        let cond = Condition::all()
            .add(Column::DormId.eq(dorm_id.into_inner()))
            .add(Column::Id.eq(id.into_inner()));
        self.reassign_where(cond, occupant_id).await
    }

    async fn reassign_fine_entries(
        &self,
        dorm_id: DormId,
        fine_id: FineId,
        occupant_id: OccupantId,
    ) -> StoreResult<u64> {
        let cond = Condition::all()
            .add(Column::DormId.eq(dorm_id.into_inner()))
            .add(Column::FineId.eq(fine_id.into_inner()));
        self.reassign_where(cond, occupant_id).await
    }

    async fn set_event_deadline(
        &self,
        dorm_id: DormId,
        event_id: EventId,
        deadline: Option<NaiveDate>,
    ) -> StoreResult<u64> {
        let metadata = match deadline {
            Some(date) => Expr::cust_with_values(
                "jsonb_set(metadata, ARRAY[$1], to_jsonb(CAST($2 AS text)))",
                [
                    PAYABLE_DEADLINE_KEY.to_string(),
                    date.format("%Y-%m-%d").to_string(),
                ],
            ),
            None => Expr::cust_with_values("metadata - $1", [PAYABLE_DEADLINE_KEY.to_string()]),
        };
        let result = ledger_entries::Entity::update_many()
            .col_expr(Column::Metadata, metadata)
            .filter(Column::DormId.eq(dorm_id.into_inner()))
            .filter(Column::EventId.eq(event_id.into_inner()))
            .filter(Column::Ledger.is_in(self.aliases.names_for(LedgerCategory::Contributions)))
            .filter(Column::EntryType.eq(convert::entry_type(EntryType::Charge)))
            .filter(Column::VoidedAt.is_null())
            .exec(&self.db)
            .await
            .map_err(store_err)?;
        Ok(result.rows_affected)
    }
}
