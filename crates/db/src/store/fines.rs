use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder,
};
use warden_core::fines::{Fine, FineFilter, FineRule};
use warden_core::store::{FineStore, StoreResult};
use warden_shared::types::{DormId, FineId, FineRuleId};

use super::{SeaStore, convert, store_err, update_err};
use crate::entities::{fine_rules, fines};

#[async_trait]
impl FineStore for SeaStore {
    async fn insert_fine(&self, fine: &Fine) -> StoreResult<()> {
        convert::fine_row(fine)
            .into_active_model()
            .reset_all()
            .insert(&self.db)
            .await
            .map_err(store_err)?;
        Ok(())
    }

    async fn get_fine(&self, dorm_id: DormId, id: FineId) -> StoreResult<Option<Fine>> {
        fines::Entity::find_by_id(id.into_inner())
            .filter(fines::Column::DormId.eq(dorm_id.into_inner()))
            .one(&self.db)
            .await
            .map_err(store_err)?
            .map(convert::fine)
            .transpose()
    }

    async fn list_fines(&self, dorm_id: DormId, filter: &FineFilter) -> StoreResult<Vec<Fine>> {
        let mut query = fines::Entity::find().filter(fines::Column::DormId.eq(dorm_id.into_inner()));
        if let Some(id) = filter.occupant_id {
            query = query.filter(fines::Column::OccupantId.eq(id.into_inner()));
        }
        if let Some(id) = filter.term_id {
            query = query.filter(fines::Column::TermId.eq(id.into_inner()));
        }
        if !filter.include_voided {
            query = query.filter(fines::Column::VoidedAt.is_null());
        }
        if filter.needs_reconciliation {
            query = query.filter(fines::Column::NeedsReconciliation.eq(true));
        }

        let rows = query
            .order_by_desc(fines::Column::IssuedAt)
            .order_by_desc(fines::Column::Id)
            .all(&self.db)
            .await
            .map_err(store_err)?;
        rows.into_iter().map(convert::fine).collect()
    }

    async fn update_fine(&self, fine: &Fine) -> StoreResult<()> {
        convert::fine_row(fine)
            .into_active_model()
            .reset_all()
            .update(&self.db)
            .await
            .map_err(|e| update_err(e, "fine"))?;
        Ok(())
    }

    async fn insert_fine_rule(&self, rule: &FineRule) -> StoreResult<()> {
        convert::fine_rule_row(rule)
            .into_active_model()
            .reset_all()
            .insert(&self.db)
            .await
            .map_err(store_err)?;
        Ok(())
    }

    async fn get_fine_rule(&self, dorm_id: DormId, id: FineRuleId) -> StoreResult<Option<FineRule>> {
        fine_rules::Entity::find_by_id(id.into_inner())
            .filter(fine_rules::Column::DormId.eq(dorm_id.into_inner()))
            .one(&self.db)
            .await
            .map_err(store_err)?
            .map(convert::fine_rule)
            .transpose()
    }

    async fn list_fine_rules(
        &self,
        dorm_id: DormId,
        include_inactive: bool,
    ) -> StoreResult<Vec<FineRule>> {
        let mut query =
            fine_rules::Entity::find().filter(fine_rules::Column::DormId.eq(dorm_id.into_inner()));
        if !include_inactive {
            query = query.filter(fine_rules::Column::Active.eq(true));
        }
        let rows = query
            .order_by_asc(fine_rules::Column::Title)
            .all(&self.db)
            .await
            .map_err(store_err)?;
        rows.into_iter().map(convert::fine_rule).collect()
    }

    async fn update_fine_rule(&self, rule: &FineRule) -> StoreResult<()> {
        convert::fine_rule_row(rule)
            .into_active_model()
            .reset_all()
            .update(&self.db)
            .await
            .map_err(|e| update_err(e, "fine rule"))?;
        Ok(())
    }
}
