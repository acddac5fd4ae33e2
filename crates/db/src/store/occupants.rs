use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder,
};
use warden_core::occupants::Occupant;
use warden_core::store::{OccupantStore, StoreResult};
use warden_shared::types::{DormId, OccupantId};

use super::{SeaStore, convert, store_err, update_err};
use crate::entities::occupants;

#[async_trait]
impl OccupantStore for SeaStore {
    async fn insert_occupant(&self, occupant: &Occupant) -> StoreResult<()> {
        convert::occupant_row(occupant)
            .into_active_model()
            .reset_all()
            .insert(&self.db)
            .await
            .map_err(store_err)?;
        Ok(())
    }

    async fn get_occupant(&self, dorm_id: DormId, id: OccupantId) -> StoreResult<Option<Occupant>> {
        let row = occupants::Entity::find_by_id(id.into_inner())
            .filter(occupants::Column::DormId.eq(dorm_id.into_inner()))
            .one(&self.db)
            .await
            .map_err(store_err)?;
        Ok(row.map(convert::occupant))
    }

    async fn list_occupants(&self, dorm_id: DormId) -> StoreResult<Vec<Occupant>> {
        let rows = occupants::Entity::find()
            .filter(occupants::Column::DormId.eq(dorm_id.into_inner()))
            .order_by_asc(occupants::Column::DisplayName)
            .order_by_asc(occupants::Column::Id)
            .all(&self.db)
            .await
            .map_err(store_err)?;
        Ok(rows.into_iter().map(convert::occupant).collect())
    }

    async fn update_occupant(&self, occupant: &Occupant) -> StoreResult<()> {
        convert::occupant_row(occupant)
            .into_active_model()
            .reset_all()
            .update(&self.db)
            .await
            .map_err(|e| update_err(e, "occupant"))?;
        Ok(())
    }
}
