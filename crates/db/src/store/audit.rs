use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder,
    QuerySelect,
};
use warden_core::audit::{AuditEvent, AuditFilter};
use warden_core::store::{AuditStore, StoreResult};
use warden_shared::types::DormId;

use super::{SeaStore, convert, store_err};
use crate::entities::audit_events::{self, Column};

#[async_trait]
impl AuditStore for SeaStore {
    async fn append_audit(&self, event: &AuditEvent) -> StoreResult<()> {
        convert::audit_row(event)
            .into_active_model()
            .reset_all()
            .insert(&self.db)
            .await
            .map_err(store_err)?;
        Ok(())
    }

    async fn list_audit(&self, dorm_id: DormId, filter: &AuditFilter) -> StoreResult<Vec<AuditEvent>> {
        let mut query = audit_events::Entity::find().filter(Column::DormId.eq(dorm_id.into_inner()));
        if let Some(entity_type) = &filter.entity_type {
            query = query.filter(Column::EntityType.eq(entity_type.clone()));
        }
        if let Some(id) = filter.entity_id {
            query = query.filter(Column::EntityId.eq(id));
        }
        if let Some(action) = filter.action {
            query = query.filter(Column::Action.eq(action.as_str()));
        }
        if let Some(limit) = filter.limit {
            query = query.limit(u64::from(limit));
        }

        let rows = query
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .all(&self.db)
            .await
            .map_err(store_err)?;
        rows.into_iter().map(convert::audit_event).collect()
    }
}
