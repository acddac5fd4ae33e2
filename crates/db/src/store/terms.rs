use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbBackend, EntityTrait, QueryFilter, QueryOrder, Statement,
};
use uuid::Uuid;
use warden_core::store::{StoreError, StoreResult, TermStore};
use warden_core::term::{Term, TermWindow};
use warden_shared::types::DormId;

use super::{SeaStore, convert, store_err};
use crate::entities::{sea_orm_active_enums::TermStatus, terms};

/// Calls the function installed by the second migration. It returns the
/// existing active term or inserts one, resolving races on the partial
/// unique index.
const ENSURE_ACTIVE_TERM_SQL: &str =
    "SELECT ensure_active_semester($1, $2, $3, $4) AS id";

#[async_trait]
impl TermStore for SeaStore {
    async fn active_term(&self, dorm_id: DormId) -> StoreResult<Option<Term>> {
        let row = terms::Entity::find()
            .filter(terms::Column::DormId.eq(dorm_id.into_inner()))
            .filter(terms::Column::Status.eq(TermStatus::Active))
            .one(&self.db)
            .await
            .map_err(store_err)?;
        Ok(row.map(convert::term))
    }

    async fn ensure_active_term(&self, dorm_id: DormId, window: &TermWindow) -> StoreResult<Term> {
        let statement = Statement::from_sql_and_values(
            DbBackend::Postgres,
            ENSURE_ACTIVE_TERM_SQL,
            [
                dorm_id.into_inner().into(),
                window.label.clone().into(),
                window.starts_on.into(),
                window.ends_on.into(),
            ],
        );
        let row = self
            .db
            .query_one(statement)
            .await
            .map_err(store_err)?
            .ok_or_else(|| StoreError::Database("ensure_active_semester returned no row".into()))?;
        let id: Uuid = row.try_get("", "id").map_err(store_err)?;

        let term = terms::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(store_err)?
            .ok_or_else(|| StoreError::Conflict(format!("term {id} vanished after activation")))?;
        Ok(convert::term(term))
    }

    async fn list_terms(&self, dorm_id: DormId) -> StoreResult<Vec<Term>> {
        let rows = terms::Entity::find()
            .filter(terms::Column::DormId.eq(dorm_id.into_inner()))
            .order_by_desc(terms::Column::StartsOn)
            .all(&self.db)
            .await
            .map_err(store_err)?;
        Ok(rows.into_iter().map(convert::term).collect())
    }
}
