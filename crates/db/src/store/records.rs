use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder,
};
use warden_core::records::{CleaningAssignment, CleaningWeek, EvaluationScore, Event, Expense};
use warden_core::store::{RecordStore, StoreResult};
use warden_shared::types::{
    CleaningAssignmentId, CleaningWeekId, DormId, EvaluationScoreId, EventId,
};

use super::{SeaStore, convert, store_err, update_err};
use crate::entities::{cleaning_assignments, cleaning_weeks, evaluation_scores, events, expenses};

#[async_trait]
impl RecordStore for SeaStore {
    async fn list_expenses(&self, dorm_id: DormId) -> StoreResult<Vec<Expense>> {
        let rows = expenses::Entity::find()
            .filter(expenses::Column::DormId.eq(dorm_id.into_inner()))
            .order_by_asc(expenses::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(store_err)?;
        rows.into_iter().map(convert::expense).collect()
    }

    async fn get_event(&self, dorm_id: DormId, id: EventId) -> StoreResult<Option<Event>> {
        let row = events::Entity::find_by_id(id.into_inner())
            .filter(events::Column::DormId.eq(dorm_id.into_inner()))
            .one(&self.db)
            .await
            .map_err(store_err)?;
        Ok(row.map(convert::event))
    }

    async fn list_events(&self, dorm_id: DormId) -> StoreResult<Vec<Event>> {
        let rows = events::Entity::find()
            .filter(events::Column::DormId.eq(dorm_id.into_inner()))
            .order_by_asc(events::Column::StartsAt)
            .all(&self.db)
            .await
            .map_err(store_err)?;
        Ok(rows.into_iter().map(convert::event).collect())
    }

    async fn update_event(&self, event: &Event) -> StoreResult<()> {
        convert::event_row(event)
            .into_active_model()
            .reset_all()
            .update(&self.db)
            .await
            .map_err(|e| update_err(e, "event"))?;
        Ok(())
    }

    async fn get_cleaning_week(
        &self,
        dorm_id: DormId,
        id: CleaningWeekId,
    ) -> StoreResult<Option<CleaningWeek>> {
        let row = cleaning_weeks::Entity::find_by_id(id.into_inner())
            .filter(cleaning_weeks::Column::DormId.eq(dorm_id.into_inner()))
            .one(&self.db)
            .await
            .map_err(store_err)?;
        Ok(row.map(convert::cleaning_week))
    }

    async fn update_cleaning_week(&self, week: &CleaningWeek) -> StoreResult<()> {
        convert::cleaning_week_row(week)
            .into_active_model()
            .reset_all()
            .update(&self.db)
            .await
            .map_err(|e| update_err(e, "cleaning week"))?;
        Ok(())
    }

    async fn get_cleaning_assignment(
        &self,
        dorm_id: DormId,
        id: CleaningAssignmentId,
    ) -> StoreResult<Option<CleaningAssignment>> {
        let row = cleaning_assignments::Entity::find_by_id(id.into_inner())
            .filter(cleaning_assignments::Column::DormId.eq(dorm_id.into_inner()))
            .one(&self.db)
            .await
            .map_err(store_err)?;
        Ok(row.map(convert::cleaning_assignment))
    }

    async fn update_cleaning_assignment(
        &self,
        assignment: &CleaningAssignment,
    ) -> StoreResult<()> {
        convert::cleaning_assignment_row(assignment)
            .into_active_model()
            .reset_all()
            .update(&self.db)
            .await
            .map_err(|e| update_err(e, "cleaning assignment"))?;
        Ok(())
    }

    async fn get_evaluation_score(
        &self,
        dorm_id: DormId,
        id: EvaluationScoreId,
    ) -> StoreResult<Option<EvaluationScore>> {
        let row = evaluation_scores::Entity::find_by_id(id.into_inner())
            .filter(evaluation_scores::Column::DormId.eq(dorm_id.into_inner()))
            .one(&self.db)
            .await
            .map_err(store_err)?;
        Ok(row.map(convert::evaluation_score))
    }

    async fn list_evaluation_scores(&self, dorm_id: DormId) -> StoreResult<Vec<EvaluationScore>> {
        let rows = evaluation_scores::Entity::find()
            .filter(evaluation_scores::Column::DormId.eq(dorm_id.into_inner()))
            .order_by_asc(evaluation_scores::Column::RecordedAt)
            .all(&self.db)
            .await
            .map_err(store_err)?;
        Ok(rows.into_iter().map(convert::evaluation_score).collect())
    }

    async fn update_evaluation_score(&self, score: &EvaluationScore) -> StoreResult<()> {
        convert::evaluation_score_row(score)
            .into_active_model()
            .reset_all()
            .update(&self.db)
            .await
            .map_err(|e| update_err(e, "evaluation score"))?;
        Ok(())
    }
}
