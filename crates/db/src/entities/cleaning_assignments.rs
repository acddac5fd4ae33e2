//! `SeaORM` Entity for cleaning_assignments table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cleaning_assignments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub dorm_id: Uuid,
    pub week_id: Uuid,
    pub area: String,
    pub occupant_id: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cleaning_weeks::Entity",
        from = "Column::WeekId",
        to = "super::cleaning_weeks::Column::Id"
    )]
    CleaningWeeks,
}

impl Related<super::cleaning_weeks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CleaningWeeks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
