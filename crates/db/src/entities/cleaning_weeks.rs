//! `SeaORM` Entity for cleaning_weeks table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cleaning_weeks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub dorm_id: Uuid,
    pub week_start: Date,
    pub rest_level: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::cleaning_assignments::Entity")]
    CleaningAssignments,
}

impl Related<super::cleaning_assignments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CleaningAssignments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
