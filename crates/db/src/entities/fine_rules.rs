//! `SeaORM` Entity for fine_rules table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::FineSeverity;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "fine_rules")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub dorm_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub severity: FineSeverity,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub default_pesos: Decimal,
    pub default_points: i32,
    pub active: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::fines::Entity")]
    Fines,
}

impl Related<super::fines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Fines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
