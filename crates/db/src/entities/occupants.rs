//! `SeaORM` Entity for occupants table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::OccupantStatus;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "occupants")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub dorm_id: Uuid,
    pub user_id: Option<Uuid>,
    pub display_name: String,
    pub student_id: Option<String>,
    pub email: Option<String>,
    pub status: OccupantStatus,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::dorms::Entity",
        from = "Column::DormId",
        to = "super::dorms::Column::Id"
    )]
    Dorms,
    #[sea_orm(has_many = "super::ledger_entries::Entity")]
    LedgerEntries,
    #[sea_orm(has_many = "super::fines::Entity")]
    Fines,
}

impl Related<super::dorms::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Dorms.def()
    }
}

impl Related<super::ledger_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LedgerEntries.def()
    }
}

impl Related<super::fines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Fines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
