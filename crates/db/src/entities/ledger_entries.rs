//! `SeaORM` Entity for ledger_entries table.
//!
//! `ledger` is free text: legacy rows carry alias names, which the store
//! normalizes on read. `amount` is signed (charges positive, payments negative).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::EntryType;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ledger_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub dorm_id: Uuid,
    pub occupant_id: Uuid,
    pub term_id: Option<Uuid>,
    pub ledger: String,
    pub entry_type: EntryType,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub amount: Decimal,
    pub event_id: Option<Uuid>,
    pub fine_id: Option<Uuid>,
    pub note: Option<String>,
    pub method: Option<String>,
    #[sea_orm(column_type = "JsonBinary")]
    pub metadata: Json,
    pub posted_at: DateTimeWithTimeZone,
    pub created_by: Option<Uuid>,
    pub voided_at: Option<DateTimeWithTimeZone>,
    pub voided_by: Option<Uuid>,
    pub void_reason: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::occupants::Entity",
        from = "Column::OccupantId",
        to = "super::occupants::Column::Id"
    )]
    Occupants,
    #[sea_orm(
        belongs_to = "super::terms::Entity",
        from = "Column::TermId",
        to = "super::terms::Column::Id"
    )]
    Terms,
    #[sea_orm(
        belongs_to = "super::fines::Entity",
        from = "Column::FineId",
        to = "super::fines::Column::Id"
    )]
    Fines,
    #[sea_orm(
        belongs_to = "super::events::Entity",
        from = "Column::EventId",
        to = "super::events::Column::Id"
    )]
    Events,
}

impl Related<super::occupants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Occupants.def()
    }
}

impl Related<super::terms::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Terms.def()
    }
}

impl Related<super::fines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Fines.def()
    }
}

impl Related<super::events::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Events.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
