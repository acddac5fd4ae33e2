//! `SeaORM` Entity for fines table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "fines")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub dorm_id: Uuid,
    pub occupant_id: Uuid,
    pub term_id: Option<Uuid>,
    pub rule_id: Option<Uuid>,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub pesos: Decimal,
    pub points: i32,
    pub note: Option<String>,
    pub issued_by: Uuid,
    pub issued_at: DateTimeWithTimeZone,
    pub voided_at: Option<DateTimeWithTimeZone>,
    pub voided_by: Option<Uuid>,
    pub void_reason: Option<String>,
    pub needs_reconciliation: bool,
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
        belongs_to = "super::fine_rules::Entity",
        from = "Column::RuleId",
        to = "super::fine_rules::Column::Id"
    )]
    FineRules,
    #[sea_orm(has_many = "super::ledger_entries::Entity")]
    LedgerEntries,
}

impl Related<super::occupants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Occupants.def()
    }
}

impl Related<super::fine_rules::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FineRules.def()
    }
}

impl Related<super::ledger_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LedgerEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
