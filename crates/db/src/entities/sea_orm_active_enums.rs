//! Postgres enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// `term_status` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "term_status")]
pub enum TermStatus {
    /// Created ahead of time.
    #[sea_orm(string_value = "planned")]
    Planned,
    /// In effect.
    #[sea_orm(string_value = "active")]
    Active,
    /// Closed.
    #[sea_orm(string_value = "archived")]
    Archived,
}

/// `occupant_status` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "occupant_status")]
pub enum OccupantStatus {
    /// Residing.
    #[sea_orm(string_value = "active")]
    Active,
    /// Moved out.
    #[sea_orm(string_value = "left")]
    Left,
    /// Removed by staff.
    #[sea_orm(string_value = "removed")]
    Removed,
}

/// `entry_type` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "entry_type")]
pub enum EntryType {
    /// Increases the balance.
    #[sea_orm(string_value = "charge")]
    Charge,
    /// Decreases the balance.
    #[sea_orm(string_value = "payment")]
    Payment,
}

/// `fine_severity` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "fine_severity")]
pub enum FineSeverity {
    /// Minor.
    #[sea_orm(string_value = "minor")]
    Minor,
    /// Major.
    #[sea_orm(string_value = "major")]
    Major,
    /// Grave.
    #[sea_orm(string_value = "grave")]
    Grave,
}

/// `expense_status` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "expense_status")]
pub enum ExpenseStatus {
    /// Awaiting approval.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Approved.
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Rejected.
    #[sea_orm(string_value = "rejected")]
    Rejected,
}
