//! Occupant types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use warden_shared::types::{DormId, OccupantId, UserId};

/// Residency status. Occupants are never hard-deleted while ledger history references them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OccupantStatus {
    /// Currently residing; appears on clearance lists.
    Active,
    /// Moved out.
    Left,
    /// Removed by staff; no new postings allowed.
    Removed,
}

impl OccupantStatus {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Left => "left",
            Self::Removed => "removed",
        }
    }

    /// Parses from string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "left" => Some(Self::Left),
            "removed" => Some(Self::Removed),
            _ => None,
        }
    }
}

impl std::fmt::Display for OccupantStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A dorm resident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupant {
    /// Occupant ID.
    pub id: OccupantId,
    /// Owning dorm.
    pub dorm_id: DormId,
    /// Linked user account, for self-service access.
    pub user_id: Option<UserId>,
    /// Display name.
    pub display_name: String,
    /// School-issued student number.
    pub student_id: Option<String>,
    /// Contact email, used as receipt recipient.
    pub email: Option<String>,
    /// Residency status.
    pub status: OccupantStatus,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl Occupant {
    /// Returns true for occupants in `active` status.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == OccupantStatus::Active
    }
}

/// Input for enrolling an occupant.
#[derive(Debug, Clone, Deserialize)]
pub struct EnrollOccupantInput {
    /// Display name.
    pub display_name: String,
    /// Student number.
    #[serde(default)]
    pub student_id: Option<String>,
    /// Contact email.
    #[serde(default)]
    pub email: Option<String>,
    /// Linked user account.
    #[serde(default)]
    pub user_id: Option<UserId>,
}
