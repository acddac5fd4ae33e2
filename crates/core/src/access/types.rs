//! Roles and actor context.

use serde::{Deserialize, Serialize};
use warden_shared::types::{DormId, UserId};

/// Roles an actor can hold within a dorm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full administrative access, including overrides.
    Admin,
    /// Dorm adviser.
    Adviser,
    /// Assistant adviser; handles maintenance fees.
    AssistantAdviser,
    /// Student assistant; handles fines.
    StudentAssistant,
    /// Dorm treasurer; handles contributions.
    Treasurer,
    /// Dorm officer; handles contributions.
    Officer,
    /// Event officer; handles contributions.
    EventOfficer,
    /// A resident. Self-service access only.
    Occupant,
}

impl Role {
    /// All roles, in privilege order.
    pub const ALL: [Self; 8] = [
        Self::Admin,
        Self::Adviser,
        Self::AssistantAdviser,
        Self::StudentAssistant,
        Self::Treasurer,
        Self::Officer,
        Self::EventOfficer,
        Self::Occupant,
    ];

    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Adviser => "adviser",
            Self::AssistantAdviser => "assistant_adviser",
            Self::StudentAssistant => "student_assistant",
            Self::Treasurer => "treasurer",
            Self::Officer => "officer",
            Self::EventOfficer => "event_officer",
            Self::Occupant => "occupant",
        }
    }

    /// Parses from string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.as_str() == s)
    }

    /// Returns true for any role other than `occupant`.
    #[must_use]
    pub const fn is_staff(&self) -> bool {
        !matches!(self, Self::Occupant)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The authenticated actor performing an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorContext {
    /// The acting user.
    pub user_id: UserId,
    /// The dorm every read and write is scoped to.
    pub dorm_id: DormId,
    /// The actor's role in that dorm.
    pub role: Role,
}

impl ActorContext {
    /// Creates an actor context.
    #[must_use]
    pub const fn new(user_id: UserId, dorm_id: DormId, role: Role) -> Self {
        Self {
            user_id,
            dorm_id,
            role,
        }
    }
}
