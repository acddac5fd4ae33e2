//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `FineId` where a `LedgerEntryId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

typed_id!(UserId, "Unique identifier for an authenticated user.");
typed_id!(DormId, "Unique identifier for a dormitory.");
typed_id!(OccupantId, "Unique identifier for a dorm occupant.");
typed_id!(TermId, "Unique identifier for an academic term.");
typed_id!(LedgerEntryId, "Unique identifier for a ledger entry.");
typed_id!(FineId, "Unique identifier for a fine.");
typed_id!(FineRuleId, "Unique identifier for a fine rule.");
typed_id!(EventId, "Unique identifier for a dorm event.");
typed_id!(ExpenseId, "Unique identifier for an expense.");
typed_id!(
    CleaningAssignmentId,
    "Unique identifier for a cleaning assignment."
);
typed_id!(CleaningWeekId, "Unique identifier for a cleaning week.");
typed_id!(
    EvaluationScoreId,
    "Unique identifier for an evaluation score."
);
typed_id!(AuditEventId, "Unique identifier for an audit event.");
