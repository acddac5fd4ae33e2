//! Role permissions per capability.

use crate::error::{EngineError, EngineResult};
use crate::ledger::LedgerCategory;
use crate::occupants::Occupant;
use crate::reports::ReportKey;

use super::types::{ActorContext, Role};

/// Something an actor may be allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Record, void, or preview receipts for entries of a ledger category.
    Post(LedgerCategory),
    /// Issue and void fines, manage fine rules.
    ManageFines,
    /// Read dorm-wide ledger, fine, and dashboard data.
    ViewDorm,
    /// Enroll new occupants.
    EnrollOccupants,
    /// Privileged overrides, entry restore, fine reconciliation, audit log.
    Override,
    /// Generate a report.
    Report(ReportKey),
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Post(category) => write!(f, "post to the {} ledger", category.as_str()),
            Self::ManageFines => write!(f, "manage fines"),
            Self::ViewDorm => write!(f, "view dorm records"),
            Self::EnrollOccupants => write!(f, "enroll occupants"),
            Self::Override => write!(f, "perform overrides"),
            Self::Report(key) => write!(f, "generate the {} report", key.as_str()),
        }
    }
}

/// Static role table.
pub struct AccessPolicy;

impl AccessPolicy {
    /// Returns true if `role` holds `capability`.
    #[must_use]
    pub fn allows(role: Role, capability: Capability) -> bool {
        use Role::{
            Admin, Adviser, AssistantAdviser, EventOfficer, Occupant, Officer, StudentAssistant,
            Treasurer,
        };

        match capability {
            Capability::Post(LedgerCategory::Maintenance) | Capability::EnrollOccupants => {
                matches!(role, Admin | Adviser | AssistantAdviser)
            }
            Capability::Post(LedgerCategory::Fines) | Capability::ManageFines => {
                matches!(role, Admin | Adviser | StudentAssistant)
            }
            Capability::Post(LedgerCategory::Contributions) => {
                matches!(role, Admin | Adviser | Treasurer | Officer | EventOfficer)
            }
            Capability::ViewDorm => !matches!(role, Occupant),
            Capability::Override => matches!(role, Admin),
            Capability::Report(key) => key.allows(role),
        }
    }

    /// Fails with `Forbidden` unless the actor holds `capability`.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Forbidden` naming the denied capability.
    pub fn require(actor: &ActorContext, capability: Capability) -> EngineResult<()> {
        if Self::allows(actor.role, capability) {
            Ok(())
        } else {
            Err(EngineError::Forbidden(format!(
                "role {} may not {capability}",
                actor.role
            )))
        }
    }

    /// Staff may view any occupant; an occupant may view only the record linked to their own user.
    ///
    /// Takes the lookup result so an occupant cannot tell a missing record
    /// from someone else's.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotFound` to staff for a missing record and
    /// `EngineError::Forbidden` to an occupant for anything but their own.
    pub fn viewable_occupant(
        actor: &ActorContext,
        occupant: Option<Occupant>,
    ) -> EngineResult<Occupant> {
        match occupant {
            Some(occupant)
                if actor.role.is_staff() || occupant.user_id == Some(actor.user_id) =>
            {
                Ok(occupant)
            }
            None if actor.role.is_staff() => Err(EngineError::not_found("occupant")),
            _ => Err(EngineError::Forbidden(
                "occupants may only view their own records".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use warden_shared::types::{DormId, UserId};

    #[rstest]
    #[case(Role::Admin, true)]
    #[case(Role::Adviser, true)]
    #[case(Role::StudentAssistant, true)]
    #[case(Role::AssistantAdviser, false)]
    #[case(Role::Treasurer, false)]
    #[case(Role::Occupant, false)]
    fn test_manage_fines(#[case] role: Role, #[case] allowed: bool) {
        assert_eq!(AccessPolicy::allows(role, Capability::ManageFines), allowed);
    }

    #[rstest]
    #[case(LedgerCategory::Maintenance, Role::AssistantAdviser, true)]
    #[case(LedgerCategory::Maintenance, Role::Treasurer, false)]
    #[case(LedgerCategory::Fines, Role::StudentAssistant, true)]
    #[case(LedgerCategory::Fines, Role::EventOfficer, false)]
    #[case(LedgerCategory::Contributions, Role::Treasurer, true)]
    #[case(LedgerCategory::Contributions, Role::Officer, true)]
    #[case(LedgerCategory::Contributions, Role::StudentAssistant, false)]
    #[case(LedgerCategory::Contributions, Role::Occupant, false)]
    fn test_post_by_category(
        #[case] category: LedgerCategory,
        #[case] role: Role,
        #[case] allowed: bool,
    ) {
        assert_eq!(AccessPolicy::allows(role, Capability::Post(category)), allowed);
    }

    #[test]
    fn test_override_is_admin_only() {
        for role in Role::ALL {
            assert_eq!(
                AccessPolicy::allows(role, Capability::Override),
                role == Role::Admin
            );
        }
    }

    #[test]
    fn test_require_reports_role_and_capability() {
        let actor = ActorContext::new(UserId::new(), DormId::new(), Role::Occupant);
        let err = AccessPolicy::require(&actor, Capability::ManageFines).unwrap_err();
        assert_eq!(err.to_string(), "forbidden: role occupant may not manage fines");
    }

    #[rstest]
    #[case(Role::Admin, false)]
    #[case(Role::StudentAssistant, false)]
    #[case(Role::Occupant, true)]
    fn test_missing_occupant_by_role(#[case] role: Role, #[case] forbidden: bool) {
        let actor = ActorContext::new(UserId::new(), DormId::new(), role);
        let err = AccessPolicy::viewable_occupant(&actor, None).unwrap_err();
        if forbidden {
            assert!(matches!(err, EngineError::Forbidden(_)));
        } else {
            assert!(matches!(err, EngineError::NotFound(_)));
        }
    }
}
