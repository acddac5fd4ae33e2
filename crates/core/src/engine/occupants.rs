//! Occupant enrollment and listing.

use chrono::Utc;
use serde_json::json;
use warden_shared::types::OccupantId;

use crate::access::{AccessPolicy, ActorContext, Capability};
use crate::audit::AuditAction;
use crate::error::{EngineError, EngineResult};
use crate::ledger::validation::{MAX_NAME_LEN, optional_text, required_text};
use crate::occupants::{EnrollOccupantInput, Occupant, OccupantStatus};

use super::Engine;

const MAX_STUDENT_ID_LEN: usize = 50;
const MAX_EMAIL_LEN: usize = 254;

pub(super) fn validate_display_name(name: &str) -> EngineResult<String> {
    required_text(name, "display_name", MAX_NAME_LEN)
}

pub(super) fn validate_student_id(student_id: Option<&str>) -> EngineResult<Option<String>> {
    optional_text(student_id, "student_id", MAX_STUDENT_ID_LEN)
}

pub(super) fn validate_email(email: Option<&str>) -> EngineResult<Option<String>> {
    let email = optional_text(email, "email", MAX_EMAIL_LEN)?;
    if let Some(address) = &email {
        let valid = address
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
        if !valid {
            return Err(EngineError::invalid("email is not a valid address"));
        }
    }
    Ok(email)
}

impl Engine {
    /// Enrolls a new active occupant.
    pub async fn enroll_occupant(
        &self,
        actor: &ActorContext,
        input: EnrollOccupantInput,
    ) -> EngineResult<Occupant> {
        AccessPolicy::require(actor, Capability::EnrollOccupants)?;

        let now = Utc::now();
        let occupant = Occupant {
            id: OccupantId::new(),
            dorm_id: actor.dorm_id,
            user_id: input.user_id,
            display_name: validate_display_name(&input.display_name)?,
            student_id: validate_student_id(input.student_id.as_deref())?,
            email: validate_email(input.email.as_deref())?,
            status: OccupantStatus::Active,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_occupant(&occupant).await?;

        tracing::info!(occupant_id = %occupant.id, "occupant enrolled");
        self.record_audit(
            actor,
            AuditAction::OccupantEnroll,
            "occupant",
            occupant.id.into_inner(),
            json!({
                "display_name": occupant.display_name,
                "student_id": occupant.student_id,
                "user_id": occupant.user_id,
            }),
        )
        .await;
        Ok(occupant)
    }

    /// Lists every occupant of the dorm by display name.
    pub async fn list_occupants(&self, actor: &ActorContext) -> EngineResult<Vec<Occupant>> {
        AccessPolicy::require(actor, Capability::ViewDorm)?;
        Ok(self.store.list_occupants(actor.dorm_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, true)]
    #[case(Some("  "), true)]
    #[case(Some("ana@example.edu"), true)]
    #[case(Some("ana.example.edu"), false)]
    #[case(Some("@example.edu"), false)]
    #[case(Some("ana@localhost"), false)]
    fn test_validate_email(#[case] email: Option<&str>, #[case] ok: bool) {
        assert_eq!(validate_email(email).is_ok(), ok);
    }

    #[test]
    fn test_display_name_required() {
        assert!(validate_display_name("   ").is_err());
        assert_eq!(validate_display_name(" Ana Cruz ").unwrap(), "Ana Cruz");
    }
}
