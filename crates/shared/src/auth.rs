//! Actor claims carried in access tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims for access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: Uuid,
    /// Dormitory the actor is operating in.
    pub dorm: Uuid,
    /// Actor's role within the dorm.
    pub role: String,
    /// Issuing service.
    pub iss: String,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a user.
    #[must_use]
    pub fn new(user_id: Uuid, dorm_id: Uuid, role: &str, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            dorm: dorm_id,
            role: role.to_string(),
            iss: crate::jwt::TOKEN_ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the user ID from claims.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.sub
    }

    /// Returns the dorm ID from claims.
    #[must_use]
    pub const fn dorm_id(&self) -> Uuid {
        self.dorm
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_claims_new_sets_correct_fields() {
        let user_id = Uuid::new_v4();
        let dorm_id = Uuid::new_v4();
        let expires_at = Utc::now() + Duration::hours(1);

        let claims = Claims::new(user_id, dorm_id, "adviser", expires_at);

        assert_eq!(claims.user_id(), user_id);
        assert_eq!(claims.dorm_id(), dorm_id);
        assert_eq!(claims.role, "adviser");
        assert_eq!(claims.iss, "warden");
        assert!(claims.iat <= Utc::now().timestamp());
        assert_eq!(claims.exp, expires_at.timestamp());
    }
}
