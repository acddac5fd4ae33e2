//! Find-or-create of a dorm's active term.

use chrono::NaiveDate;
use warden_shared::types::DormId;

use crate::error::{EngineError, EngineResult};
use crate::store::TermStore;

use super::policy::TermPolicy;
use super::types::ActiveTerm;

/// Resolves the active term of a dorm.
pub struct TermResolver;

impl TermResolver {
    /// Returns the dorm's active term, creating one from `today` when none is
    /// active and `auto_create` is set.
    ///
    /// Repeated calls inside the same active window return the same term. The
    /// find-or-create itself is delegated to the store so concurrent callers
    /// cannot activate two terms.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NoActiveTerm` when nothing is active and
    /// auto-creation is disabled, or a store error.
    pub async fn ensure_active(
        store: &dyn TermStore,
        dorm_id: DormId,
        today: NaiveDate,
        auto_create: bool,
    ) -> EngineResult<ActiveTerm> {
        if let Some(term) = store.active_term(dorm_id).await? {
            return Ok(term.into());
        }
        if !auto_create {
            return Err(EngineError::NoActiveTerm);
        }

        let window = TermPolicy::window_for(today);
        let term = store.ensure_active_term(dorm_id, &window).await?;
        tracing::info!(
            dorm_id = %dorm_id,
            term_id = %term.id,
            label = %term.label,
            "active term resolved"
        );
        Ok(term.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[tokio::test]
    async fn test_creates_term_once() {
        let store = MemoryStore::new();
        let dorm = DormId::new();

        let first = TermResolver::ensure_active(&store, dorm, today(), true).await.unwrap();
        let second = TermResolver::ensure_active(&store, dorm, today(), true).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.label, "1st Semester AY 2026-2027");
        assert_eq!(store.list_terms(dorm).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_no_active_term_without_auto_create() {
        let store = MemoryStore::new();
        let err = TermResolver::ensure_active(&store, DormId::new(), today(), false)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::NoActiveTerm));
    }

    #[tokio::test]
    async fn test_terms_are_per_dorm() {
        let store = MemoryStore::new();
        let a = TermResolver::ensure_active(&store, DormId::new(), today(), true).await.unwrap();
        let b = TermResolver::ensure_active(&store, DormId::new(), today(), true).await.unwrap();
        assert_ne!(a.id, b.id);
    }
}
