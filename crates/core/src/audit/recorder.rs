//! Best-effort audit writes.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::store::AuditStore;

use super::types::AuditEvent;

/// Writes audit events without letting failures escape.
#[derive(Debug, Default)]
pub struct AuditRecorder {
    failures: AtomicU64,
}

impl AuditRecorder {
    /// Creates a recorder with a zeroed failure counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `event`. A failed write is logged and counted, never returned.
    pub async fn record(&self, store: &dyn AuditStore, event: AuditEvent) {
        if let Err(e) = store.append_audit(&event).await {
            let total = self.failures.fetch_add(1, Ordering::Relaxed) + 1;
            tracing::error!(
                error = %e,
                action = %event.action,
                entity_type = %event.entity_type,
                entity_id = %event.entity_id,
                actor_id = %event.actor_id,
                dorm_id = %event.dorm_id,
                audit_failures_total = total,
                "audit write failed"
            );
        }
    }

    /// Number of audit writes that failed since startup.
    #[must_use]
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::{ActorContext, Role};
    use crate::audit::{AuditAction, AuditFilter};
    use crate::store::{FailPoint, MemoryStore};
    use uuid::Uuid;
    use warden_shared::types::{DormId, UserId};

    fn event(actor: &ActorContext) -> AuditEvent {
        AuditEvent::new(
            actor,
            AuditAction::LedgerVoid,
            "ledger_entry",
            Uuid::new_v4(),
            serde_json::json!({"reason": "dup"}),
        )
    }

    #[tokio::test]
    async fn test_failures_are_counted_not_raised() {
        let store = MemoryStore::new();
        let actor = ActorContext::new(UserId::new(), DormId::new(), Role::Admin);
        let recorder = AuditRecorder::new();

        recorder.record(&store, event(&actor)).await;
        store.fail_on(FailPoint::AppendAudit);
        recorder.record(&store, event(&actor)).await;
        recorder.record(&store, event(&actor)).await;

        assert_eq!(recorder.failures(), 2);
        let stored = store
            .list_audit(actor.dorm_id, &AuditFilter::default())
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
    }
}
