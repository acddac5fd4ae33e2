//! Test harness for engine tests.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use warden_shared::types::{DormId, OccupantId, UserId};
use warden_shared::{LedgerConfig, ReceiptConfig};

use crate::access::{ActorContext, Role};
use crate::fines::{Fine, IssueFineInput};
use crate::ledger::{EntryFilter, EntryType, LedgerCategory, LedgerEntry, RecordEntryInput};
use crate::occupants::{EnrollOccupantInput, Occupant};
use crate::store::MemoryStore;

use super::Engine;

pub(super) struct Harness {
    pub store: Arc<MemoryStore>,
    pub engine: Engine,
    pub dorm_id: DormId,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(&LedgerConfig::default())
    }

    pub fn with_config(ledger: &LedgerConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let receipts = ReceiptConfig {
            dorm_name: "Molave Hall".to_string(),
            signature: None,
        };
        let engine = Engine::new(store.clone(), ledger, &receipts).unwrap();
        Self {
            store,
            engine,
            dorm_id: DormId::new(),
        }
    }

    pub fn actor(&self, role: Role) -> ActorContext {
        ActorContext::new(UserId::new(), self.dorm_id, role)
    }

    pub fn admin(&self) -> ActorContext {
        self.actor(Role::Admin)
    }

    pub async fn enroll(&self, name: &str) -> Occupant {
        self.engine
            .enroll_occupant(
                &self.admin(),
                EnrollOccupantInput {
                    display_name: name.to_string(),
                    student_id: None,
                    email: Some(format!("{}@example.edu", name.to_lowercase())),
                    user_id: None,
                },
            )
            .await
            .unwrap()
    }

    pub async fn post(
        &self,
        occupant_id: OccupantId,
        category: LedgerCategory,
        entry_type: EntryType,
        amount: Decimal,
    ) -> LedgerEntry {
        self.engine
            .record_transaction(&self.admin(), record(occupant_id, category, entry_type, amount))
            .await
            .unwrap()
    }

    pub async fn fine(&self, occupant_id: OccupantId, pesos: Decimal) -> Fine {
        self.engine
            .issue_fine(
                &self.actor(Role::StudentAssistant),
                IssueFineInput {
                    occupant_id,
                    pesos: Some(pesos),
                    points: Some(2),
                    note: Some("Late curfew".to_string()),
                    ..IssueFineInput::default()
                },
            )
            .await
            .unwrap()
            .fine
    }

    /// Every entry linked to a fine, voided included.
    pub async fn fine_entries(&self, fine: &Fine) -> Vec<LedgerEntry> {
        self.engine
            .entry_query(&self.admin(), EntryFilter::for_fine(fine.id))
            .unwrap()
            .collect()
            .await
            .unwrap()
    }

    pub async fn balance_of(&self, occupant_id: OccupantId) -> Decimal {
        self.engine
            .occupant_report(&self.admin(), occupant_id)
            .await
            .unwrap()
            .balance
    }
}

pub(super) fn record(
    occupant_id: OccupantId,
    category: LedgerCategory,
    entry_type: EntryType,
    amount: Decimal,
) -> RecordEntryInput {
    RecordEntryInput {
        occupant_id,
        category,
        entry_type,
        amount,
        note: None,
        method: None,
        event_id: None,
        fine_id: None,
        metadata: None,
    }
}

/// Asserts the pairing invariant for an active fine.
pub(super) fn assert_paired(fine: &Fine, entries: &[LedgerEntry]) {
    let active: Vec<&LedgerEntry> = entries
        .iter()
        .filter(|e| e.is_active() && e.entry_type() == EntryType::Charge)
        .collect();
    assert_eq!(active.len(), 1, "expected exactly one active charge for {}", fine.id);
    assert_eq!(active[0].category, LedgerCategory::Fines);
    assert_eq!(active[0].amount(), fine.pesos);
    assert!(active[0].posted_at <= Utc::now());
}
