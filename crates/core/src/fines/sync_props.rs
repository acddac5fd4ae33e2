//! Property tests for fine synchronization plans.
//!
//! Whatever state a fine's linked entries are in, applying the computed plan
//! leaves an active fine with exactly one active `sa_fines` charge of the
//! fine's amount, and a voided fine with no active linked entries.

use chrono::{Duration, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use warden_shared::types::{Amount, DormId, FineId, LedgerEntryId, OccupantId, UserId};

use super::sync::{FineSyncPlan, SyncStep};
use super::types::Fine;
use crate::ledger::{EntryType, LedgerCategory, LedgerEntry, Posting, VoidInfo};

fn amount_strategy() -> impl Strategy<Value = Amount> {
    (0i64..100_000i64).prop_map(|cents| Amount::from_magnitude(Decimal::new(cents, 2)))
}

fn category_strategy() -> impl Strategy<Value = LedgerCategory> {
    prop_oneof![
        4 => Just(LedgerCategory::Fines),
        1 => Just(LedgerCategory::Maintenance),
    ]
}

/// (category, is_payment, amount, voided, minutes_ago)
fn linked_strategy() -> impl Strategy<Value = Vec<(LedgerCategory, bool, Amount, bool, i64)>> {
    prop::collection::vec(
        (category_strategy(), any::<bool>(), amount_strategy(), any::<bool>(), 0i64..1_000),
        0..6,
    )
}

fn build_fine(pesos: Amount, voided: bool) -> Fine {
    Fine {
        id: FineId::new(),
        dorm_id: DormId::new(),
        occupant_id: OccupantId::new(),
        term_id: None,
        rule_id: None,
        pesos,
        points: 0,
        note: None,
        issued_by: UserId::new(),
        issued_at: Utc::now(),
        void: voided.then(|| VoidInfo::now(UserId::new(), "void")),
        needs_reconciliation: true,
    }
}

fn build_entry(
    fine: &Fine,
    (category, is_payment, amount, voided, minutes_ago): (LedgerCategory, bool, Amount, bool, i64),
) -> LedgerEntry {
    LedgerEntry {
        id: LedgerEntryId::new(),
        dorm_id: fine.dorm_id,
        occupant_id: fine.occupant_id,
        term_id: None,
        category,
        posting: if is_payment {
            Posting::Payment(amount)
        } else {
            Posting::Charge(amount)
        },
        event_id: None,
        fine_id: Some(fine.id),
        note: None,
        method: None,
        metadata: serde_json::json!({}),
        posted_at: Utc::now() - Duration::minutes(minutes_ago),
        created_by: None,
        void: voided.then(|| VoidInfo::now(UserId::new(), "earlier")),
    }
}

fn apply(plan: &FineSyncPlan, fine: &Fine, entries: &mut Vec<LedgerEntry>) {
    for step in &plan.steps {
        match step {
            SyncStep::PostCharge { amount, .. } => {
                entries.push(build_entry(
                    fine,
                    (LedgerCategory::Fines, false, *amount, false, 0),
                ));
            }
            SyncStep::PatchCharge { entry_id, amount } => {
                if let Some(entry) = entries.iter_mut().find(|e| e.id == *entry_id) {
                    entry.posting = entry.posting.with_amount(*amount);
                }
            }
            SyncStep::VoidEntry { entry_id } => {
                if let Some(entry) = entries.iter_mut().find(|e| e.id == *entry_id) {
                    entry.void = Some(VoidInfo::now(UserId::new(), "sync"));
                }
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_plan_restores_pairing(
        pesos in amount_strategy(),
        fine_voided in any::<bool>(),
        linked in linked_strategy(),
    ) {
        let fine = build_fine(pesos, fine_voided);
        let mut entries: Vec<LedgerEntry> =
            linked.into_iter().map(|spec| build_entry(&fine, spec)).collect();
        let previously_voided: Vec<LedgerEntryId> =
            entries.iter().filter(|e| !e.is_active()).map(|e| e.id).collect();

        let plan = FineSyncPlan::compute(&fine, &entries, "Fine: Violation");
        apply(&plan, &fine, &mut entries);

        let active_charges: Vec<&LedgerEntry> = entries
            .iter()
            .filter(|e| e.is_active() && e.entry_type() == EntryType::Charge)
            .collect();

        if fine.is_active() {
            prop_assert_eq!(active_charges.len(), 1);
            prop_assert_eq!(active_charges[0].category, LedgerCategory::Fines);
            prop_assert_eq!(active_charges[0].amount(), fine.pesos);
        } else {
            prop_assert!(entries.iter().all(|e| !e.is_active()));
        }

        // Entries voided before the plan stay voided.
        for id in previously_voided {
            prop_assert!(entries.iter().any(|e| e.id == id && !e.is_active()));
        }

        // Applying a fresh plan to the result changes nothing.
        let again = FineSyncPlan::compute(&fine, &entries, "Fine: Violation");
        prop_assert!(again.is_noop());
    }
}
