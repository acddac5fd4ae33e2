//! Planning ledger changes that pair a fine with exactly one charge.

use serde::Serialize;
use warden_shared::types::{Amount, FineId, LedgerEntryId};

use crate::ledger::{EntryType, LedgerCategory, LedgerEntry, VoidInfo};

use super::types::Fine;

/// One ledger change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum SyncStep {
    /// Post a new `sa_fines` charge for the fine.
    PostCharge {
        /// Charge amount.
        amount: Amount,
        /// Charge note.
        note: String,
    },
    /// Correct the amount of the surviving charge.
    PatchCharge {
        /// Charge to correct.
        entry_id: LedgerEntryId,
        /// Correct amount.
        amount: Amount,
    },
    /// Void a linked entry.
    VoidEntry {
        /// Entry to void.
        entry_id: LedgerEntryId,
    },
}

/// The ledger changes needed to make a fine and its linked entries consistent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FineSyncPlan {
    /// The fine being synchronized.
    pub fine_id: FineId,
    /// Changes to apply, in order.
    pub steps: Vec<SyncStep>,
}

impl FineSyncPlan {
    /// Computes the plan for `fine` given every entry linked to it.
    ///
    /// For an active fine the oldest active `sa_fines` charge survives (patched
    /// to the fine's amount if it drifted), other active charges are voided,
    /// and a charge is posted when none survives. Payments against the fine
    /// are left alone. For a voided fine every active linked entry is voided.
    #[must_use]
    pub fn compute(fine: &Fine, linked: &[LedgerEntry], charge_note: &str) -> Self {
        let mut active: Vec<&LedgerEntry> = linked
            .iter()
            .filter(|entry| entry.is_active() && entry.fine_id == Some(fine.id))
            .collect();
        active.sort_by_key(|entry| (entry.posted_at, entry.id));

        let mut steps = Vec::new();

        if !fine.is_active() {
            steps.extend(
                active
                    .iter()
                    .map(|entry| SyncStep::VoidEntry { entry_id: entry.id }),
            );
            return Self {
                fine_id: fine.id,
                steps,
            };
        }

        let mut survivor: Option<&LedgerEntry> = None;
        for entry in active
            .iter()
            .filter(|entry| entry.entry_type() == EntryType::Charge)
        {
            if survivor.is_none() && entry.category == LedgerCategory::Fines {
                survivor = Some(entry);
            } else {
                steps.push(SyncStep::VoidEntry { entry_id: entry.id });
            }
        }

        match survivor {
            Some(entry) if entry.amount() != fine.pesos => steps.push(SyncStep::PatchCharge {
                entry_id: entry.id,
                amount: fine.pesos,
            }),
            Some(_) => {}
            None => steps.push(SyncStep::PostCharge {
                amount: fine.pesos,
                note: charge_note.to_string(),
            }),
        }

        Self {
            fine_id: fine.id,
            steps,
        }
    }

    /// Payments linked to the fine that were voided by the fine's own void.
    ///
    /// A restored fine brings these back. Entries voided under any other
    /// stamp, and every charge, stay as they are; the charge side is handled
    /// by [`FineSyncPlan::compute`].
    #[must_use]
    pub fn payments_voided_with(
        fine_id: FineId,
        stamp: &VoidInfo,
        linked: &[LedgerEntry],
    ) -> Vec<LedgerEntryId> {
        linked
            .iter()
            .filter(|entry| entry.fine_id == Some(fine_id))
            .filter(|entry| entry.entry_type() == EntryType::Payment)
            .filter(|entry| entry.void.as_ref() == Some(stamp))
            .map(|entry| entry.id)
            .collect()
    }

    /// Returns true when the fine is already consistent.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.steps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Posting;
    use chrono::{Duration, Utc};
    use rust_decimal_macros::dec;
    use warden_shared::types::{DormId, OccupantId, UserId};

    fn fine(pesos: Amount) -> Fine {
        Fine {
            id: FineId::new(),
            dorm_id: DormId::new(),
            occupant_id: OccupantId::new(),
            term_id: None,
            rule_id: None,
            pesos,
            points: 2,
            note: None,
            issued_by: UserId::new(),
            issued_at: Utc::now(),
            void: None,
            needs_reconciliation: true,
        }
    }

    fn charge(fine: &Fine, amount: Amount, minutes_ago: i64) -> LedgerEntry {
        LedgerEntry {
            id: LedgerEntryId::new(),
            dorm_id: fine.dorm_id,
            occupant_id: fine.occupant_id,
            term_id: None,
            category: LedgerCategory::Fines,
            posting: Posting::Charge(amount),
            event_id: None,
            fine_id: Some(fine.id),
            note: None,
            method: None,
            metadata: serde_json::json!({}),
            posted_at: Utc::now() - Duration::minutes(minutes_ago),
            created_by: None,
            void: None,
        }
    }

    fn pesos(value: rust_decimal::Decimal) -> Amount {
        Amount::new(value).unwrap()
    }

    #[test]
    fn test_missing_charge_is_posted() {
        let fine = fine(pesos(dec!(150)));
        let plan = FineSyncPlan::compute(&fine, &[], "Fine: Violation");
        assert_eq!(
            plan.steps,
            vec![SyncStep::PostCharge {
                amount: pesos(dec!(150)),
                note: "Fine: Violation".to_string()
            }]
        );
    }

    #[test]
    fn test_consistent_fine_is_noop() {
        let fine = fine(pesos(dec!(150)));
        let linked = vec![charge(&fine, pesos(dec!(150)), 5)];
        assert!(FineSyncPlan::compute(&fine, &linked, "n").is_noop());
    }

    #[test]
    fn test_duplicates_voided_and_drift_patched() {
        let fine = fine(pesos(dec!(200)));
        let oldest = charge(&fine, pesos(dec!(150)), 10);
        let newer = charge(&fine, pesos(dec!(200)), 1);
        let plan = FineSyncPlan::compute(&fine, &[newer.clone(), oldest.clone()], "n");

        assert_eq!(
            plan.steps,
            vec![
                SyncStep::VoidEntry { entry_id: newer.id },
                SyncStep::PatchCharge {
                    entry_id: oldest.id,
                    amount: pesos(dec!(200))
                },
            ]
        );
    }

    #[test]
    fn test_voided_fine_voids_active_links_only() {
        let mut fine = fine(pesos(dec!(150)));
        let active = charge(&fine, pesos(dec!(150)), 3);
        let mut already = charge(&fine, pesos(dec!(150)), 9);
        already.void = Some(VoidInfo::now(UserId::new(), "dup"));
        fine.void = Some(VoidInfo::now(UserId::new(), "issued in error"));

        let plan = FineSyncPlan::compute(&fine, &[active.clone(), already], "n");
        assert_eq!(plan.steps, vec![SyncStep::VoidEntry { entry_id: active.id }]);
    }

    #[test]
    fn test_payments_against_active_fine_are_kept() {
        let fine = fine(pesos(dec!(150)));
        let mut payment = charge(&fine, pesos(dec!(150)), 1);
        payment.posting = Posting::Payment(pesos(dec!(150)));
        let linked = vec![charge(&fine, pesos(dec!(150)), 5), payment];
        assert!(FineSyncPlan::compute(&fine, &linked, "n").is_noop());
    }

    #[test]
    fn test_only_payments_with_the_fines_own_stamp_come_back() {
        let mut fine = fine(pesos(dec!(150)));
        let stamp = VoidInfo::now(UserId::new(), "issued in error");
        fine.void = Some(stamp.clone());

        let mut old_charge = charge(&fine, pesos(dec!(150)), 10);
        old_charge.void = Some(stamp.clone());
        let mut paid = charge(&fine, pesos(dec!(150)), 5);
        paid.posting = Posting::Payment(pesos(dec!(150)));
        paid.void = Some(stamp.clone());
        let mut refunded = charge(&fine, pesos(dec!(50)), 4);
        refunded.posting = Posting::Payment(pesos(dec!(50)));
        refunded.void = Some(VoidInfo::now(UserId::new(), "bounced"));

        let ids = FineSyncPlan::payments_voided_with(fine.id, &stamp, &[old_charge, paid.clone(), refunded]);
        assert_eq!(ids, vec![paid.id]);
    }
}
