//! Property tests for clearance aggregation.

use chrono::{NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use warden_shared::types::{Amount, DormId, LedgerEntryId, OccupantId, TermId, UserId};

use super::aggregator::ClearanceAggregator;
use crate::ledger::{LedgerCategory, LedgerEntry, Posting, VoidInfo};
use crate::occupants::{Occupant, OccupantStatus};
use crate::term::ActiveTerm;

/// (occupant index, category index, is_payment, cents, voided, in_term)
type EntrySpec = (usize, usize, bool, i64, bool, bool);

fn entry_specs() -> impl Strategy<Value = Vec<EntrySpec>> {
    prop::collection::vec(
        (0usize..4, 0usize..3, any::<bool>(), 0i64..1_000_000, any::<bool>(), any::<bool>()),
        0..40,
    )
}

fn fixture(specs: &[EntrySpec]) -> (ActiveTerm, Vec<Occupant>, Vec<LedgerEntry>) {
    let term = ActiveTerm {
        id: TermId::new(),
        dorm_id: DormId::new(),
        label: "2nd Semester AY 2026-2027".to_string(),
        starts_on: NaiveDate::from_ymd_opt(2027, 1, 1).unwrap_or_default(),
        ends_on: NaiveDate::from_ymd_opt(2027, 5, 31).unwrap_or_default(),
    };
    let occupants: Vec<Occupant> = (0..4)
        .map(|i| Occupant {
            id: OccupantId::new(),
            dorm_id: term.dorm_id,
            user_id: None,
            display_name: format!("Occupant {i}"),
            student_id: None,
            email: None,
            status: OccupantStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })
        .collect();
    let other_term = TermId::new();
    let entries = specs
        .iter()
        .map(|&(who, category, is_payment, cents, voided, in_term)| {
            let amount = Amount::from_magnitude(Decimal::new(cents, 2));
            LedgerEntry {
                id: LedgerEntryId::new(),
                dorm_id: term.dorm_id,
                occupant_id: occupants[who].id,
                term_id: Some(if in_term { term.id } else { other_term }),
                category: LedgerCategory::ALL[category],
                posting: if is_payment {
                    Posting::Payment(amount)
                } else {
                    Posting::Charge(amount)
                },
                event_id: None,
                fine_id: None,
                note: None,
                method: None,
                metadata: serde_json::json!({}),
                posted_at: Utc.with_ymd_and_hms(2027, 2, 1, 0, 0, 0).unwrap(),
                created_by: None,
                void: voided.then(|| VoidInfo::now(UserId::new(), "void")),
            }
        })
        .collect();
    (term, occupants, entries)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_collectibles_is_charged_minus_paid(specs in entry_specs()) {
        let (term, occupants, entries) = fixture(&specs);
        let stats = ClearanceAggregator::dashboard(&term, &occupants, &entries, &[], &[]);
        prop_assert_eq!(stats.collectibles, stats.total_charged - stats.total_paid);
    }

    #[test]
    fn prop_occupant_balances_sum_to_dorm_total(specs in entry_specs()) {
        let (term, occupants, entries) = fixture(&specs);
        let stats = ClearanceAggregator::dashboard(&term, &occupants, &entries, &[], &[]);
        let sum: Decimal = stats.clearance.iter().map(|r| r.balance).sum();
        prop_assert_eq!(sum, stats.collectibles);
    }

    #[test]
    fn prop_cleared_iff_non_positive_balance(specs in entry_specs()) {
        let (term, occupants, entries) = fixture(&specs);
        let stats = ClearanceAggregator::dashboard(&term, &occupants, &entries, &[], &[]);
        for row in &stats.clearance {
            prop_assert_eq!(row.is_cleared, row.balance <= Decimal::ZERO);
            prop_assert_eq!(row.balance, row.breakdown.total().balance);
        }
    }

    #[test]
    fn prop_voided_entries_never_count(specs in entry_specs()) {
        let (term, occupants, entries) = fixture(&specs);
        let active_only: Vec<LedgerEntry> =
            entries.iter().filter(|e| e.is_active()).cloned().collect();
        let with_voided = ClearanceAggregator::dashboard(&term, &occupants, &entries, &[], &[]);
        let without = ClearanceAggregator::dashboard(&term, &occupants, &active_only, &[], &[]);
        prop_assert_eq!(with_voided.totals, without.totals);
        prop_assert_eq!(with_voided.cash_on_hand, without.cash_on_hand);
    }
}
