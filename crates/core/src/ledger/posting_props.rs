//! Property tests for the posting sign convention.

use proptest::prelude::*;
use rust_decimal::Decimal;
use warden_shared::types::Amount;

use super::types::{EntryType, Posting};

fn signed_decimal() -> impl Strategy<Value = Decimal> {
    (-100_000_000i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn entry_type_strategy() -> impl Strategy<Value = EntryType> {
    prop_oneof![Just(EntryType::Charge), Just(EntryType::Payment)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// The entry type decides the sign; the stored sign never flips a posting.
    #[test]
    fn prop_entry_type_decides_sign(stored in signed_decimal(), entry_type in entry_type_strategy()) {
        let (posting, _) = Posting::from_stored(entry_type, stored);
        prop_assert_eq!(posting.entry_type(), entry_type);
        prop_assert_eq!(posting.amount().value(), stored.abs());
        match entry_type {
            EntryType::Charge => prop_assert!(posting.signed() >= Decimal::ZERO),
            EntryType::Payment => prop_assert!(posting.signed() <= Decimal::ZERO),
        }
    }

    /// A posting written with its signed amount reads back unchanged and without drift.
    #[test]
    fn prop_store_round_trip(cents in 0i64..100_000_000i64, entry_type in entry_type_strategy()) {
        let posting = Posting::new(entry_type, Amount::from_magnitude(Decimal::new(cents, 2)));
        let (read, drift) = Posting::from_stored(entry_type, posting.signed());
        prop_assert_eq!(read, posting);
        prop_assert!(!drift);
    }
}
