//! Input validation for ledger writes.
//!
//! Checks here are pure. Existence checks (occupant, fine, event) need the
//! store and happen in the engine after these pass.

use rust_decimal::Decimal;
use serde_json::Value;
use warden_shared::types::Amount;

use crate::error::{EngineError, EngineResult};

use super::types::{EntryType, LedgerCategory, Posting, RecordEntryInput};

/// Maximum length of notes on entries and fines.
pub const MAX_NOTE_LEN: usize = 500;
/// Maximum length of a payment method.
pub const MAX_METHOD_LEN: usize = 50;
/// Maximum length of a void or override reason.
pub const MAX_REASON_LEN: usize = 500;
/// Maximum length of names and titles.
pub const MAX_NAME_LEN: usize = 200;

/// A record request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedEntry {
    /// The posting to store.
    pub posting: Posting,
    /// Trimmed note, `None` when blank.
    pub note: Option<String>,
    /// Trimmed method, `None` when blank.
    pub method: Option<String>,
    /// Metadata object (empty when not supplied).
    pub metadata: Value,
}

/// Validates a direct record request.
///
/// # Errors
///
/// Returns `EngineError::InvalidInput` describing the first violated constraint.
pub fn validate_record(input: &RecordEntryInput) -> EngineResult<ValidatedEntry> {
    let amount = positive_amount(input.amount)?;

    if input.fine_id.is_some() {
        if input.category != LedgerCategory::Fines {
            return Err(EngineError::invalid(
                "fine_id may only be set on sa_fines entries",
            ));
        }
        if input.entry_type == EntryType::Charge {
            return Err(EngineError::invalid(
                "fine charges are posted by issuing the fine",
            ));
        }
    }

    if input.event_id.is_some() && input.category != LedgerCategory::Contributions {
        return Err(EngineError::invalid(
            "event_id may only be set on contributions entries",
        ));
    }

    let note = optional_text(input.note.as_deref(), "note", MAX_NOTE_LEN)?;
    let method = optional_text(input.method.as_deref(), "method", MAX_METHOD_LEN)?;

    let metadata = match &input.metadata {
        None | Some(Value::Null) => Value::Object(serde_json::Map::new()),
        Some(Value::Object(map)) => Value::Object(map.clone()),
        Some(_) => return Err(EngineError::invalid("metadata must be a JSON object")),
    };

    Ok(ValidatedEntry {
        posting: Posting::new(input.entry_type, amount),
        note,
        method,
        metadata,
    })
}

/// Accepts amounts strictly greater than zero.
///
/// # Errors
///
/// Returns `EngineError::InvalidInput` for negative or zero values.
pub fn positive_amount(value: Decimal) -> EngineResult<Amount> {
    let amount = non_negative_amount(value, "amount")?;
    if amount.is_zero() {
        return Err(EngineError::invalid("amount must be greater than zero"));
    }
    Ok(amount)
}

/// Accepts zero or positive amounts.
///
/// # Errors
///
/// Returns `EngineError::InvalidInput` for negative values.
pub fn non_negative_amount(value: Decimal, field: &str) -> EngineResult<Amount> {
    Amount::new(value).map_err(|_| EngineError::invalid(format!("{field} must not be negative")))
}

/// Trims optional text, mapping blank to `None` and enforcing a length cap.
///
/// # Errors
///
/// Returns `EngineError::InvalidInput` when the trimmed text is too long.
pub fn optional_text(value: Option<&str>, field: &str, max_len: usize) -> EngineResult<Option<String>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) if text.chars().count() > max_len => Err(EngineError::invalid(format!(
            "{field} must be at most {max_len} characters"
        ))),
        Some(text) => Ok(Some(text.to_string())),
    }
}

/// Trims required text, rejecting blank or overlong values.
///
/// # Errors
///
/// Returns `EngineError::InvalidInput` naming the field.
pub fn required_text(value: &str, field: &str, max_len: usize) -> EngineResult<String> {
    optional_text(Some(value), field, max_len)?
        .ok_or_else(|| EngineError::invalid(format!("{field} is required")))
}

/// Requires a non-blank reason of bounded length.
///
/// # Errors
///
/// Returns `EngineError::InvalidInput` for a blank or overlong reason.
pub fn require_reason(reason: &str) -> EngineResult<String> {
    required_text(reason, "reason", MAX_REASON_LEN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use warden_shared::types::{EventId, FineId, OccupantId};

    fn input(category: LedgerCategory, entry_type: EntryType, amount: Decimal) -> RecordEntryInput {
        RecordEntryInput {
            occupant_id: OccupantId::new(),
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

    #[test]
    fn test_valid_payment() {
        let mut request = input(LedgerCategory::Fines, EntryType::Payment, dec!(150));
        request.note = Some("  paid at desk ".to_string());
        request.method = Some("cash".to_string());

        let validated = validate_record(&request).unwrap();
        assert_eq!(validated.posting.signed(), dec!(-150));
        assert_eq!(validated.note.as_deref(), Some("paid at desk"));
        assert_eq!(validated.metadata, serde_json::json!({}));
    }

    #[test]
    fn test_negative_amount_rejected() {
        let err = validate_record(&input(LedgerCategory::Maintenance, EntryType::Charge, dec!(-1)))
            .unwrap_err();
        assert_eq!(err.to_string(), "amount must not be negative");
    }

    #[test]
    fn test_zero_amount_rejected() {
        let err = validate_record(&input(LedgerCategory::Maintenance, EntryType::Charge, dec!(0)))
            .unwrap_err();
        assert_eq!(err.to_string(), "amount must be greater than zero");
    }

    #[test]
    fn test_fine_link_rules() {
        let mut request = input(LedgerCategory::Maintenance, EntryType::Payment, dec!(10));
        request.fine_id = Some(FineId::new());
        assert!(validate_record(&request).is_err());

        request.category = LedgerCategory::Fines;
        request.entry_type = EntryType::Charge;
        assert!(validate_record(&request).is_err());

        request.entry_type = EntryType::Payment;
        assert!(validate_record(&request).is_ok());
    }

    #[test]
    fn test_event_link_requires_contributions() {
        let mut request = input(LedgerCategory::Fines, EntryType::Charge, dec!(10));
        request.event_id = Some(EventId::new());
        assert!(validate_record(&request).is_err());

        request.category = LedgerCategory::Contributions;
        assert!(validate_record(&request).is_ok());
    }

    #[test]
    fn test_metadata_must_be_object() {
        let mut request = input(LedgerCategory::Contributions, EntryType::Charge, dec!(10));
        request.metadata = Some(serde_json::json!([1, 2]));
        assert!(validate_record(&request).is_err());
    }

    #[test]
    fn test_note_length_cap() {
        let mut request = input(LedgerCategory::Fines, EntryType::Payment, dec!(10));
        request.note = Some("x".repeat(MAX_NOTE_LEN + 1));
        assert!(validate_record(&request).is_err());
    }

    #[test]
    fn test_require_reason() {
        assert!(require_reason("   ").is_err());
        assert_eq!(require_reason(" issued in error ").unwrap(), "issued in error");
        assert!(require_reason(&"r".repeat(MAX_REASON_LEN + 1)).is_err());
    }
}
