//! Ledger domain types.
//!
//! Every entry carries a tagged [`Posting`]. Stores persist the signed amount
//! (charges positive, payments negative) next to the entry type; the posting
//! is rebuilt from the entry type on read and the stored sign is only checked.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use warden_shared::types::{
    Amount, DormId, EventId, FineId, LedgerEntryId, OccupantId, TermId, UserId,
};

/// Metadata key holding a contribution's payable deadline (`YYYY-MM-DD`).
pub const PAYABLE_DEADLINE_KEY: &str = "payable_deadline";

/// Canonical ledger categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LedgerCategory {
    /// Maintenance fees collected by the adviser's office.
    #[serde(rename = "maintenance_fee")]
    Maintenance,
    /// Disciplinary fines.
    #[serde(rename = "sa_fines")]
    Fines,
    /// Event contributions collected by officers.
    #[serde(rename = "contributions")]
    Contributions,
}

impl LedgerCategory {
    /// All categories in display order.
    pub const ALL: [Self; 3] = [Self::Maintenance, Self::Fines, Self::Contributions];

    /// Returns the canonical stored name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Maintenance => "maintenance_fee",
            Self::Fines => "sa_fines",
            Self::Contributions => "contributions",
        }
    }

    /// Returns a human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Maintenance => "Maintenance Fee",
            Self::Fines => "Fines",
            Self::Contributions => "Contributions",
        }
    }
}

impl std::fmt::Display for LedgerCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Direction of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// Increases what the occupant owes.
    Charge,
    /// Decreases what the occupant owes.
    Payment,
}

impl EntryType {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Charge => "charge",
            Self::Payment => "payment",
        }
    }

    /// Parses from string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "charge" => Some(Self::Charge),
            "payment" => Some(Self::Payment),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A charge or a payment of a non-negative amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "entry_type", content = "amount", rename_all = "lowercase")]
pub enum Posting {
    /// Amount owed.
    Charge(Amount),
    /// Amount paid.
    Payment(Amount),
}

impl Posting {
    /// Builds a posting of the given type.
    #[must_use]
    pub const fn new(entry_type: EntryType, amount: Amount) -> Self {
        match entry_type {
            EntryType::Charge => Self::Charge(amount),
            EntryType::Payment => Self::Payment(amount),
        }
    }

    /// Rebuilds a posting from a stored row.
    ///
    /// The entry type is authoritative. The second value is true when the
    /// stored sign disagrees with it (a positive payment or a negative charge).
    #[must_use]
    pub fn from_stored(entry_type: EntryType, stored_amount: Decimal) -> (Self, bool) {
        let amount = Amount::from_magnitude(stored_amount);
        let drift = !stored_amount.is_zero()
            && match entry_type {
                EntryType::Charge => stored_amount.is_sign_negative(),
                EntryType::Payment => stored_amount.is_sign_positive(),
            };
        (Self::new(entry_type, amount), drift)
    }

    /// Returns the entry type.
    #[must_use]
    pub const fn entry_type(&self) -> EntryType {
        match self {
            Self::Charge(_) => EntryType::Charge,
            Self::Payment(_) => EntryType::Payment,
        }
    }

    /// Returns the unsigned amount.
    #[must_use]
    pub const fn amount(&self) -> Amount {
        match self {
            Self::Charge(amount) | Self::Payment(amount) => *amount,
        }
    }

    /// Returns the amount with the stored sign: charges positive, payments negative.
    #[must_use]
    pub fn signed(&self) -> Decimal {
        match self {
            Self::Charge(amount) => amount.value(),
            Self::Payment(amount) => -amount.value(),
        }
    }

    /// Returns a posting of the same type with a different amount.
    #[must_use]
    pub const fn with_amount(&self, amount: Amount) -> Self {
        Self::new(self.entry_type(), amount)
    }
}

/// Who voided a record, when, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoidInfo {
    /// When the record was voided.
    pub voided_at: DateTime<Utc>,
    /// Who voided it.
    pub voided_by: UserId,
    /// Reason given.
    pub reason: String,
}

impl VoidInfo {
    /// Creates void info stamped now.
    #[must_use]
    pub fn now(voided_by: UserId, reason: impl Into<String>) -> Self {
        Self {
            voided_at: Utc::now(),
            voided_by,
            reason: reason.into(),
        }
    }
}

/// A single charge or payment row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Entry ID.
    pub id: LedgerEntryId,
    /// Owning dorm.
    pub dorm_id: DormId,
    /// Occupant the entry belongs to.
    pub occupant_id: OccupantId,
    /// Term the entry was posted in. `None` on legacy rows.
    pub term_id: Option<TermId>,
    /// Ledger category.
    pub category: LedgerCategory,
    /// Charge or payment amount.
    pub posting: Posting,
    /// Linked event, for contributions.
    pub event_id: Option<EventId>,
    /// Linked fine, for fine charges and fine payments.
    pub fine_id: Option<FineId>,
    /// Free-form note.
    pub note: Option<String>,
    /// Payment method (cash, gcash, ...).
    pub method: Option<String>,
    /// Extra attributes; always a JSON object.
    pub metadata: Value,
    /// When the entry was posted.
    pub posted_at: DateTime<Utc>,
    /// Who posted it. `None` for system-generated rows.
    pub created_by: Option<UserId>,
    /// Void details. `None` while the entry is active.
    pub void: Option<VoidInfo>,
}

impl LedgerEntry {
    /// Returns true unless the entry has been voided.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.void.is_none()
    }

    /// Returns the entry type.
    #[must_use]
    pub const fn entry_type(&self) -> EntryType {
        self.posting.entry_type()
    }

    /// Returns the unsigned amount.
    #[must_use]
    pub const fn amount(&self) -> Amount {
        self.posting.amount()
    }

    /// Returns the balance contribution of this entry.
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        self.posting.signed()
    }

    /// Returns the contribution deadline stored in metadata, if any.
    #[must_use]
    pub fn payable_deadline(&self) -> Option<NaiveDate> {
        self.metadata
            .get(PAYABLE_DEADLINE_KEY)
            .and_then(Value::as_str)
            .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
    }

    /// Sets or clears the payable deadline in metadata.
    pub fn set_payable_deadline(&mut self, deadline: Option<NaiveDate>) {
        if !self.metadata.is_object() {
            self.metadata = Value::Object(serde_json::Map::new());
        }
        if let Value::Object(map) = &mut self.metadata {
            match deadline {
                Some(date) => {
                    map.insert(
                        PAYABLE_DEADLINE_KEY.to_string(),
                        Value::String(date.format("%Y-%m-%d").to_string()),
                    );
                }
                None => {
                    map.remove(PAYABLE_DEADLINE_KEY);
                }
            }
        }
    }
}

/// Input for recording a charge or payment.
#[derive(Debug, Clone)]
pub struct RecordEntryInput {
    /// Occupant to post against.
    pub occupant_id: OccupantId,
    /// Ledger category.
    pub category: LedgerCategory,
    /// Charge or payment.
    pub entry_type: EntryType,
    /// Amount; must be greater than zero.
    pub amount: Decimal,
    /// Optional note.
    pub note: Option<String>,
    /// Optional payment method.
    pub method: Option<String>,
    /// Linked event (contributions only).
    pub event_id: Option<EventId>,
    /// Linked fine (fines payments only).
    pub fine_id: Option<FineId>,
    /// Optional metadata object.
    pub metadata: Option<Value>,
}

/// Result of a void request.
#[derive(Debug, Clone, Serialize)]
pub struct VoidEntryOutcome {
    /// The entry after the call.
    pub entry: LedgerEntry,
    /// False when the entry was already voided.
    pub changed: bool,
}
