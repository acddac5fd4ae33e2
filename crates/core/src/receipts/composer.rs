//! Receipt drafting.

use serde::Serialize;
use warden_shared::ReceiptConfig;
use warden_shared::types::LedgerEntryId;

use crate::error::{EngineError, EngineResult};
use crate::ledger::{EntryType, LedgerEntry};
use crate::occupants::Occupant;

/// A drafted receipt ready to preview or hand to a mailer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReceiptDraft {
    /// Payment the receipt is for.
    pub entry_id: LedgerEntryId,
    /// Recipient address, when the occupant has one.
    pub to: Option<String>,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
}

/// Drafts payment receipts.
#[derive(Debug, Clone)]
pub struct ReceiptComposer {
    dorm_name: String,
    signature: Option<String>,
}

impl ReceiptComposer {
    /// Creates a composer from receipt configuration.
    #[must_use]
    pub fn new(config: &ReceiptConfig) -> Self {
        Self {
            dorm_name: config.dorm_name.clone(),
            signature: config.signature.clone(),
        }
    }

    /// Drafts the receipt for an active payment.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidInput` for charges and voided entries.
    pub fn compose(&self, entry: &LedgerEntry, occupant: &Occupant) -> EngineResult<ReceiptDraft> {
        if entry.entry_type() != EntryType::Payment {
            return Err(EngineError::invalid("receipts can only be drafted for payments"));
        }
        if !entry.is_active() {
            return Err(EngineError::invalid("cannot draft a receipt for a voided entry"));
        }

        let amount = entry.amount().format_peso();
        let category = entry.category.label();
        let subject = format!("{} payment receipt - {amount}", self.dorm_name);

        let mut body = format!(
            "Hi {name},\n\nThis confirms your payment to {dorm}.\n\n\
             Category:  {category}\n\
             Amount:    {amount}\n\
             Method:    {method}\n\
             Posted:    {posted}\n\
             Reference: {reference}\n",
            name = occupant.display_name,
            dorm = self.dorm_name,
            method = entry.method.as_deref().unwrap_or("unspecified"),
            posted = entry.posted_at.format("%Y-%m-%d"),
            reference = entry.id,
        );
        if let Some(note) = entry.note.as_deref() {
            body.push_str(&format!("Note:      {note}\n"));
        }
        body.push('\n');
        body.push_str(self.signature.as_deref().unwrap_or(&self.dorm_name));

        Ok(ReceiptDraft {
            entry_id: entry.id,
            to: occupant.email.clone(),
            subject,
            body,
        })
    }
}
