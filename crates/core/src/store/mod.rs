//! Storage ports.
//!
//! The engine talks to persistence only through these traits. Each method is
//! a single statement from the caller's point of view; nothing here offers a
//! multi-statement transaction, and the engine does not assume one.
//!
//! Implementations:
//! - [`MemoryStore`] in this crate, used by tests and local tooling
//! - `SeaStore` in `warden-db`, backed by Postgres

mod memory;

pub use memory::{FailPoint, MemoryStore};

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;
use warden_shared::types::{
    Amount, CleaningAssignmentId, CleaningWeekId, DormId, EvaluationScoreId, EventId, FineId,
    FineRuleId, LedgerEntryId, OccupantId, PageRequest,
};

use crate::audit::{AuditEvent, AuditFilter};
use crate::fines::{Fine, FineFilter, FineRule};
use crate::ledger::{EntryFilter, LedgerEntry, VoidInfo};
use crate::occupants::Occupant;
use crate::records::{CleaningAssignment, CleaningWeek, EvaluationScore, Event, Expense};
use crate::term::{Term, TermWindow};

/// Errors raised by store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database rejected or failed a statement.
    #[error("database error: {0}")]
    Database(String),

    /// A uniqueness or state constraint was violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A stored row could not be mapped into a domain value.
    #[error("corrupt row: {0}")]
    Corrupt(String),

    /// The store is unreachable.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Academic terms.
#[async_trait]
pub trait TermStore: Send + Sync {
    /// Returns the dorm's active term, if any.
    async fn active_term(&self, dorm_id: DormId) -> StoreResult<Option<Term>>;

    /// Atomically returns the active term, creating and activating one from
    /// `window` when none exists.
    async fn ensure_active_term(&self, dorm_id: DormId, window: &TermWindow) -> StoreResult<Term>;

    /// Lists all terms of a dorm, newest first.
    async fn list_terms(&self, dorm_id: DormId) -> StoreResult<Vec<Term>>;
}

/// Occupants.
#[async_trait]
pub trait OccupantStore: Send + Sync {
    /// Inserts a new occupant.
    async fn insert_occupant(&self, occupant: &Occupant) -> StoreResult<()>;

    /// Fetches an occupant of the dorm.
    async fn get_occupant(&self, dorm_id: DormId, id: OccupantId) -> StoreResult<Option<Occupant>>;

    /// Lists every occupant of the dorm ordered by display name.
    async fn list_occupants(&self, dorm_id: DormId) -> StoreResult<Vec<Occupant>>;

    /// Writes every field of an existing occupant.
    async fn update_occupant(&self, occupant: &Occupant) -> StoreResult<()>;
}

/// Ledger entries.
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Inserts a new entry.
    async fn insert_entry(&self, entry: &LedgerEntry) -> StoreResult<()>;

    /// Fetches an entry of the dorm, voided or not.
    async fn get_entry(&self, dorm_id: DormId, id: LedgerEntryId) -> StoreResult<Option<LedgerEntry>>;

    /// Returns one page of matching entries ordered by `posted_at` descending, then ID descending.
    async fn fetch_entries(
        &self,
        dorm_id: DormId,
        filter: &EntryFilter,
        page: PageRequest,
    ) -> StoreResult<Vec<LedgerEntry>>;

    /// Counts matching entries.
    async fn count_entries(&self, dorm_id: DormId, filter: &EntryFilter) -> StoreResult<u64>;

    /// Voids the listed entries that are still active. Returns rows changed.
    async fn void_entries(
        &self,
        dorm_id: DormId,
        ids: &[LedgerEntryId],
        void: &VoidInfo,
    ) -> StoreResult<u64>;

    /// Voids every active entry linked to a fine. Returns rows changed.
    async fn void_fine_entries(
        &self,
        dorm_id: DormId,
        fine_id: FineId,
        void: &VoidInfo,
    ) -> StoreResult<u64>;

    /// Clears the void fields of an entry. Returns false if it was not voided.
    async fn restore_entry(&self, dorm_id: DormId, id: LedgerEntryId) -> StoreResult<bool>;

    /// Sets the amount of one entry, keeping its type. Returns false if it does not exist.
    async fn update_entry_amount(
        &self,
        dorm_id: DormId,
        id: LedgerEntryId,
        amount: Amount,
    ) -> StoreResult<bool>;

    /// Sets amount and note on every active charge linked to a fine. Returns rows changed.
    async fn patch_fine_charges(
        &self,
        dorm_id: DormId,
        fine_id: FineId,
        amount: Amount,
        note: &str,
    ) -> StoreResult<u64>;

    /// Moves one entry to another occupant. Returns rows changed.
    async fn reassign_entry(
        &self,
        dorm_id: DormId,
        id: LedgerEntryId,
        occupant_id: OccupantId,
    ) -> StoreResult<u64>;

    /// Moves every entry linked to a fine, in one statement. Returns rows changed.
    async fn reassign_fine_entries(
        &self,
        dorm_id: DormId,
        fine_id: FineId,
        occupant_id: OccupantId,
    ) -> StoreResult<u64>;

    /// Sets or clears the payable deadline on the event's active contribution charges.
    async fn set_event_deadline(
        &self,
        dorm_id: DormId,
        event_id: EventId,
        deadline: Option<NaiveDate>,
    ) -> StoreResult<u64>;
}

/// Fines and fine rules.
#[async_trait]
pub trait FineStore: Send + Sync {
    /// Inserts a new fine.
    async fn insert_fine(&self, fine: &Fine) -> StoreResult<()>;

    /// Fetches a fine of the dorm.
    async fn get_fine(&self, dorm_id: DormId, id: FineId) -> StoreResult<Option<Fine>>;

    /// Lists matching fines, newest first.
    async fn list_fines(&self, dorm_id: DormId, filter: &FineFilter) -> StoreResult<Vec<Fine>>;

    /// Writes every field of an existing fine.
    async fn update_fine(&self, fine: &Fine) -> StoreResult<()>;

    /// Inserts a new rule.
    async fn insert_fine_rule(&self, rule: &FineRule) -> StoreResult<()>;

    /// Fetches a rule of the dorm.
    async fn get_fine_rule(&self, dorm_id: DormId, id: FineRuleId) -> StoreResult<Option<FineRule>>;

    /// Lists rules ordered by title.
    async fn list_fine_rules(
        &self,
        dorm_id: DormId,
        include_inactive: bool,
    ) -> StoreResult<Vec<FineRule>>;

    /// Writes every field of an existing rule.
    async fn update_fine_rule(&self, rule: &FineRule) -> StoreResult<()>;
}

/// Collaborator records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Lists all expenses of the dorm.
    async fn list_expenses(&self, dorm_id: DormId) -> StoreResult<Vec<Expense>>;

    /// Fetches an event.
    async fn get_event(&self, dorm_id: DormId, id: EventId) -> StoreResult<Option<Event>>;

    /// Lists events ordered by start time.
    async fn list_events(&self, dorm_id: DormId) -> StoreResult<Vec<Event>>;

    /// Writes every field of an existing event.
    async fn update_event(&self, event: &Event) -> StoreResult<()>;

    /// Fetches a cleaning week.
    async fn get_cleaning_week(
        &self,
        dorm_id: DormId,
        id: CleaningWeekId,
    ) -> StoreResult<Option<CleaningWeek>>;

    /// Writes every field of an existing cleaning week.
    async fn update_cleaning_week(&self, week: &CleaningWeek) -> StoreResult<()>;

    /// Fetches a cleaning assignment.
    async fn get_cleaning_assignment(
        &self,
        dorm_id: DormId,
        id: CleaningAssignmentId,
    ) -> StoreResult<Option<CleaningAssignment>>;

    /// Writes every field of an existing cleaning assignment.
    async fn update_cleaning_assignment(&self, assignment: &CleaningAssignment)
    -> StoreResult<()>;

    /// Fetches an evaluation score.
    async fn get_evaluation_score(
        &self,
        dorm_id: DormId,
        id: EvaluationScoreId,
    ) -> StoreResult<Option<EvaluationScore>>;

    /// Lists every evaluation score of the dorm.
    async fn list_evaluation_scores(&self, dorm_id: DormId) -> StoreResult<Vec<EvaluationScore>>;

    /// Writes every field of an existing evaluation score.
    async fn update_evaluation_score(&self, score: &EvaluationScore) -> StoreResult<()>;
}

/// Audit trail.
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Appends one event.
    async fn append_audit(&self, event: &AuditEvent) -> StoreResult<()>;

    /// Lists matching events, newest first.
    async fn list_audit(&self, dorm_id: DormId, filter: &AuditFilter) -> StoreResult<Vec<AuditEvent>>;
}

/// Everything the engine needs from persistence.
pub trait Store:
    TermStore + OccupantStore + EntryStore + FineStore + RecordStore + AuditStore
{
}

impl<T> Store for T where
    T: TermStore + OccupantStore + EntryStore + FineStore + RecordStore + AuditStore
{
}
