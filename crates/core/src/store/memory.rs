//! In-memory store.
//!
//! Backs engine and API tests and local tooling. A single mutex guards all
//! maps, so every port method is atomic. Failure injection lets tests
//! exercise the engine's partial-failure paths.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use warden_shared::types::{
    Amount, CleaningAssignmentId, CleaningWeekId, DormId, EvaluationScoreId, EventId, FineId,
    FineRuleId, LedgerEntryId, OccupantId, PageRequest, TermId,
};

use crate::audit::{AuditEvent, AuditFilter};
use crate::fines::{Fine, FineFilter, FineRule};
use crate::ledger::{EntryFilter, EntryType, LedgerCategory, LedgerEntry, VoidInfo, sort_newest_first};
use crate::occupants::Occupant;
use crate::records::{CleaningAssignment, CleaningWeek, EvaluationScore, Event, Expense};
use crate::term::{Term, TermStatus, TermWindow};

use super::{
    AuditStore, EntryStore, FineStore, OccupantStore, RecordStore, StoreError, StoreResult,
    TermStore,
};

/// Operations that can be made to fail on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    /// `insert_entry`.
    InsertEntry,
    /// `fetch_entries` and `count_entries`.
    ReadEntries,
    /// `void_entries` and `void_fine_entries`.
    VoidEntries,
    /// Entry patches, restores, reassignments, and deadline updates.
    UpdateEntries,
    /// `insert_fine`.
    InsertFine,
    /// `update_fine`.
    UpdateFine,
    /// `append_audit`.
    AppendAudit,
}

#[derive(Debug, Default)]
struct State {
    terms: Vec<Term>,
    occupants: HashMap<OccupantId, Occupant>,
    entries: HashMap<LedgerEntryId, LedgerEntry>,
    fines: HashMap<FineId, Fine>,
    rules: HashMap<FineRuleId, FineRule>,
    expenses: Vec<Expense>,
    events: HashMap<EventId, Event>,
    weeks: HashMap<CleaningWeekId, CleaningWeek>,
    assignments: HashMap<CleaningAssignmentId, CleaningAssignment>,
    scores: HashMap<EvaluationScoreId, EvaluationScore>,
    audit: Vec<AuditEvent>,
}

/// A [`Store`](super::Store) kept entirely in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    failures: Mutex<HashSet<FailPoint>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every call through `point` fail until cleared.
    pub fn fail_on(&self, point: FailPoint) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.insert(point);
        }
    }

    /// Stops failing calls through `point`.
    pub fn clear_failure(&self, point: FailPoint) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.remove(&point);
        }
    }

    /// Adds an expense row.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the store lock is poisoned.
    pub fn add_expense(&self, expense: Expense) -> StoreResult<()> {
        self.state()?.expenses.push(expense);
        Ok(())
    }

    /// Adds an event row.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the store lock is poisoned.
    pub fn add_event(&self, event: Event) -> StoreResult<()> {
        self.state()?.events.insert(event.id, event);
        Ok(())
    }

    /// Adds a cleaning week.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the store lock is poisoned.
    pub fn add_cleaning_week(&self, week: CleaningWeek) -> StoreResult<()> {
        self.state()?.weeks.insert(week.id, week);
        Ok(())
    }

    /// Adds a cleaning assignment.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the store lock is poisoned.
    pub fn add_cleaning_assignment(&self, assignment: CleaningAssignment) -> StoreResult<()> {
        self.state()?.assignments.insert(assignment.id, assignment);
        Ok(())
    }

    /// Adds an evaluation score.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the store lock is poisoned.
    pub fn add_evaluation_score(&self, score: EvaluationScore) -> StoreResult<()> {
        self.state()?.scores.insert(score.id, score);
        Ok(())
    }

    fn state(&self) -> StoreResult<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }

    fn check(&self, point: FailPoint) -> StoreResult<()> {
        let failing = self
            .failures
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))?
            .contains(&point);
        if failing {
            Err(StoreError::Unavailable(format!("injected failure at {point:?}")))
        } else {
            Ok(())
        }
    }
}

fn replace<K, V>(map: &mut HashMap<K, V>, key: K, value: V, what: &str) -> StoreResult<()>
where
    K: std::hash::Hash + Eq,
{
    match map.get_mut(&key) {
        Some(slot) => {
            *slot = value;
            Ok(())
        }
        None => Err(StoreError::Conflict(format!("{what} does not exist"))),
    }
}

#[async_trait]
impl TermStore for MemoryStore {
    async fn active_term(&self, dorm_id: DormId) -> StoreResult<Option<Term>> {
        Ok(self
            .state()?
            .terms
            .iter()
            .find(|t| t.dorm_id == dorm_id && t.status == TermStatus::Active)
            .cloned())
    }

    async fn ensure_active_term(&self, dorm_id: DormId, window: &TermWindow) -> StoreResult<Term> {
        let mut state = self.state()?;
        if let Some(term) = state
            .terms
            .iter()
            .find(|t| t.dorm_id == dorm_id && t.status == TermStatus::Active)
        {
            return Ok(term.clone());
        }

        let term = Term {
            id: TermId::new(),
            dorm_id,
            label: window.label.clone(),
            starts_on: window.starts_on,
            ends_on: window.ends_on,
            status: TermStatus::Active,
            created_at: Utc::now(),
        };
        state.terms.push(term.clone());
        Ok(term)
    }

    async fn list_terms(&self, dorm_id: DormId) -> StoreResult<Vec<Term>> {
        let mut terms: Vec<Term> = self
            .state()?
            .terms
            .iter()
            .filter(|t| t.dorm_id == dorm_id)
            .cloned()
            .collect();
        terms.sort_by(|a, b| b.starts_on.cmp(&a.starts_on));
        Ok(terms)
    }
}

#[async_trait]
impl OccupantStore for MemoryStore {
    async fn insert_occupant(&self, occupant: &Occupant) -> StoreResult<()> {
        self.state()?.occupants.insert(occupant.id, occupant.clone());
        Ok(())
    }

    async fn get_occupant(&self, dorm_id: DormId, id: OccupantId) -> StoreResult<Option<Occupant>> {
        Ok(self
            .state()?
            .occupants
            .get(&id)
            .filter(|o| o.dorm_id == dorm_id)
            .cloned())
    }

    async fn list_occupants(&self, dorm_id: DormId) -> StoreResult<Vec<Occupant>> {
        let mut occupants: Vec<Occupant> = self
            .state()?
            .occupants
            .values()
            .filter(|o| o.dorm_id == dorm_id)
            .cloned()
            .collect();
        occupants.sort_by(|a, b| a.display_name.cmp(&b.display_name).then(a.id.cmp(&b.id)));
        Ok(occupants)
    }

    async fn update_occupant(&self, occupant: &Occupant) -> StoreResult<()> {
        replace(
            &mut self.state()?.occupants,
            occupant.id,
            occupant.clone(),
            "occupant",
        )
    }
}

#[async_trait]
impl EntryStore for MemoryStore {
    async fn insert_entry(&self, entry: &LedgerEntry) -> StoreResult<()> {
        self.check(FailPoint::InsertEntry)?;
        self.state()?.entries.insert(entry.id, entry.clone());
        Ok(())
    }

    async fn get_entry(&self, dorm_id: DormId, id: LedgerEntryId) -> StoreResult<Option<LedgerEntry>> {
        Ok(self
            .state()?
            .entries
            .get(&id)
            .filter(|e| e.dorm_id == dorm_id)
            .cloned())
    }

    async fn fetch_entries(
        &self,
        dorm_id: DormId,
        filter: &EntryFilter,
        page: PageRequest,
    ) -> StoreResult<Vec<LedgerEntry>> {
        self.check(FailPoint::ReadEntries)?;
        let mut rows: Vec<LedgerEntry> = self
            .state()?
            .entries
            .values()
            .filter(|e| e.dorm_id == dorm_id && filter.matches(e))
            .cloned()
            .collect();
        sort_newest_first(&mut rows);

        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);
        Ok(rows.into_iter().skip(offset).take(limit).collect())
    }

    async fn count_entries(&self, dorm_id: DormId, filter: &EntryFilter) -> StoreResult<u64> {
        self.check(FailPoint::ReadEntries)?;
        let count = self
            .state()?
            .entries
            .values()
            .filter(|e| e.dorm_id == dorm_id && filter.matches(e))
            .count();
        Ok(count as u64)
    }

    async fn void_entries(
        &self,
        dorm_id: DormId,
        ids: &[LedgerEntryId],
        void: &VoidInfo,
    ) -> StoreResult<u64> {
        self.check(FailPoint::VoidEntries)?;
        let mut state = self.state()?;
        let mut changed = 0;
        for id in ids {
            if let Some(entry) = state.entries.get_mut(id) {
                if entry.dorm_id == dorm_id && entry.is_active() {
                    entry.void = Some(void.clone());
                    changed += 1;
                }
            }
        }
        Ok(changed)
    }

    async fn void_fine_entries(
        &self,
        dorm_id: DormId,
        fine_id: FineId,
        void: &VoidInfo,
    ) -> StoreResult<u64> {
        self.check(FailPoint::VoidEntries)?;
        let mut changed = 0;
        for entry in self.state()?.entries.values_mut() {
            if entry.dorm_id == dorm_id && entry.fine_id == Some(fine_id) && entry.is_active() {
                entry.void = Some(void.clone());
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn restore_entry(&self, dorm_id: DormId, id: LedgerEntryId) -> StoreResult<bool> {
        self.check(FailPoint::UpdateEntries)?;
        let mut state = self.state()?;
        match state.entries.get_mut(&id) {
            Some(entry) if entry.dorm_id == dorm_id && !entry.is_active() => {
                entry.void = None;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn update_entry_amount(
        &self,
        dorm_id: DormId,
        id: LedgerEntryId,
        amount: Amount,
    ) -> StoreResult<bool> {
        self.check(FailPoint::UpdateEntries)?;
        let mut state = self.state()?;
        match state.entries.get_mut(&id) {
            Some(entry) if entry.dorm_id == dorm_id => {
                entry.posting = entry.posting.with_amount(amount);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn patch_fine_charges(
        &self,
        dorm_id: DormId,
        fine_id: FineId,
        amount: Amount,
        note: &str,
    ) -> StoreResult<u64> {
        self.check(FailPoint::UpdateEntries)?;
        let mut changed = 0;
        for entry in self.state()?.entries.values_mut() {
            if entry.dorm_id == dorm_id
                && entry.fine_id == Some(fine_id)
                && entry.is_active()
                && entry.entry_type() == EntryType::Charge
            {
                entry.posting = entry.posting.with_amount(amount);
                entry.note = Some(note.to_string());
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn reassign_entry(
        &self,
        dorm_id: DormId,
        id: LedgerEntryId,
        occupant_id: OccupantId,
    ) -> StoreResult<u64> {
        self.check(FailPoint::UpdateEntries)?;
        let mut state = self.state()?;
        match state.entries.get_mut(&id) {
            Some(entry) if entry.dorm_id == dorm_id => {
                entry.occupant_id = occupant_id;
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn reassign_fine_entries(
        &self,
        dorm_id: DormId,
        fine_id: FineId,
        occupant_id: OccupantId,
    ) -> StoreResult<u64> {
        self.check(FailPoint::UpdateEntries)?;
        let mut changed = 0;
        for entry in self.state()?.entries.values_mut() {
            if entry.dorm_id == dorm_id && entry.fine_id == Some(fine_id) {
                entry.occupant_id = occupant_id;
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn set_event_deadline(
        &self,
        dorm_id: DormId,
        event_id: EventId,
        deadline: Option<NaiveDate>,
    ) -> StoreResult<u64> {
        self.check(FailPoint::UpdateEntries)?;
        let mut changed = 0;
        for entry in self.state()?.entries.values_mut() {
            if entry.dorm_id == dorm_id
                && entry.event_id == Some(event_id)
                && entry.category == LedgerCategory::Contributions
                && entry.entry_type() == EntryType::Charge
                && entry.is_active()
            {
                entry.set_payable_deadline(deadline);
                changed += 1;
            }
        }
        Ok(changed)
    }
}

#[async_trait]
impl FineStore for MemoryStore {
    async fn insert_fine(&self, fine: &Fine) -> StoreResult<()> {
        self.check(FailPoint::InsertFine)?;
        self.state()?.fines.insert(fine.id, fine.clone());
        Ok(())
    }

    async fn get_fine(&self, dorm_id: DormId, id: FineId) -> StoreResult<Option<Fine>> {
        Ok(self
            .state()?
            .fines
            .get(&id)
            .filter(|f| f.dorm_id == dorm_id)
            .cloned())
    }

    async fn list_fines(&self, dorm_id: DormId, filter: &FineFilter) -> StoreResult<Vec<Fine>> {
        let mut fines: Vec<Fine> = self
            .state()?
            .fines
            .values()
            .filter(|f| f.dorm_id == dorm_id && filter.matches(f))
            .cloned()
            .collect();
        fines.sort_by(|a, b| b.issued_at.cmp(&a.issued_at).then(b.id.cmp(&a.id)));
        Ok(fines)
    }

    async fn update_fine(&self, fine: &Fine) -> StoreResult<()> {
        self.check(FailPoint::UpdateFine)?;
        replace(&mut self.state()?.fines, fine.id, fine.clone(), "fine")
    }

    async fn insert_fine_rule(&self, rule: &FineRule) -> StoreResult<()> {
        self.state()?.rules.insert(rule.id, rule.clone());
        Ok(())
    }

    async fn get_fine_rule(&self, dorm_id: DormId, id: FineRuleId) -> StoreResult<Option<FineRule>> {
        Ok(self
            .state()?
            .rules
            .get(&id)
            .filter(|r| r.dorm_id == dorm_id)
            .cloned())
    }

    async fn list_fine_rules(
        &self,
        dorm_id: DormId,
        include_inactive: bool,
    ) -> StoreResult<Vec<FineRule>> {
        let mut rules: Vec<FineRule> = self
            .state()?
            .rules
            .values()
            .filter(|r| r.dorm_id == dorm_id && (include_inactive || r.active))
            .cloned()
            .collect();
        rules.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(rules)
    }

    async fn update_fine_rule(&self, rule: &FineRule) -> StoreResult<()> {
        replace(&mut self.state()?.rules, rule.id, rule.clone(), "fine rule")
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn list_expenses(&self, dorm_id: DormId) -> StoreResult<Vec<Expense>> {
        Ok(self
            .state()?
            .expenses
            .iter()
            .filter(|e| e.dorm_id == dorm_id)
            .cloned()
            .collect())
    }

    async fn get_event(&self, dorm_id: DormId, id: EventId) -> StoreResult<Option<Event>> {
        Ok(self
            .state()?
            .events
            .get(&id)
            .filter(|e| e.dorm_id == dorm_id)
            .cloned())
    }

    async fn list_events(&self, dorm_id: DormId) -> StoreResult<Vec<Event>> {
        let mut events: Vec<Event> = self
            .state()?
            .events
            .values()
            .filter(|e| e.dorm_id == dorm_id)
            .cloned()
            .collect();
        events.sort_by(|a, b| a.starts_at.cmp(&b.starts_at));
        Ok(events)
    }

    async fn update_event(&self, event: &Event) -> StoreResult<()> {
        replace(&mut self.state()?.events, event.id, event.clone(), "event")
    }

    async fn get_cleaning_week(
        &self,
        dorm_id: DormId,
        id: CleaningWeekId,
    ) -> StoreResult<Option<CleaningWeek>> {
        Ok(self
            .state()?
            .weeks
            .get(&id)
            .filter(|w| w.dorm_id == dorm_id)
            .cloned())
    }

    async fn update_cleaning_week(&self, week: &CleaningWeek) -> StoreResult<()> {
        replace(&mut self.state()?.weeks, week.id, week.clone(), "cleaning week")
    }

    async fn get_cleaning_assignment(
        &self,
        dorm_id: DormId,
        id: CleaningAssignmentId,
    ) -> StoreResult<Option<CleaningAssignment>> {
        Ok(self
            .state()?
            .assignments
            .get(&id)
            .filter(|a| a.dorm_id == dorm_id)
            .cloned())
    }

    async fn update_cleaning_assignment(
        &self,
        assignment: &CleaningAssignment,
    ) -> StoreResult<()> {
        replace(
            &mut self.state()?.assignments,
            assignment.id,
            assignment.clone(),
            "cleaning assignment",
        )
    }

    async fn get_evaluation_score(
        &self,
        dorm_id: DormId,
        id: EvaluationScoreId,
    ) -> StoreResult<Option<EvaluationScore>> {
        Ok(self
            .state()?
            .scores
            .get(&id)
            .filter(|s| s.dorm_id == dorm_id)
            .cloned())
    }

    async fn list_evaluation_scores(&self, dorm_id: DormId) -> StoreResult<Vec<EvaluationScore>> {
        Ok(self
            .state()?
            .scores
            .values()
            .filter(|s| s.dorm_id == dorm_id)
            .cloned()
            .collect())
    }

    async fn update_evaluation_score(&self, score: &EvaluationScore) -> StoreResult<()> {
        replace(&mut self.state()?.scores, score.id, score.clone(), "evaluation score")
    }
}

#[async_trait]
impl AuditStore for MemoryStore {
    async fn append_audit(&self, event: &AuditEvent) -> StoreResult<()> {
        self.check(FailPoint::AppendAudit)?;
        self.state()?.audit.push(event.clone());
        Ok(())
    }

    async fn list_audit(&self, dorm_id: DormId, filter: &AuditFilter) -> StoreResult<Vec<AuditEvent>> {
        let limit = filter
            .limit
            .map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(usize::MAX));
        Ok(self
            .state()?
            .audit
            .iter()
            .rev()
            .filter(|e| e.dorm_id == dorm_id && filter.matches(e))
            .take(limit)
            .cloned()
            .collect())
    }
}
