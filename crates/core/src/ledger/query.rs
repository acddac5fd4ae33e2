//! Ledger read path.
//!
//! Every aggregate and report reads entries through [`EntryQuery`], which
//! pages through the store lazily. The stream is finite and restartable:
//! calling [`EntryQuery::stream`] again starts over from the first page.

use chrono::NaiveDate;
use futures::stream::{self, Stream, TryStreamExt};
use warden_shared::types::{DormId, EventId, FineId, OccupantId, PageRequest, TermId};

use crate::store::{EntryStore, StoreError};

use super::types::{EntryType, LedgerCategory, LedgerEntry};

/// Entry selection criteria.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryFilter {
    /// Only this occupant's entries.
    pub occupant_id: Option<OccupantId>,
    /// Only entries stamped with this term.
    pub term_id: Option<TermId>,
    /// Only this category.
    pub category: Option<LedgerCategory>,
    /// Only charges or only payments.
    pub entry_type: Option<EntryType>,
    /// Posted on or after this date.
    pub from: Option<NaiveDate>,
    /// Posted on or before this date.
    pub to: Option<NaiveDate>,
    /// Only entries linked to this fine.
    pub fine_id: Option<FineId>,
    /// Only entries linked to this event.
    pub event_id: Option<EventId>,
    /// Include voided entries.
    pub include_voided: bool,
}

impl EntryFilter {
    /// Every entry linked to a fine, voided ones included.
    #[must_use]
    pub fn for_fine(fine_id: FineId) -> Self {
        Self {
            fine_id: Some(fine_id),
            include_voided: true,
            ..Self::default()
        }
    }

    /// Returns true if the entry passes the filter.
    #[must_use]
    pub fn matches(&self, entry: &LedgerEntry) -> bool {
        let posted_on = entry.posted_at.date_naive();
        self.occupant_id.is_none_or(|id| entry.occupant_id == id)
            && self.term_id.is_none_or(|id| entry.term_id == Some(id))
            && self.category.is_none_or(|c| entry.category == c)
            && self.entry_type.is_none_or(|t| entry.entry_type() == t)
            && self.from.is_none_or(|from| posted_on >= from)
            && self.to.is_none_or(|to| posted_on <= to)
            && self.fine_id.is_none_or(|id| entry.fine_id == Some(id))
            && self.event_id.is_none_or(|id| entry.event_id == Some(id))
            && (self.include_voided || entry.is_active())
    }
}

/// Orders entries newest first, the order every listing uses.
pub fn sort_newest_first(entries: &mut [LedgerEntry]) {
    entries.sort_by(|a, b| b.posted_at.cmp(&a.posted_at).then_with(|| b.id.cmp(&a.id)));
}

/// A lazily paged ledger query.
pub struct EntryQuery<'a> {
    store: &'a dyn EntryStore,
    dorm_id: DormId,
    filter: EntryFilter,
    page_size: u32,
}

impl<'a> EntryQuery<'a> {
    /// Creates a query; nothing is fetched until the stream is polled.
    #[must_use]
    pub fn new(store: &'a dyn EntryStore, dorm_id: DormId, filter: EntryFilter, page_size: u32) -> Self {
        Self {
            store,
            dorm_id,
            filter,
            page_size: page_size.max(1),
        }
    }

    /// Returns the filter.
    #[must_use]
    pub const fn filter(&self) -> &EntryFilter {
        &self.filter
    }

    /// Streams matching entries, newest first, one store page at a time.
    pub fn stream(&self) -> impl Stream<Item = Result<LedgerEntry, StoreError>> + Send + '_ {
        stream::try_unfold(Some(1_u32), move |page: Option<u32>| async move {
            let Some(page) = page else {
                return Ok::<_, StoreError>(None);
            };
            let request = PageRequest {
                page,
                per_page: self.page_size,
            };
            let rows = self
                .store
                .fetch_entries(self.dorm_id, &self.filter, request)
                .await?;
            if rows.is_empty() {
                return Ok(None);
            }
            let full_page = rows.len() >= usize::try_from(self.page_size).unwrap_or(usize::MAX);
            let next = full_page.then_some(page + 1);
            Ok(Some((
                stream::iter(rows.into_iter().map(Ok::<_, StoreError>)),
                next,
            )))
        })
        .try_flatten()
    }

    /// Drains the stream into a vector.
    ///
    /// # Errors
    ///
    /// Returns the first store error encountered.
    pub async fn collect(&self) -> Result<Vec<LedgerEntry>, StoreError> {
        self.stream().try_collect().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{Posting, VoidInfo};
    use crate::store::MemoryStore;
    use chrono::{Duration, TimeZone, Utc};
    use futures::StreamExt;
    use rust_decimal_macros::dec;
    use warden_shared::types::{Amount, LedgerEntryId, UserId};

    fn entry(dorm_id: DormId, occupant_id: OccupantId, minutes: i64) -> LedgerEntry {
        LedgerEntry {
            id: LedgerEntryId::new(),
            dorm_id,
            occupant_id,
            term_id: None,
            category: LedgerCategory::Maintenance,
            posting: Posting::Charge(Amount::new(dec!(100)).unwrap()),
            event_id: None,
            fine_id: None,
            note: None,
            method: None,
            metadata: serde_json::json!({}),
            posted_at: Utc.with_ymd_and_hms(2026, 9, 1, 8, 0, 0).unwrap()
                + Duration::minutes(minutes),
            created_by: None,
            void: None,
        }
    }

    async fn seeded(count: i64) -> (MemoryStore, DormId, OccupantId) {
        let store = MemoryStore::new();
        let dorm = DormId::new();
        let occupant = OccupantId::new();
        for i in 0..count {
            store.insert_entry(&entry(dorm, occupant, i)).await.unwrap();
        }
        (store, dorm, occupant)
    }

    #[tokio::test]
    async fn test_stream_spans_pages_newest_first() {
        let (store, dorm, _) = seeded(7).await;
        let query = EntryQuery::new(&store, dorm, EntryFilter::default(), 3);

        let rows = query.collect().await.unwrap();
        assert_eq!(rows.len(), 7);
        assert!(rows.windows(2).all(|w| w[0].posted_at >= w[1].posted_at));
    }

    #[tokio::test]
    async fn test_stream_is_restartable() {
        let (store, dorm, _) = seeded(4).await;
        let query = EntryQuery::new(&store, dorm, EntryFilter::default(), 2);

        let first: Vec<_> = query.stream().take(1).collect().await;
        assert_eq!(first.len(), 1);
        assert_eq!(query.collect().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_exact_page_boundary_terminates() {
        let (store, dorm, _) = seeded(4).await;
        let query = EntryQuery::new(&store, dorm, EntryFilter::default(), 2);
        assert_eq!(query.collect().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_voided_excluded_by_default() {
        let (store, dorm, occupant) = seeded(2).await;
        let extra = entry(dorm, occupant, 99);
        store.insert_entry(&extra).await.unwrap();
        store
            .void_entries(dorm, &[extra.id], &VoidInfo::now(UserId::new(), "dup"))
            .await
            .unwrap();

        let active = EntryQuery::new(&store, dorm, EntryFilter::default(), 10);
        assert_eq!(active.collect().await.unwrap().len(), 2);

        let all = EntryQuery::new(
            &store,
            dorm,
            EntryFilter {
                include_voided: true,
                ..EntryFilter::default()
            },
            10,
        );
        assert_eq!(all.collect().await.unwrap().len(), 3);
    }

    #[test]
    fn test_filter_date_range_is_inclusive() {
        let e = entry(DormId::new(), OccupantId::new(), 0);
        let day = e.posted_at.date_naive();
        let filter = EntryFilter {
            from: Some(day),
            to: Some(day),
            ..EntryFilter::default()
        };
        assert!(filter.matches(&e));
    }
}
