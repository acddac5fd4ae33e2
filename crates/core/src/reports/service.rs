//! Report generation service.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use warden_shared::types::{EventId, FineRuleId, OccupantId};

use crate::clearance::{CategoryBreakdown, CategoryTotals};
use crate::fines::{Fine, FineRule};
use crate::ledger::{EntryType, LedgerCategory, LedgerEntry};
use crate::occupants::Occupant;

use super::error::ReportError;
use super::types::{METADATA_SHEET, ReportContext, ReportData, ReportFilter, ReportKey, Sheet, Workbook};

const UNKNOWN: &str = "(unknown)";

/// Service for generating tabular reports.
pub struct ReportService;

impl ReportService {
    /// Builds the workbook for a report key.
    ///
    /// Every workbook ends with a metadata sheet recording the report name,
    /// dorm, date range, and generation time.
    pub fn build(
        key: ReportKey,
        context: &ReportContext,
        filter: &ReportFilter,
        data: &ReportData,
    ) -> Result<Workbook, ReportError> {
        filter.validate()?;

        let lookup = Lookup::new(data);
        let mut sheets = match key {
            ReportKey::FinesLedger => fines_ledger(filter, data, &lookup),
            ReportKey::OccupantStatement => {
                let occupant_id = filter
                    .occupant_id
                    .ok_or(ReportError::OccupantRequired(key.as_str()))?;
                occupant_statement(occupant_id, filter, data, &lookup)
            }
            ReportKey::MaintenanceLedger => maintenance_ledger(filter, data, &lookup),
            ReportKey::EventContributions => event_contributions(filter, data, &lookup),
            ReportKey::EvaluationRankings => evaluation_rankings(filter, data, &lookup),
        };
        sheets.push(metadata(key, context, filter, &lookup));

        Ok(Workbook { report: key, sheets })
    }
}

struct Lookup<'a> {
    occupants: HashMap<OccupantId, &'a Occupant>,
    rules: HashMap<FineRuleId, &'a FineRule>,
    events: HashMap<EventId, String>,
}

impl<'a> Lookup<'a> {
    fn new(data: &'a ReportData) -> Self {
        Self {
            occupants: data.occupants.iter().map(|o| (o.id, o)).collect(),
            rules: data.rules.iter().map(|r| (r.id, r)).collect(),
            events: data.events.iter().map(|e| (e.id, e.title.clone())).collect(),
        }
    }

    fn name(&self, id: OccupantId) -> String {
        self.occupants
            .get(&id)
            .map_or_else(|| UNKNOWN.to_string(), |o| o.display_name.clone())
    }

    fn student_id(&self, id: OccupantId) -> String {
        self.occupants
            .get(&id)
            .and_then(|o| o.student_id.clone())
            .unwrap_or_default()
    }

    fn event(&self, id: Option<EventId>) -> String {
        id.map_or_else(String::new, |id| {
            self.events
                .get(&id)
                .cloned()
                .unwrap_or_else(|| UNKNOWN.to_string())
        })
    }
}

fn money(value: Decimal) -> String {
    format!("{:.2}", value.round_dp(2))
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

fn text(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

fn entries_in<'a>(
    data: &'a ReportData,
    filter: &'a ReportFilter,
    category: Option<LedgerCategory>,
) -> Vec<&'a LedgerEntry> {
    let mut entries: Vec<&LedgerEntry> = data
        .entries
        .iter()
        .filter(|e| {
            e.is_active()
                && category.is_none_or(|c| e.category == c)
                && filter.covers(e.posted_at.date_naive())
                && filter.includes_occupant(e.occupant_id)
        })
        .collect();
    entries.sort_by_key(|e| (e.posted_at, e.id));
    entries
}

fn fines_in<'a>(data: &'a ReportData, filter: &ReportFilter) -> Vec<&'a Fine> {
    let mut fines: Vec<&Fine> = data
        .fines
        .iter()
        .filter(|f| filter.covers(f.issued_at.date_naive()) && filter.includes_occupant(f.occupant_id))
        .collect();
    fines.sort_by_key(|f| (f.issued_at, f.id));
    fines
}

fn entry_sheet(name: &str, entries: &[&LedgerEntry], lookup: &Lookup<'_>) -> Sheet {
    let mut sheet = Sheet::new(
        name,
        &["Posted At", "Occupant", "Type", "Amount", "Method", "Note"],
    );
    for entry in entries {
        sheet.push(vec![
            timestamp(entry.posted_at),
            lookup.name(entry.occupant_id),
            entry.entry_type().as_str().to_string(),
            money(entry.amount().value()),
            text(entry.method.as_deref()),
            text(entry.note.as_deref()),
        ]);
    }
    sheet
}

fn totals_row(label: String, totals: &CategoryTotals) -> Vec<String> {
    vec![
        label,
        money(totals.charged),
        money(totals.paid),
        money(totals.balance),
    ]
}

fn fines_ledger(filter: &ReportFilter, data: &ReportData, lookup: &Lookup<'_>) -> Vec<Sheet> {
    let mut fines = Sheet::new(
        "Fines",
        &[
            "Issued At",
            "Occupant",
            "Student ID",
            "Rule",
            "Severity",
            "Pesos",
            "Points",
            "Note",
            "Status",
            "Void Reason",
        ],
    );
    for fine in fines_in(data, filter) {
        let rule = fine.rule_id.and_then(|id| lookup.rules.get(&id));
        fines.push(vec![
            timestamp(fine.issued_at),
            lookup.name(fine.occupant_id),
            lookup.student_id(fine.occupant_id),
            rule.map(|r| r.title.clone()).unwrap_or_default(),
            rule.map(|r| r.severity.as_str().to_string()).unwrap_or_default(),
            money(fine.pesos.value()),
            fine.points.to_string(),
            text(fine.note.as_deref()),
            fine.status().as_str().to_string(),
            text(fine.void.as_ref().map(|v| v.reason.as_str())),
        ]);
    }

    let entries = entries_in(data, filter, Some(LedgerCategory::Fines));
    vec![fines, entry_sheet("Ledger", &entries, lookup)]
}

fn occupant_statement(
    occupant_id: OccupantId,
    filter: &ReportFilter,
    data: &ReportData,
    lookup: &Lookup<'_>,
) -> Vec<Sheet> {
    let entries = entries_in(data, filter, None);

    let mut breakdown = CategoryBreakdown::default();
    let mut ledger = Sheet::new(
        "Entries",
        &[
            "Posted At",
            "Category",
            "Type",
            "Amount",
            "Running Balance",
            "Method",
            "Note",
        ],
    );
    let mut running = Decimal::ZERO;
    for entry in entries.iter().filter(|e| e.occupant_id == occupant_id) {
        breakdown.add(entry);
        running += entry.signed_amount();
        ledger.push(vec![
            timestamp(entry.posted_at),
            entry.category.label().to_string(),
            entry.entry_type().as_str().to_string(),
            money(entry.amount().value()),
            money(running),
            text(entry.method.as_deref()),
            text(entry.note.as_deref()),
        ]);
    }

    let mut summary = Sheet::new("Summary", &["Category", "Charged", "Paid", "Balance"]);
    for category in LedgerCategory::ALL {
        summary.push(totals_row(
            category.label().to_string(),
            breakdown.get(category),
        ));
    }
    summary.push(totals_row("Total".to_string(), &breakdown.total()));

    let mut fines = Sheet::new(
        "Fines",
        &["Issued At", "Rule", "Pesos", "Points", "Status", "Note"],
    );
    for fine in fines_in(data, filter)
        .into_iter()
        .filter(|f| f.occupant_id == occupant_id)
    {
        fines.push(vec![
            timestamp(fine.issued_at),
            fine.rule_id
                .and_then(|id| lookup.rules.get(&id))
                .map(|r| r.title.clone())
                .unwrap_or_default(),
            money(fine.pesos.value()),
            fine.points.to_string(),
            fine.status().as_str().to_string(),
            text(fine.note.as_deref()),
        ]);
    }

    vec![summary, ledger, fines]
}

fn maintenance_ledger(filter: &ReportFilter, data: &ReportData, lookup: &Lookup<'_>) -> Vec<Sheet> {
    let entries = entries_in(data, filter, Some(LedgerCategory::Maintenance));

    let mut per_occupant: HashMap<OccupantId, CategoryTotals> = HashMap::new();
    for entry in &entries {
        per_occupant.entry(entry.occupant_id).or_default().add(entry);
    }

    let mut occupants: Vec<&Occupant> = data
        .occupants
        .iter()
        .filter(|o| filter.includes_occupant(o.id))
        .filter(|o| o.is_active() || per_occupant.contains_key(&o.id))
        .collect();
    occupants.sort_by(|a, b| a.display_name.cmp(&b.display_name).then(a.id.cmp(&b.id)));

    let mut balances = Sheet::new(
        "Balances",
        &["Occupant", "Student ID", "Status", "Charged", "Paid", "Balance"],
    );
    for occupant in occupants {
        let totals = per_occupant.get(&occupant.id).copied().unwrap_or_default();
        balances.push(vec![
            occupant.display_name.clone(),
            text(occupant.student_id.as_deref()),
            occupant.status.as_str().to_string(),
            money(totals.charged),
            money(totals.paid),
            money(totals.balance),
        ]);
    }

    vec![balances, entry_sheet("Entries", &entries, lookup)]
}

fn event_contributions(filter: &ReportFilter, data: &ReportData, lookup: &Lookup<'_>) -> Vec<Sheet> {
    let entries = entries_in(data, filter, Some(LedgerCategory::Contributions));

    let mut per_event: BTreeMap<Option<EventId>, (CategoryTotals, HashSet<OccupantId>)> =
        BTreeMap::new();
    for entry in &entries {
        let (totals, payers) = per_event.entry(entry.event_id).or_default();
        totals.add(entry);
        if entry.entry_type() == EntryType::Payment {
            payers.insert(entry.occupant_id);
        }
    }

    let mut events = Sheet::new(
        "Events",
        &["Event", "Starts At", "Charged", "Paid", "Balance", "Contributors"],
    );
    let mut ordered: Vec<_> = data.events.iter().collect();
    ordered.sort_by_key(|e| (e.starts_at, e.id));
    for event in ordered {
        let (totals, payers) = per_event.remove(&Some(event.id)).unwrap_or_default();
        events.push(vec![
            event.title.clone(),
            timestamp(event.starts_at),
            money(totals.charged),
            money(totals.paid),
            money(totals.balance),
            payers.len().to_string(),
        ]);
    }
    for (event_id, (totals, payers)) in per_event {
        let label = match event_id {
            Some(_) => lookup.event(event_id),
            None => "(no event)".to_string(),
        };
        events.push(vec![
            label,
            String::new(),
            money(totals.charged),
            money(totals.paid),
            money(totals.balance),
            payers.len().to_string(),
        ]);
    }

    let mut detail = Sheet::new(
        "Entries",
        &[
            "Posted At",
            "Event",
            "Occupant",
            "Type",
            "Amount",
            "Payable Deadline",
            "Method",
            "Note",
        ],
    );
    for entry in &entries {
        detail.push(vec![
            timestamp(entry.posted_at),
            lookup.event(entry.event_id),
            lookup.name(entry.occupant_id),
            entry.entry_type().as_str().to_string(),
            money(entry.amount().value()),
            entry
                .payable_deadline()
                .map(|d| d.to_string())
                .unwrap_or_default(),
            text(entry.method.as_deref()),
            text(entry.note.as_deref()),
        ]);
    }

    vec![events, detail]
}

fn evaluation_rankings(filter: &ReportFilter, data: &ReportData, lookup: &Lookup<'_>) -> Vec<Sheet> {
    #[derive(Default)]
    struct Tally {
        criteria: usize,
        score: Decimal,
        max: Decimal,
    }

    let mut tallies: HashMap<OccupantId, Tally> = HashMap::new();
    for score in data.scores.iter().filter(|s| {
        filter.covers(s.recorded_at.date_naive()) && filter.includes_occupant(s.occupant_id)
    }) {
        let tally = tallies.entry(score.occupant_id).or_default();
        tally.criteria += 1;
        tally.score += score.score;
        tally.max += score.max_score;
    }

    let mut ranked: Vec<(OccupantId, String, Decimal, Tally)> = tallies
        .into_iter()
        .map(|(id, tally)| {
            let percent = if tally.max.is_zero() {
                Decimal::ZERO
            } else {
                (tally.score * Decimal::ONE_HUNDRED / tally.max).round_dp(2)
            };
            (id, lookup.name(id), percent, tally)
        })
        .collect();
    ranked.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| a.1.cmp(&b.1)).then(a.0.cmp(&b.0)));

    let mut sheet = Sheet::new(
        "Rankings",
        &[
            "Rank",
            "Occupant",
            "Student ID",
            "Criteria",
            "Score",
            "Max Score",
            "Percent",
        ],
    );
    let mut rank = 0;
    let mut previous: Option<Decimal> = None;
    for (position, (id, name, percent, tally)) in ranked.into_iter().enumerate() {
        if previous != Some(percent) {
            rank = position + 1;
            previous = Some(percent);
        }
        sheet.push(vec![
            rank.to_string(),
            name,
            lookup.student_id(id),
            tally.criteria.to_string(),
            money(tally.score),
            money(tally.max),
            money(percent),
        ]);
    }

    vec![sheet]
}

fn metadata(key: ReportKey, context: &ReportContext, filter: &ReportFilter, lookup: &Lookup<'_>) -> Sheet {
    let date = |d: Option<chrono::NaiveDate>| d.map(|d| d.to_string()).unwrap_or_default();
    let mut sheet = Sheet::new(METADATA_SHEET, &["Field", "Value"]);
    let rows = [
        ("Report", key.as_str().to_string()),
        ("Dorm", context.dorm_name.clone()),
        ("Dorm ID", context.dorm_id.to_string()),
        ("From", date(filter.from)),
        ("To", date(filter.to)),
        (
            "Occupant",
            filter.occupant_id.map(|id| lookup.name(id)).unwrap_or_default(),
        ),
        ("Generated At", context.generated_at.to_rfc3339()),
    ];
    for (field, value) in rows {
        sheet.push(vec![field.to_string(), value]);
    }
    sheet
}
