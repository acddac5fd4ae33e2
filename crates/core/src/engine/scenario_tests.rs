//! Engine scenarios against the in-memory store.

use std::collections::HashMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use warden_shared::LedgerConfig;
use warden_shared::types::{Amount, EventId, FineId, LedgerEntryId, OccupantId, PageRequest};

use crate::access::Role;
use crate::audit::{AuditAction, AuditFilter};
use crate::clearance::ClearanceOrder;
use crate::error::EngineError;
use crate::fines::{CreateFineRuleInput, FineFilter, IssueFineInput, Severity, UpdateFineRuleInput};
use crate::ledger::{EntryFilter, EntryType, LedgerCategory};
use crate::records::Event;
use crate::reports::{ReportFilter, ReportKey};
use crate::store::{EntryStore, FailPoint, FineStore};

use super::fixtures::{Harness, assert_paired, record};

#[tokio::test]
async fn test_ensure_active_term_is_idempotent() {
    let h = Harness::new();
    let actor = h.actor(Role::Treasurer);

    let first = h.engine.ensure_active_term(&actor).await.unwrap();
    let second = h.engine.ensure_active_term(&actor).await.unwrap();

    assert_eq!(first.id, second.id);
}

#[tokio::test]
async fn test_no_active_term_without_auto_create() {
    let h = Harness::with_config(&LedgerConfig {
        auto_create_term: false,
        ..LedgerConfig::default()
    });

    let err = h.engine.ensure_active_term(&h.admin()).await.unwrap_err();
    assert!(matches!(err, EngineError::NoActiveTerm));
}

#[tokio::test]
async fn test_issue_fine_updates_dashboard_and_balance() {
    let h = Harness::new();
    let occupant = h.enroll("Ana").await;
    let before = h.engine.dashboard_stats(&h.admin()).await.unwrap();

    let outcome = h
        .engine
        .issue_fine(
            &h.actor(Role::StudentAssistant),
            IssueFineInput {
                occupant_id: occupant.id,
                pesos: Some(dec!(150)),
                points: Some(2),
                ..IssueFineInput::default()
            },
        )
        .await
        .unwrap();
    assert!(outcome.ledger_synced);
    assert_eq!(outcome.entry.as_ref().unwrap().note.as_deref(), Some("Fine: Violation"));

    let after = h.engine.dashboard_stats(&h.admin()).await.unwrap();
    assert_eq!(after.total_fines_active, before.total_fines_active + 1);
    assert_eq!(after.totals.fines.charged - before.totals.fines.charged, dec!(150));
    assert_eq!(h.balance_of(occupant.id).await, dec!(150));
    assert_paired(&outcome.fine, &h.fine_entries(&outcome.fine).await);
}

#[tokio::test]
async fn test_payment_clears_fine_balance() {
    let h = Harness::new();
    let occupant = h.enroll("Ana").await;
    h.fine(occupant.id, dec!(150)).await;

    h.post(occupant.id, LedgerCategory::Fines, EntryType::Payment, dec!(150))
        .await;

    let report = h.engine.occupant_report(&h.admin(), occupant.id).await.unwrap();
    assert_eq!(report.balance, Decimal::ZERO);
    assert!(report.is_cleared);
    assert_eq!(report.breakdown.fines.paid, dec!(150));
}

#[tokio::test]
async fn test_void_fine_voids_charge_but_not_payment() {
    let h = Harness::new();
    let occupant = h.enroll("Ana").await;
    let fine = h.fine(occupant.id, dec!(150)).await;
    let payment = h
        .post(occupant.id, LedgerCategory::Fines, EntryType::Payment, dec!(150))
        .await;

    let outcome = h
        .engine
        .void_fine(&h.actor(Role::Adviser), fine.id, "issued in error")
        .await
        .unwrap();
    assert_eq!(outcome.entries_voided, 1);
    assert!(outcome.ledger_synced);

    let stats = h.engine.dashboard_stats(&h.admin()).await.unwrap();
    assert_eq!(stats.totals.fines.charged, Decimal::ZERO);
    assert_eq!(stats.total_fines_active, 0);

    // The unlinked payment survives and is voided on its own.
    assert_eq!(h.balance_of(occupant.id).await, dec!(-150));
    h.engine
        .void_entry(&h.admin(), payment.id, "refunded")
        .await
        .unwrap();
    assert_eq!(h.balance_of(occupant.id).await, Decimal::ZERO);
}

#[tokio::test]
async fn test_void_fine_twice_is_noop() {
    let h = Harness::new();
    let occupant = h.enroll("Ana").await;
    let fine = h.fine(occupant.id, dec!(80)).await;
    let sa = h.actor(Role::StudentAssistant);

    h.engine.void_fine(&sa, fine.id, "duplicate").await.unwrap();
    let second = h.engine.void_fine(&sa, fine.id, "duplicate").await.unwrap();

    assert!(!second.changed);
    assert_eq!(second.entries_voided, 0);
}

#[tokio::test]
async fn test_payment_cannot_link_to_voided_fine() {
    let h = Harness::new();
    let ana = h.enroll("Ana").await;
    let fine = h.fine(ana.id, dec!(150)).await;
    h.engine
        .void_fine(&h.admin(), fine.id, "issued in error")
        .await
        .unwrap();

    let mut payment = record(ana.id, LedgerCategory::Fines, EntryType::Payment, dec!(150));
    payment.fine_id = Some(fine.id);
    let err = h
        .engine
        .record_transaction(&h.admin(), payment)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));

    // Nothing was posted, so a full reconcile has nothing to touch.
    assert_eq!(h.balance_of(ana.id).await, Decimal::ZERO);
    let report = h.engine.reconcile_fines(&h.admin(), true).await.unwrap();
    assert_eq!(report.entries_voided, 0);
    assert_eq!(h.balance_of(ana.id).await, Decimal::ZERO);
}

#[tokio::test]
async fn test_linked_payment_to_active_fine_survives_reconcile() {
    let h = Harness::new();
    let ana = h.enroll("Ana").await;
    let fine = h.fine(ana.id, dec!(150)).await;

    let mut payment = record(ana.id, LedgerCategory::Fines, EntryType::Payment, dec!(150));
    payment.fine_id = Some(fine.id);
    h.engine.record_transaction(&h.admin(), payment).await.unwrap();
    assert_eq!(h.balance_of(ana.id).await, Decimal::ZERO);

    let report = h.engine.reconcile_fines(&h.admin(), true).await.unwrap();
    assert_eq!(report.entries_voided, 0);
    assert_eq!(h.balance_of(ana.id).await, Decimal::ZERO);
}

#[tokio::test]
async fn test_reassign_plain_entry_moves_one_row() {
    let h = Harness::new();
    let a = h.enroll("Ana").await;
    let b = h.enroll("Ben").await;
    let entry = h
        .post(a.id, LedgerCategory::Maintenance, EntryType::Charge, dec!(1500))
        .await;
    h.post(a.id, LedgerCategory::Maintenance, EntryType::Charge, dec!(200))
        .await;

    let outcome = h
        .engine
        .override_ledger_entry_owner(
            &h.admin(),
            crate::overrides::EntryOwnerOverride {
                entry_id: entry.id,
                occupant_id: b.id,
                reason: "posted to the wrong room".to_string(),
            },
        )
        .await
        .unwrap();

    assert_eq!(outcome.rows_affected, 1);
    assert_eq!(h.balance_of(a.id).await, dec!(200));
    assert_eq!(h.balance_of(b.id).await, dec!(1500));
}

#[tokio::test]
async fn test_reassign_fine_entry_moves_all_linked_rows() {
    let h = Harness::new();
    let a = h.enroll("Ana").await;
    let b = h.enroll("Ben").await;
    let fine = h.fine(a.id, dec!(300)).await;
    for amount in [dec!(100), dec!(50)] {
        let mut input = record(a.id, LedgerCategory::Fines, EntryType::Payment, amount);
        input.fine_id = Some(fine.id);
        h.engine.record_transaction(&h.admin(), input).await.unwrap();
    }
    let charge = h
        .fine_entries(&fine)
        .await
        .into_iter()
        .find(|e| e.entry_type() == EntryType::Charge)
        .unwrap();

    let outcome = h
        .engine
        .override_ledger_entry_owner(
            &h.admin(),
            crate::overrides::EntryOwnerOverride {
                entry_id: charge.id,
                occupant_id: b.id,
                reason: "wrong occupant fined".to_string(),
            },
        )
        .await
        .unwrap();

    // Three entries plus the fine itself.
    assert_eq!(outcome.rows_affected, 4);
    assert!(h.fine_entries(&fine).await.iter().all(|e| e.occupant_id == b.id));
    let moved = h.engine.occupant_report(&h.admin(), b.id).await.unwrap();
    assert_eq!(moved.balance, dec!(150));
    assert_eq!(moved.fines.len(), 1);
    assert_eq!(h.balance_of(a.id).await, Decimal::ZERO);
}

#[tokio::test]
async fn test_occupant_cannot_issue_fine() {
    let h = Harness::new();
    let occupant = h.enroll("Ana").await;

    let err = h
        .engine
        .issue_fine(
            &h.actor(Role::Occupant),
            IssueFineInput {
                occupant_id: occupant.id,
                pesos: Some(dec!(150)),
                ..IssueFineInput::default()
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::Forbidden(_)));
}

#[tokio::test]
async fn test_zero_entries_means_cleared() {
    let h = Harness::new();
    let ana = h.enroll("Ana").await;
    let ben = h.enroll("Ben").await;
    h.post(ben.id, LedgerCategory::Maintenance, EntryType::Charge, dec!(500))
        .await;

    let rows = h
        .engine
        .clearance_list(&h.admin(), ClearanceOrder::WorstFirst)
        .await
        .unwrap();

    assert_eq!(rows[0].occupant_id, ben.id);
    let ana_row = rows.iter().find(|r| r.occupant_id == ana.id).unwrap();
    assert_eq!(ana_row.balance, Decimal::ZERO);
    assert!(ana_row.is_cleared);
}

#[tokio::test]
async fn test_no_cross_category_netting_except_total() {
    let h = Harness::new();
    let ana = h.enroll("Ana").await;
    h.post(ana.id, LedgerCategory::Maintenance, EntryType::Charge, dec!(100))
        .await;
    h.post(ana.id, LedgerCategory::Contributions, EntryType::Payment, dec!(100))
        .await;

    let report = h.engine.occupant_report(&h.admin(), ana.id).await.unwrap();
    assert_eq!(report.breakdown.maintenance.balance, dec!(100));
    assert_eq!(report.breakdown.contributions.balance, dec!(-100));
    assert_eq!(report.balance, Decimal::ZERO);
    assert!(report.is_cleared);
}

#[tokio::test]
async fn test_dashboard_collectibles_and_cash_on_hand() {
    let h = Harness::new();
    let ana = h.enroll("Ana").await;
    h.post(ana.id, LedgerCategory::Maintenance, EntryType::Charge, dec!(1500))
        .await;
    h.post(ana.id, LedgerCategory::Maintenance, EntryType::Payment, dec!(1000))
        .await;
    h.store
        .add_expense(crate::records::Expense {
            id: warden_shared::types::ExpenseId::new(),
            dorm_id: h.dorm_id,
            term_id: None,
            description: "Cleaning supplies".to_string(),
            amount: Amount::new(dec!(300)).unwrap(),
            status: crate::records::ExpenseStatus::Approved,
            created_at: chrono::Utc::now(),
        })
        .unwrap();

    let stats = h.engine.dashboard_stats(&h.admin()).await.unwrap();
    assert_eq!(stats.collectibles, stats.total_charged - stats.total_paid);
    assert_eq!(stats.collectibles, dec!(500));
    assert_eq!(stats.cash_on_hand, dec!(700));
    assert_eq!(stats.active_occupants, 1);
    assert_eq!(stats.cleared_occupants, 0);
}

#[tokio::test]
async fn test_void_entry_twice_equals_once() {
    let h = Harness::new();
    let ana = h.enroll("Ana").await;
    let entry = h
        .post(ana.id, LedgerCategory::Maintenance, EntryType::Charge, dec!(100))
        .await;

    let first = h.engine.void_entry(&h.admin(), entry.id, "typo").await.unwrap();
    let second = h.engine.void_entry(&h.admin(), entry.id, "typo").await.unwrap();

    assert!(first.changed);
    assert!(!second.changed);
    assert_eq!(first.entry.void, second.entry.void);
    let voids = h
        .engine
        .audit_log(
            &h.admin(),
            AuditFilter {
                action: Some(AuditAction::LedgerVoid),
                ..AuditFilter::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(voids.len(), 1);
}

#[tokio::test]
async fn test_void_entry_unknown_or_other_dorm() {
    let h = Harness::new();
    let ana = h.enroll("Ana").await;
    let entry = h
        .post(ana.id, LedgerCategory::Maintenance, EntryType::Charge, dec!(100))
        .await;

    let err = h
        .engine
        .void_entry(&h.admin(), LedgerEntryId::new(), "typo")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));

    let other = Harness::new();
    let foreign = crate::access::ActorContext::new(
        warden_shared::types::UserId::new(),
        other.dorm_id,
        Role::Admin,
    );
    let err = h
        .engine
        .void_entry(&foreign, entry.id, "typo")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[tokio::test]
async fn test_void_requires_reason_and_category_role() {
    let h = Harness::new();
    let ana = h.enroll("Ana").await;
    let entry = h
        .post(ana.id, LedgerCategory::Maintenance, EntryType::Charge, dec!(100))
        .await;

    let err = h.engine.void_entry(&h.admin(), entry.id, "  ").await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));

    let err = h
        .engine
        .void_entry(&h.actor(Role::Treasurer), entry.id, "typo")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}

#[tokio::test]
async fn test_fine_charge_cannot_be_voided_directly() {
    let h = Harness::new();
    let ana = h.enroll("Ana").await;
    let fine = h.fine(ana.id, dec!(100)).await;
    let charge = h.fine_entries(&fine).await.remove(0);

    let err = h
        .engine
        .void_entry(&h.admin(), charge.id, "typo")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
}

#[tokio::test]
async fn test_record_validation() {
    let h = Harness::new();
    let ana = h.enroll("Ana").await;
    let ben = h.enroll("Ben").await;
    let fine = h.fine(ben.id, dec!(100)).await;

    let err = h
        .engine
        .record_transaction(
            &h.admin(),
            record(ana.id, LedgerCategory::Maintenance, EntryType::Charge, dec!(-5)),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));

    let err = h
        .engine
        .record_transaction(
            &h.admin(),
            record(OccupantId::new(), LedgerCategory::Maintenance, EntryType::Charge, dec!(5)),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));

    let mut foreign_fine = record(ana.id, LedgerCategory::Fines, EntryType::Payment, dec!(5));
    foreign_fine.fine_id = Some(fine.id);
    let err = h
        .engine
        .record_transaction(&h.admin(), foreign_fine)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "fine belongs to another occupant");

    let mut missing_fine = record(ana.id, LedgerCategory::Fines, EntryType::Payment, dec!(5));
    missing_fine.fine_id = Some(FineId::new());
    let err = h
        .engine
        .record_transaction(&h.admin(), missing_fine)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));

    let mut missing_event = record(ana.id, LedgerCategory::Contributions, EntryType::Charge, dec!(5));
    missing_event.event_id = Some(EventId::new());
    let err = h
        .engine
        .record_transaction(&h.admin(), missing_event)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[tokio::test]
async fn test_removed_occupant_cannot_be_charged() {
    let h = Harness::new();
    let ana = h.enroll("Ana").await;
    h.engine
        .override_occupant(
            &h.admin(),
            crate::overrides::OccupantOverride {
                occupant_id: ana.id,
                status: Some(crate::occupants::OccupantStatus::Removed),
                reason: "duplicate record".to_string(),
                ..crate::overrides::OccupantOverride::default()
            },
        )
        .await
        .unwrap();

    let err = h
        .engine
        .record_transaction(
            &h.admin(),
            record(ana.id, LedgerCategory::Maintenance, EntryType::Charge, dec!(5)),
        )
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "occupant has been removed");
}

#[tokio::test]
async fn test_recorded_entries_are_term_stamped_and_listed() {
    let h = Harness::new();
    let ana = h.enroll("Ana").await;
    let term = h.engine.ensure_active_term(&h.admin()).await.unwrap();
    for amount in [dec!(10), dec!(20), dec!(30)] {
        let entry = h
            .post(ana.id, LedgerCategory::Contributions, EntryType::Charge, amount)
            .await;
        assert_eq!(entry.term_id, Some(term.id));
    }

    let page = h
        .engine
        .list_entries(
            &h.actor(Role::Officer),
            &EntryFilter::default(),
            PageRequest::new(1, 2),
        )
        .await
        .unwrap();
    assert_eq!(page.data.len(), 2);
    assert_eq!(page.meta.total, 3);
    assert_eq!(page.meta.total_pages, 2);

    let err = h
        .engine
        .list_entries(&h.actor(Role::Occupant), &EntryFilter::default(), PageRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}

#[tokio::test]
async fn test_fine_charge_failure_flags_fine_and_reconcile_repairs() {
    let h = Harness::new();
    let ana = h.enroll("Ana").await;

    h.store.fail_on(FailPoint::InsertEntry);
    let outcome = h
        .engine
        .issue_fine(
            &h.actor(Role::StudentAssistant),
            IssueFineInput {
                occupant_id: ana.id,
                pesos: Some(dec!(120)),
                ..IssueFineInput::default()
            },
        )
        .await
        .unwrap();
    h.store.clear_failure(FailPoint::InsertEntry);

    assert!(!outcome.ledger_synced);
    assert!(outcome.entry.is_none());
    assert!(outcome.fine.needs_reconciliation);
    let stats = h.engine.dashboard_stats(&h.admin()).await.unwrap();
    assert_eq!(stats.fines_needing_reconciliation, 1);

    let report = h.engine.reconcile_fines(&h.admin(), false).await.unwrap();
    assert_eq!(report.fines_checked, 1);
    assert_eq!(report.fines_repaired, 1);
    assert_eq!(report.charges_posted, 1);
    assert_eq!(report.failures, 0);

    let fine = h.store.get_fine(h.dorm_id, outcome.fine.id).await.unwrap().unwrap();
    assert!(!fine.needs_reconciliation);
    assert_paired(&fine, &h.fine_entries(&fine).await);
    assert_eq!(h.balance_of(ana.id).await, dec!(120));
}

#[tokio::test]
async fn test_void_fine_ledger_failure_is_flagged() {
    let h = Harness::new();
    let ana = h.enroll("Ana").await;
    let fine = h.fine(ana.id, dec!(75)).await;

    h.store.fail_on(FailPoint::VoidEntries);
    let outcome = h
        .engine
        .void_fine(&h.admin(), fine.id, "appeal granted")
        .await
        .unwrap();
    h.store.clear_failure(FailPoint::VoidEntries);

    assert!(!outcome.ledger_synced);
    assert!(outcome.fine.needs_reconciliation);
    // The stale charge still counts until reconciliation runs.
    assert_eq!(h.balance_of(ana.id).await, dec!(75));

    let report = h.engine.reconcile_fines(&h.admin(), false).await.unwrap();
    assert_eq!(report.entries_voided, 1);
    assert_eq!(h.balance_of(ana.id).await, Decimal::ZERO);
}

#[tokio::test]
async fn test_reconcile_all_repairs_amount_drift_and_duplicates() {
    let h = Harness::new();
    let ana = h.enroll("Ana").await;
    let fine = h.fine(ana.id, dec!(100)).await;
    let charge = h.fine_entries(&fine).await.remove(0);

    h.store
        .update_entry_amount(h.dorm_id, charge.id, Amount::new(dec!(90)).unwrap())
        .await
        .unwrap();
    let mut duplicate = charge.clone();
    duplicate.id = LedgerEntryId::new();
    duplicate.posted_at += chrono::Duration::seconds(1);
    h.store.insert_entry(&duplicate).await.unwrap();

    let flagged_only = h.engine.reconcile_fines(&h.admin(), false).await.unwrap();
    assert_eq!(flagged_only.fines_checked, 0);

    let report = h.engine.reconcile_fines(&h.admin(), true).await.unwrap();
    assert_eq!(report.charges_patched, 1);
    assert_eq!(report.entries_voided, 1);
    assert_paired(&fine, &h.fine_entries(&fine).await);

    let again = h.engine.reconcile_fines(&h.admin(), true).await.unwrap();
    assert_eq!(again.fines_repaired, 0);
}

#[tokio::test]
async fn test_audit_failure_does_not_block_mutation() {
    let h = Harness::new();
    let ana = h.enroll("Ana").await;

    h.store.fail_on(FailPoint::AppendAudit);
    let entry = h
        .engine
        .record_transaction(
            &h.admin(),
            record(ana.id, LedgerCategory::Maintenance, EntryType::Charge, dec!(10)),
        )
        .await;
    h.store.clear_failure(FailPoint::AppendAudit);

    assert!(entry.is_ok());
    assert_eq!(h.engine.audit_failures(), 1);
}

#[tokio::test]
async fn test_fine_rules_fill_defaults() {
    let h = Harness::new();
    let ana = h.enroll("Ana").await;
    let sa = h.actor(Role::StudentAssistant);

    let rule = h
        .engine
        .create_fine_rule(
            &sa,
            CreateFineRuleInput {
                title: "Noise after curfew".to_string(),
                description: None,
                severity: Severity::Minor,
                default_pesos: dec!(50),
                default_points: 1,
            },
        )
        .await
        .unwrap();

    let outcome = h
        .engine
        .issue_fine(
            &sa,
            IssueFineInput {
                occupant_id: ana.id,
                rule_id: Some(rule.id),
                ..IssueFineInput::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(outcome.fine.pesos.value(), dec!(50));
    assert_eq!(outcome.fine.points, 1);
    assert_eq!(
        outcome.entry.unwrap().note.as_deref(),
        Some("Fine: Noise after curfew")
    );

    h.engine.deactivate_fine_rule(&sa, rule.id).await.unwrap();
    let err = h
        .engine
        .issue_fine(
            &sa,
            IssueFineInput {
                occupant_id: ana.id,
                rule_id: Some(rule.id),
                ..IssueFineInput::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "fine rule is inactive");

    let active = h.engine.list_fine_rules(&sa, false).await.unwrap();
    assert!(active.is_empty());
    assert_eq!(h.engine.list_fine_rules(&sa, true).await.unwrap().len(), 1);

    let err = h
        .engine
        .update_fine_rule(&sa, rule.id, UpdateFineRuleInput::default())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NoChangesProvided));
}

#[tokio::test]
async fn test_fine_without_rule_or_pesos_rejected() {
    let h = Harness::new();
    let ana = h.enroll("Ana").await;

    let err = h
        .engine
        .issue_fine(
            &h.admin(),
            IssueFineInput {
                occupant_id: ana.id,
                ..IssueFineInput::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
}

#[tokio::test]
async fn test_every_active_fine_is_paired() {
    let h = Harness::new();
    let ana = h.enroll("Ana").await;
    let ben = h.enroll("Ben").await;
    let mut fines = Vec::new();
    for (occupant, pesos) in [(&ana, dec!(10)), (&ben, dec!(0)), (&ana, dec!(250.5))] {
        fines.push(h.fine(occupant.id, pesos).await);
    }
    h.engine
        .void_fine(&h.admin(), fines[0].id, "appeal granted")
        .await
        .unwrap();

    let active = h
        .engine
        .list_fines(&h.admin(), &FineFilter::default())
        .await
        .unwrap();
    assert_eq!(active.len(), 2);
    for fine in &active {
        assert_paired(fine, &h.fine_entries(fine).await);
    }
    let voided = h.fine_entries(&fines[0]).await;
    assert!(voided.iter().all(|e| !e.is_active()));
}

#[tokio::test]
async fn test_occupant_sees_only_own_report() {
    let h = Harness::new();
    let user = warden_shared::types::UserId::new();
    let ana = h
        .engine
        .enroll_occupant(
            &h.admin(),
            crate::occupants::EnrollOccupantInput {
                display_name: "Ana".to_string(),
                student_id: None,
                email: None,
                user_id: Some(user),
            },
        )
        .await
        .unwrap();
    let ben = h.enroll("Ben").await;
    let me = crate::access::ActorContext::new(user, h.dorm_id, Role::Occupant);

    assert!(h.engine.occupant_report(&me, ana.id).await.is_ok());
    let err = h.engine.occupant_report(&me, ben.id).await.unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
    assert!(h.engine.dashboard_stats(&me).await.is_err());
}

#[tokio::test]
async fn test_occupant_cannot_tell_missing_from_foreign_records() {
    let h = Harness::new();
    let ben = h.enroll("Ben").await;
    let me = h.actor(Role::Occupant);
    let nobody = OccupantId::new();

    for id in [ben.id, nobody] {
        let err = h.engine.occupant_report(&me, id).await.unwrap_err();
        assert!(matches!(err, EngineError::Forbidden(_)));

        let statement = ReportFilter {
            occupant_id: Some(id),
            ..ReportFilter::default()
        };
        let err = h
            .engine
            .generate_report(&me, ReportKey::OccupantStatement, statement)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Forbidden(_)));
    }

    let err = h.engine.occupant_report(&h.admin(), nobody).await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[tokio::test]
async fn test_preview_receipt_for_payment() {
    let h = Harness::new();
    let ana = h.enroll("Ana").await;
    let charge = h
        .post(ana.id, LedgerCategory::Maintenance, EntryType::Charge, dec!(1250))
        .await;
    let payment = h
        .post(ana.id, LedgerCategory::Maintenance, EntryType::Payment, dec!(1250))
        .await;

    let draft = h.engine.preview_receipt(&h.admin(), payment.id).await.unwrap();
    assert_eq!(draft.to.as_deref(), Some("ana@example.edu"));
    assert!(draft.subject.starts_with("Molave Hall"));

    let err = h.engine.preview_receipt(&h.admin(), charge.id).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
}

#[tokio::test]
async fn test_generate_report_defaults_to_term_and_checks_access() {
    let h = Harness::new();
    let ana = h.enroll("Ana").await;
    h.fine(ana.id, dec!(150)).await;

    let workbook = h
        .engine
        .generate_report(
            &h.actor(Role::StudentAssistant),
            ReportKey::FinesLedger,
            ReportFilter::default(),
        )
        .await
        .unwrap();
    assert_eq!(workbook.sheet("Fines").unwrap().rows.len(), 1);
    let term = h.engine.ensure_active_term(&h.admin()).await.unwrap();
    let metadata: HashMap<&str, &str> = workbook
        .sheet("Metadata")
        .unwrap()
        .rows
        .iter()
        .map(|r| (r[0].as_str(), r[1].as_str()))
        .collect();
    assert_eq!(metadata["From"], term.starts_on.to_string());
    assert_eq!(metadata["Dorm"], "Molave Hall");

    let err = h
        .engine
        .generate_report(
            &h.actor(Role::Treasurer),
            ReportKey::FinesLedger,
            ReportFilter::default(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let err = h
        .engine
        .generate_report(&h.admin(), ReportKey::OccupantStatement, ReportFilter::default())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
}

#[tokio::test]
async fn test_contribution_linked_to_event() {
    let h = Harness::new();
    let ana = h.enroll("Ana").await;
    let event = Event {
        id: EventId::new(),
        dorm_id: h.dorm_id,
        term_id: None,
        title: "Foundation Day".to_string(),
        description: None,
        starts_at: chrono::Utc::now(),
        location: None,
        created_at: chrono::Utc::now(),
    };
    h.store.add_event(event.clone()).unwrap();

    let mut input = record(ana.id, LedgerCategory::Contributions, EntryType::Charge, dec!(100));
    input.event_id = Some(event.id);
    let entry = h
        .engine
        .record_transaction(&h.actor(Role::EventOfficer), input)
        .await
        .unwrap();
    assert_eq!(entry.event_id, Some(event.id));

    let err = h
        .engine
        .record_transaction(
            &h.actor(Role::EventOfficer),
            record(ana.id, LedgerCategory::Maintenance, EntryType::Charge, dec!(100)),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}
