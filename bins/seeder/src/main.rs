//! Database seeder for Warden development and testing.
//!
//! Seeds a demo dorm with occupants, fine rules, maintenance fees, fines,
//! an event with contributions, an approved expense, a cleaning week, and
//! evaluation scores. Ledger rows go through the engine so every entry is
//! paired and audited exactly as the API would write it.
//!
//! Usage: cargo run --bin seeder

use std::sync::Arc;

use anyhow::Context;
use chrono::{Datelike, Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;
use warden_core::fines::{CreateFineRuleInput, IssueFineInput, Severity};
use warden_core::ledger::{CategoryAliases, EntryType, LedgerCategory, RecordEntryInput};
use warden_core::occupants::{EnrollOccupantInput, Occupant};
use warden_core::{ActorContext, Engine, Role};
use warden_db::SeaStore;
use warden_db::entities::{
    cleaning_assignments, cleaning_weeks, dorms, evaluation_scores, events, expenses,
    sea_orm_active_enums::ExpenseStatus,
};
use warden_shared::types::{DormId, EventId, UserId};
use warden_shared::{LedgerConfig, ReceiptConfig};

/// Demo dorm ID (consistent for all seeds)
const DEMO_DORM_ID: &str = "00000000-0000-0000-0000-000000000001";
/// Demo admin user ID (consistent for all seeds)
const DEMO_ADMIN_ID: &str = "00000000-0000-0000-0000-000000000002";

const OCCUPANTS: [(&str, &str); 4] = [
    ("Andrea Santos", "2023-00114"),
    ("Benjie Cruz", "2023-00391"),
    ("Carla Reyes", "2024-00027"),
    ("Dante Villanueva", "2024-00452"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

    println!("Connecting to database...");
    let db = warden_db::connect(&database_url)
        .await
        .context("failed to connect to database")?;

    let dorm_id = DormId::from_uuid(Uuid::parse_str(DEMO_DORM_ID)?);
    if dorms::Entity::find_by_id(dorm_id.into_inner())
        .one(&db)
        .await?
        .is_some()
    {
        println!("Demo dorm already exists, skipping...");
        return Ok(());
    }

    println!("Seeding demo dorm...");
    dorms::ActiveModel {
        id: Set(dorm_id.into_inner()),
        name: Set("Narra Residence Hall".to_string()),
        created_at: Set(Utc::now().into()),
    }
    .insert(&db)
    .await?;

    let store = Arc::new(SeaStore::new(db.clone(), CategoryAliases::default()));
    let receipts = ReceiptConfig {
        dorm_name: "Narra Residence Hall".to_string(),
        signature: Some("Dorm Adviser".to_string()),
    };
    let engine = Engine::new(store, &LedgerConfig::default(), &receipts)?;
    let admin = ActorContext::new(
        UserId::from_uuid(Uuid::parse_str(DEMO_ADMIN_ID)?),
        dorm_id,
        Role::Admin,
    );

    let term = engine.ensure_active_term(&admin).await?;
    println!("  Active term: {}", term.label);

    println!("Seeding occupants...");
    let mut occupants = Vec::with_capacity(OCCUPANTS.len());
    for (name, student_id) in OCCUPANTS {
        let occupant = engine
            .enroll_occupant(
                &admin,
                EnrollOccupantInput {
                    display_name: name.to_string(),
                    student_id: Some(student_id.to_string()),
                    email: Some(email_for(name)),
                    user_id: None,
                },
            )
            .await?;
        occupants.push(occupant);
    }
    println!("  Enrolled {} occupants", occupants.len());

    seed_maintenance_fees(&engine, &admin, &occupants).await?;
    seed_fines(&engine, &admin, &occupants).await?;
    seed_event(&db, &engine, &admin, term.id.into_inner(), &occupants).await?;
    seed_records(&db, dorm_id, term.id.into_inner(), &occupants).await?;

    println!("Seeding complete!");
    Ok(())
}

fn email_for(name: &str) -> String {
    let handle: String = name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(".")
        .to_lowercase();
    format!("{handle}@up.edu.ph")
}

fn entry(
    occupant: &Occupant,
    category: LedgerCategory,
    entry_type: EntryType,
    amount: Decimal,
    note: &str,
) -> RecordEntryInput {
    RecordEntryInput {
        occupant_id: occupant.id,
        category,
        entry_type,
        amount,
        note: Some(note.to_string()),
        method: (entry_type == EntryType::Payment).then(|| "cash".to_string()),
        event_id: None,
        fine_id: None,
        metadata: None,
    }
}

/// Charges every occupant the term fee; the first two pay in full, the third pays half.
async fn seed_maintenance_fees(
    engine: &Engine,
    admin: &ActorContext,
    occupants: &[Occupant],
) -> anyhow::Result<()> {
    println!("Seeding maintenance fees...");
    let fee = Decimal::from(1500);
    for (i, occupant) in occupants.iter().enumerate() {
        let charge = entry(occupant, LedgerCategory::Maintenance, EntryType::Charge, fee, "Term maintenance fee");
        engine.record_transaction(admin, charge).await?;

        let paid = match i {
            0 | 1 => fee,
            2 => Decimal::from(750),
            _ => continue,
        };
        let payment = entry(occupant, LedgerCategory::Maintenance, EntryType::Payment, paid, "Maintenance fee payment");
        engine.record_transaction(admin, payment).await?;
    }
    println!("  Posted fees for {} occupants", occupants.len());
    Ok(())
}

async fn seed_fines(
    engine: &Engine,
    admin: &ActorContext,
    occupants: &[Occupant],
) -> anyhow::Result<()> {
    println!("Seeding fine rules and fines...");
    let rules = [
        ("Curfew violation", Severity::Minor, 50, 1),
        ("Unauthorized visitor", Severity::Major, 200, 3),
        ("Missed cleaning duty", Severity::Minor, 30, 1),
    ];
    let mut created = Vec::with_capacity(rules.len());
    for (title, severity, pesos, points) in rules {
        let rule = engine
            .create_fine_rule(
                admin,
                CreateFineRuleInput {
                    title: title.to_string(),
                    description: None,
                    severity,
                    default_pesos: Decimal::from(pesos),
                    default_points: points,
                },
            )
            .await?;
        created.push(rule);
    }

    let mut issued = 0;
    for (occupant, rule) in occupants.iter().skip(1).zip(&created) {
        engine
            .issue_fine(
                admin,
                IssueFineInput {
                    occupant_id: occupant.id,
                    rule_id: Some(rule.id),
                    note: Some(format!("Seeded: {}", rule.title)),
                    ..Default::default()
                },
            )
            .await?;
        issued += 1;
    }
    println!("  Created {} rules and issued {issued} fines", created.len());
    Ok(())
}

/// Creates an event in a week's time and charges everyone a contribution.
async fn seed_event(
    db: &DatabaseConnection,
    engine: &Engine,
    admin: &ActorContext,
    term_id: Uuid,
    occupants: &[Occupant],
) -> anyhow::Result<()> {
    println!("Seeding event contributions...");
    let event_id = Uuid::now_v7();
    events::ActiveModel {
        id: Set(event_id),
        dorm_id: Set(admin.dorm_id.into_inner()),
        term_id: Set(Some(term_id)),
        title: Set("Dorm Acquaintance Night".to_string()),
        description: Set(Some("Welcome party for new residents".to_string())),
        starts_at: Set((Utc::now() + Duration::days(7)).into()),
        location: Set(Some("Narra Lobby".to_string())),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await?;

    let share = Decimal::from(120);
    for (i, occupant) in occupants.iter().enumerate() {
        let mut charge = entry(occupant, LedgerCategory::Contributions, EntryType::Charge, share, "Acquaintance Night share");
        charge.event_id = Some(EventId::from_uuid(event_id));
        engine.record_transaction(admin, charge).await?;
        if i % 2 == 0 {
            let mut payment = entry(occupant, LedgerCategory::Contributions, EntryType::Payment, share, "Acquaintance Night share");
            payment.event_id = Some(EventId::from_uuid(event_id));
            engine.record_transaction(admin, payment).await?;
        }
    }
    println!("  Charged {} contributions", occupants.len());
    Ok(())
}

/// Seeds the records overrides and reports read: an expense, a cleaning week, and scores.
async fn seed_records(
    db: &DatabaseConnection,
    dorm_id: DormId,
    term_id: Uuid,
    occupants: &[Occupant],
) -> anyhow::Result<()> {
    println!("Seeding expenses, cleaning roster, and evaluations...");
    let dorm = dorm_id.into_inner();

    expenses::ActiveModel {
        id: Set(Uuid::now_v7()),
        dorm_id: Set(dorm),
        term_id: Set(Some(term_id)),
        description: Set("Cleaning supplies".to_string()),
        amount: Set(Decimal::from(850)),
        status: Set(ExpenseStatus::Approved),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await?;

    let today = Utc::now().date_naive();
    let week_start = today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
    let week_id = Uuid::now_v7();
    cleaning_weeks::ActiveModel {
        id: Set(week_id),
        dorm_id: Set(dorm),
        week_start: Set(week_start),
        rest_level: Set(Some(2)),
    }
    .insert(db)
    .await?;

    let areas = ["Lobby", "Kitchen", "Hallway", "Study Room"];
    for (occupant, area) in occupants.iter().zip(areas) {
        cleaning_assignments::ActiveModel {
            id: Set(Uuid::now_v7()),
            dorm_id: Set(dorm),
            week_id: Set(week_id),
            area: Set(area.to_string()),
            occupant_id: Set(occupant.id.into_inner()),
        }
        .insert(db)
        .await?;
    }

    for (i, occupant) in occupants.iter().enumerate() {
        let score = Decimal::from(95) - Decimal::from(i * 7);
        evaluation_scores::ActiveModel {
            id: Set(Uuid::now_v7()),
            dorm_id: Set(dorm),
            occupant_id: Set(occupant.id.into_inner()),
            term_id: Set(Some(term_id)),
            criterion: Set("Room inspection".to_string()),
            score: Set(score),
            max_score: Set(Decimal::from(100)),
            comment: Set(None),
            recorded_at: Set(Utc::now().into()),
        }
        .insert(db)
        .await?;
    }
    println!("  Seeded 1 expense, {} cleaning assignments, {} scores", areas.len(), occupants.len());
    Ok(())
}
