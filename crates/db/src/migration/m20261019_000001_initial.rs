//! Initial database migration.
//!
//! Creates the enums, tables, and indexes behind the store ports.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: DORMS, TERMS & OCCUPANTS
        // ============================================================
        db.execute_unprepared(DORMS_SQL).await?;
        db.execute_unprepared(TERMS_SQL).await?;
        db.execute_unprepared(OCCUPANTS_SQL).await?;

        // ============================================================
        // PART 3: COLLABORATOR RECORDS
        // ============================================================
        db.execute_unprepared(EVENTS_SQL).await?;
        db.execute_unprepared(EXPENSES_SQL).await?;
        db.execute_unprepared(CLEANING_SQL).await?;
        db.execute_unprepared(EVALUATIONS_SQL).await?;

        // ============================================================
        // PART 4: FINES & LEDGER
        // ============================================================
        db.execute_unprepared(FINES_SQL).await?;
        db.execute_unprepared(LEDGER_ENTRIES_SQL).await?;

        // ============================================================
        // PART 5: AUDIT
        // ============================================================
        db.execute_unprepared(AUDIT_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
CREATE TYPE term_status AS ENUM ('planned', 'active', 'archived');
CREATE TYPE occupant_status AS ENUM ('active', 'left', 'removed');
CREATE TYPE entry_type AS ENUM ('charge', 'payment');
CREATE TYPE fine_severity AS ENUM ('minor', 'major', 'grave');
CREATE TYPE expense_status AS ENUM ('pending', 'approved', 'rejected');
";

const DORMS_SQL: &str = r"
CREATE TABLE dorms (
    id UUID PRIMARY KEY,
    name VARCHAR(200) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const TERMS_SQL: &str = r"
CREATE TABLE terms (
    id UUID PRIMARY KEY,
    dorm_id UUID NOT NULL REFERENCES dorms(id) ON DELETE CASCADE,
    label VARCHAR(100) NOT NULL,
    starts_on DATE NOT NULL,
    ends_on DATE NOT NULL,
    status term_status NOT NULL DEFAULT 'planned',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_term_range CHECK (starts_on <= ends_on)
);

-- At most one active term per dorm
CREATE UNIQUE INDEX uq_terms_one_active ON terms(dorm_id) WHERE status = 'active';

CREATE INDEX idx_terms_dorm ON terms(dorm_id, starts_on DESC);
";

const OCCUPANTS_SQL: &str = r"
CREATE TABLE occupants (
    id UUID PRIMARY KEY,
    dorm_id UUID NOT NULL REFERENCES dorms(id) ON DELETE CASCADE,
    user_id UUID,
    display_name VARCHAR(200) NOT NULL,
    student_id VARCHAR(50),
    email VARCHAR(254),
    status occupant_status NOT NULL DEFAULT 'active',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_occupants_dorm ON occupants(dorm_id, display_name);
CREATE INDEX idx_occupants_user ON occupants(user_id) WHERE user_id IS NOT NULL;
";

const EVENTS_SQL: &str = r"
CREATE TABLE events (
    id UUID PRIMARY KEY,
    dorm_id UUID NOT NULL REFERENCES dorms(id) ON DELETE CASCADE,
    term_id UUID REFERENCES terms(id),
    title VARCHAR(200) NOT NULL,
    description TEXT,
    starts_at TIMESTAMPTZ NOT NULL,
    location VARCHAR(200),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_events_dorm ON events(dorm_id, starts_at);
";

const EXPENSES_SQL: &str = r"
CREATE TABLE expenses (
    id UUID PRIMARY KEY,
    dorm_id UUID NOT NULL REFERENCES dorms(id) ON DELETE CASCADE,
    term_id UUID REFERENCES terms(id),
    description VARCHAR(500) NOT NULL,
    amount NUMERIC(14, 2) NOT NULL CHECK (amount >= 0),
    status expense_status NOT NULL DEFAULT 'pending',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_expenses_dorm ON expenses(dorm_id) WHERE status = 'approved';
";

const CLEANING_SQL: &str = r"
CREATE TABLE cleaning_weeks (
    id UUID PRIMARY KEY,
    dorm_id UUID NOT NULL REFERENCES dorms(id) ON DELETE CASCADE,
    week_start DATE NOT NULL,
    rest_level INTEGER CHECK (rest_level IS NULL OR rest_level >= 1),
    UNIQUE (dorm_id, week_start)
);

CREATE TABLE cleaning_assignments (
    id UUID PRIMARY KEY,
    dorm_id UUID NOT NULL REFERENCES dorms(id) ON DELETE CASCADE,
    week_id UUID NOT NULL REFERENCES cleaning_weeks(id) ON DELETE CASCADE,
    area VARCHAR(100) NOT NULL,
    occupant_id UUID NOT NULL REFERENCES occupants(id)
);

CREATE INDEX idx_cleaning_assignments_week ON cleaning_assignments(week_id);
";

const EVALUATIONS_SQL: &str = r"
CREATE TABLE evaluation_scores (
    id UUID PRIMARY KEY,
    dorm_id UUID NOT NULL REFERENCES dorms(id) ON DELETE CASCADE,
    occupant_id UUID NOT NULL REFERENCES occupants(id),
    term_id UUID REFERENCES terms(id),
    criterion VARCHAR(200) NOT NULL,
    score NUMERIC(6, 2) NOT NULL,
    max_score NUMERIC(6, 2) NOT NULL,
    comment TEXT,
    recorded_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_score_range CHECK (score >= 0 AND score <= max_score)
);

CREATE INDEX idx_evaluation_scores_dorm ON evaluation_scores(dorm_id, occupant_id);
";

const FINES_SQL: &str = r"
CREATE TABLE fine_rules (
    id UUID PRIMARY KEY,
    dorm_id UUID NOT NULL REFERENCES dorms(id) ON DELETE CASCADE,
    title VARCHAR(200) NOT NULL,
    description TEXT,
    severity fine_severity NOT NULL,
    default_pesos NUMERIC(14, 2) NOT NULL CHECK (default_pesos >= 0),
    default_points INTEGER NOT NULL DEFAULT 0 CHECK (default_points >= 0),
    active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_fine_rules_dorm ON fine_rules(dorm_id, title) WHERE active = true;

CREATE TABLE fines (
    id UUID PRIMARY KEY,
    dorm_id UUID NOT NULL REFERENCES dorms(id) ON DELETE CASCADE,
    occupant_id UUID NOT NULL REFERENCES occupants(id),
    term_id UUID REFERENCES terms(id),
    rule_id UUID REFERENCES fine_rules(id),
    pesos NUMERIC(14, 2) NOT NULL CHECK (pesos >= 0),
    points INTEGER NOT NULL DEFAULT 0 CHECK (points >= 0),
    note TEXT,
    issued_by UUID NOT NULL,
    issued_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    voided_at TIMESTAMPTZ,
    voided_by UUID,
    void_reason TEXT,
    needs_reconciliation BOOLEAN NOT NULL DEFAULT false,
    CONSTRAINT chk_fine_void CHECK ((voided_at IS NULL) = (voided_by IS NULL))
);

CREATE INDEX idx_fines_occupant ON fines(dorm_id, occupant_id, issued_at DESC);
CREATE INDEX idx_fines_reconcile ON fines(dorm_id) WHERE needs_reconciliation = true;
";

const LEDGER_ENTRIES_SQL: &str = r"
CREATE TABLE ledger_entries (
    id UUID PRIMARY KEY,
    dorm_id UUID NOT NULL REFERENCES dorms(id) ON DELETE CASCADE,
    occupant_id UUID NOT NULL REFERENCES occupants(id),
    term_id UUID REFERENCES terms(id),
    -- Canonical names are maintenance_fee, sa_fines, contributions; legacy
    -- rows may hold aliases, normalized by the application on read.
    ledger VARCHAR(50) NOT NULL,
    entry_type entry_type NOT NULL,
    -- Signed: charges positive, payments negative
    amount NUMERIC(14, 2) NOT NULL,
    event_id UUID REFERENCES events(id),
    fine_id UUID REFERENCES fines(id),
    note TEXT,
    method VARCHAR(50),
    metadata JSONB NOT NULL DEFAULT '{}'::jsonb,
    posted_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    created_by UUID,
    voided_at TIMESTAMPTZ,
    voided_by UUID,
    void_reason TEXT,
    CONSTRAINT chk_entry_void CHECK ((voided_at IS NULL) = (voided_by IS NULL)),
    CONSTRAINT chk_metadata_object CHECK (jsonb_typeof(metadata) = 'object')
);

CREATE INDEX idx_ledger_dorm_posted ON ledger_entries(dorm_id, posted_at DESC, id DESC);
CREATE INDEX idx_ledger_occupant ON ledger_entries(dorm_id, occupant_id) WHERE voided_at IS NULL;
CREATE INDEX idx_ledger_fine ON ledger_entries(fine_id) WHERE fine_id IS NOT NULL;
CREATE INDEX idx_ledger_event ON ledger_entries(event_id) WHERE event_id IS NOT NULL;
";

const AUDIT_SQL: &str = r"
CREATE TABLE audit_events (
    id UUID PRIMARY KEY,
    dorm_id UUID NOT NULL REFERENCES dorms(id) ON DELETE CASCADE,
    actor_id UUID NOT NULL,
    actor_role VARCHAR(50) NOT NULL,
    action VARCHAR(100) NOT NULL,
    entity_type VARCHAR(50) NOT NULL,
    entity_id UUID NOT NULL,
    metadata JSONB NOT NULL DEFAULT '{}'::jsonb,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_audit_dorm_created ON audit_events(dorm_id, created_at DESC, id DESC);
CREATE INDEX idx_audit_entity ON audit_events(entity_type, entity_id);
";

const DROP_ALL_SQL: &str = r"
-- Drop tables (reverse order of creation)
DROP TABLE IF EXISTS audit_events CASCADE;
DROP TABLE IF EXISTS ledger_entries CASCADE;
DROP TABLE IF EXISTS fines CASCADE;
DROP TABLE IF EXISTS fine_rules CASCADE;
DROP TABLE IF EXISTS evaluation_scores CASCADE;
DROP TABLE IF EXISTS cleaning_assignments CASCADE;
DROP TABLE IF EXISTS cleaning_weeks CASCADE;
DROP TABLE IF EXISTS expenses CASCADE;
DROP TABLE IF EXISTS events CASCADE;
DROP TABLE IF EXISTS occupants CASCADE;
DROP TABLE IF EXISTS terms CASCADE;
DROP TABLE IF EXISTS dorms CASCADE;

-- Drop enums
DROP TYPE IF EXISTS expense_status CASCADE;
DROP TYPE IF EXISTS fine_severity CASCADE;
DROP TYPE IF EXISTS entry_type CASCADE;
DROP TYPE IF EXISTS occupant_status CASCADE;
DROP TYPE IF EXISTS term_status CASCADE;
";
