//! Active term resolution function.
//!
//! `ensure_active_semester` finds or creates the dorm's active term in one
//! statement, so concurrent callers always agree on a single row.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(ENSURE_ACTIVE_SEMESTER_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            "DROP FUNCTION IF EXISTS ensure_active_semester(UUID, VARCHAR, DATE, DATE);",
        )
        .await?;
        Ok(())
    }
}

const ENSURE_ACTIVE_SEMESTER_SQL: &str = r"
CREATE OR REPLACE FUNCTION ensure_active_semester(
    p_dorm_id UUID,
    p_label VARCHAR,
    p_starts_on DATE,
    p_ends_on DATE
) RETURNS UUID AS $$
DECLARE
    v_term_id UUID;
BEGIN
    SELECT id INTO v_term_id
    FROM terms
    WHERE dorm_id = p_dorm_id AND status = 'active';

    IF v_term_id IS NOT NULL THEN
        RETURN v_term_id;
    END IF;

    -- A concurrent caller may win the partial unique index; re-read on conflict.
    INSERT INTO terms (id, dorm_id, label, starts_on, ends_on, status)
    VALUES (gen_random_uuid(), p_dorm_id, p_label, p_starts_on, p_ends_on, 'active')
    ON CONFLICT (dorm_id) WHERE status = 'active' DO NOTHING
    RETURNING id INTO v_term_id;

    IF v_term_id IS NULL THEN
        SELECT id INTO v_term_id
        FROM terms
        WHERE dorm_id = p_dorm_id AND status = 'active';
    END IF;

    RETURN v_term_id;
END;
$$ LANGUAGE plpgsql;
";
