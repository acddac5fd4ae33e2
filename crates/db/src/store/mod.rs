//! Postgres implementation of the engine's store ports.
//!
//! Every port method maps onto a single SQL statement (or a read followed by
//! one write for single-row updates), matching the per-statement atomicity
//! the engine assumes. Ledger names are normalized through
//! [`CategoryAliases`] on the way out, so legacy alias rows read back as
//! canonical categories.

mod audit;
mod convert;
mod entries;
mod fines;
mod occupants;
mod records;
mod terms;

use sea_orm::{DatabaseConnection, DbErr, SqlErr};
use warden_core::StoreError;
use warden_core::ledger::CategoryAliases;

/// A [`Store`](warden_core::Store) backed by Postgres through `SeaORM`.
#[derive(Debug, Clone)]
pub struct SeaStore {
    db: DatabaseConnection,
    aliases: CategoryAliases,
}

impl SeaStore {
    /// Creates a store over an open connection.
    #[must_use]
    pub const fn new(db: DatabaseConnection, aliases: CategoryAliases) -> Self {
        Self { db, aliases }
    }

    /// Returns the underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

/// Maps a `SeaORM` error onto the port's error type.
pub(crate) fn store_err(err: DbErr) -> StoreError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg) | SqlErr::ForeignKeyConstraintViolation(msg)) => {
            return StoreError::Conflict(msg);
        }
        _ => {}
    }
    match err {
        DbErr::ConnectionAcquire(e) => StoreError::Unavailable(e.to_string()),
        DbErr::Conn(e) => StoreError::Unavailable(e.to_string()),
        DbErr::RecordNotUpdated => StoreError::Conflict("record does not exist".to_string()),
        DbErr::RecordNotFound(what) => StoreError::Conflict(format!("{what} does not exist")),
        other => StoreError::Database(other.to_string()),
    }
}

/// Maps a missing row on a full-row update onto the same error the memory store returns.
pub(crate) fn update_err(err: DbErr, what: &str) -> StoreError {
    match err {
        DbErr::RecordNotUpdated => StoreError::Conflict(format!("{what} does not exist")),
        other => store_err(other),
    }
}
