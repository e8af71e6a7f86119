// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Opening and configuring `SQLite` connections.
//!
//! A connection is usable once [`open`] returns: pragmas are applied,
//! pending migrations have run, and foreign key enforcement has been
//! confirmed.

use diesel::prelude::*;
use diesel::sql_types::Integer;
use diesel::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info};

use crate::error::PersistenceError;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// How long a writer waits on a locked database before giving up.
const BUSY_TIMEOUT_MS: u32 = 5_000;

/// Storage flavour of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    /// Shared-cache in-memory database.
    Memory,
    /// On-disk database, journaled with WAL.
    File,
}

#[derive(QueryableByName)]
struct ForeignKeysPragma {
    #[diesel(sql_type = Integer)]
    foreign_keys: i32,
}

/// Opens `url`, configures it for `storage`, and brings the schema up to date.
///
/// # Errors
///
/// Returns an error if the connection cannot be established, a pragma
/// fails, a migration fails, or foreign keys remain disabled.
pub fn open(url: &str, storage: Storage) -> Result<SqliteConnection, PersistenceError> {
    info!(url, ?storage, "Opening SQLite database");

    let mut conn: SqliteConnection = SqliteConnection::establish(url)
        .map_err(|e| PersistenceError::ConnectionFailed(e.to_string()))?;

    let mut pragmas: Vec<String> = vec![
        String::from("PRAGMA foreign_keys = ON"),
        format!("PRAGMA busy_timeout = {BUSY_TIMEOUT_MS}"),
    ];
    if storage == Storage::File {
        pragmas.push(String::from("PRAGMA journal_mode = WAL"));
    }
    // Diesel has no DSL for pragmas
    for pragma in &pragmas {
        diesel::sql_query(pragma.as_str())
            .execute(&mut conn)
            .map_err(|e| PersistenceError::PragmaFailed(format!("{pragma}: {e}")))?;
    }

    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| PersistenceError::MigrationFailed(e.to_string()))?;
    debug!(count = applied.len(), "Migrations applied");

    verify_foreign_key_enforcement(&mut conn)?;
    Ok(conn)
}

/// Confirms `PRAGMA foreign_keys` is on for this connection.
///
/// Favorites and sessions rely on cascading deletes.
///
/// # Errors
///
/// Returns `ForeignKeyEnforcementNotEnabled` if it is off.
pub fn verify_foreign_key_enforcement(conn: &mut SqliteConnection) -> Result<(), PersistenceError> {
    let row: ForeignKeysPragma = diesel::sql_query("PRAGMA foreign_keys").get_result(conn)?;

    if row.foreign_keys == 0 {
        return Err(PersistenceError::ForeignKeyEnforcementNotEnabled);
    }
    Ok(())
}
