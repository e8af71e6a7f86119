// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the Trail France race directory.
//!
//! This crate stores accounts, sessions, races, crowd reports and
//! favorites in `SQLite` through Diesel. Migrations are embedded and run
//! when a connection is opened.
//!
//! ## Timestamps
//!
//! Every instant is stored as fixed-width UTC text
//! (`YYYY-MM-DDTHH:MM:SS.ffffffZ`, see
//! `trail_france_domain::format_timestamp`). Lexical order on these
//! columns is chronological order, which lets the report lookback window
//! be a plain range predicate.
//!
//! Callers pass timestamps in; this crate never reads the clock.
//!
//! ## Testing
//!
//! `Persistence::new_in_memory()` gives each caller its own isolated
//! in-memory database, so tests never share state.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use diesel::SqliteConnection;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use trail_france_domain::{ModerationStatus, Race, RaceDraft, Report, ReportStatus};

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use data_models::{AccountData, ClosureMark, FavoriteData, NewReport, SessionData};
pub use error::PersistenceError;

/// Atomic counter for generating unique in-memory database names.
///
/// Each call to `new_in_memory()` receives a unique sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Persistence adapter over a single `SQLite` connection.
pub struct Persistence {
    conn: SqliteConnection,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives a unique shared-cache database name, so adapters
    /// never see each other's rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url = format!("file:memdb_test_{db_id}?mode=memory&cache=shared");

        let conn: SqliteConnection =
            backend::sqlite::open(&shared_memory_url, backend::sqlite::Storage::Memory)?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InvalidDatabasePath(path.as_ref().display().to_string())
        })?;

        let conn: SqliteConnection =
            backend::sqlite::open(path_str, backend::sqlite::Storage::File)?;

        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        backend::sqlite::verify_foreign_key_enforcement(&mut self.conn)
    }

    // ========================================================================
    // Accounts
    // ========================================================================

    /// Creates an account. The password is hashed before storage.
    ///
    /// # Arguments
    ///
    /// * `email` - Normalized email, unique across accounts
    /// * `name` - Display name
    /// * `password` - Plain-text password
    /// * `role` - `user` or `admin`
    /// * `created_at` - Creation timestamp in storage format
    ///
    /// # Errors
    ///
    /// Returns `UniqueViolation` if the email is already registered.
    pub fn create_account(
        &mut self,
        email: &str,
        name: &str,
        password: &str,
        role: &str,
        created_at: &str,
    ) -> Result<String, PersistenceError> {
        mutations::accounts::create_account(&mut self.conn, email, name, password, role, created_at)
    }

    /// Retrieves an account by normalized email.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_account_by_email(
        &mut self,
        email: &str,
    ) -> Result<Option<AccountData>, PersistenceError> {
        queries::accounts::get_account_by_email(&mut self.conn, email)
    }

    /// Retrieves an account by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_account_by_id(
        &mut self,
        account_id: &str,
    ) -> Result<Option<AccountData>, PersistenceError> {
        queries::accounts::get_account_by_id(&mut self.conn, account_id)
    }

    /// Counts accounts holding a role.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn count_accounts_with_role(&mut self, role: &str) -> Result<i64, PersistenceError> {
        queries::accounts::count_accounts_with_role(&mut self.conn, role)
    }

    /// Sets the account-wide email notification preference.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the account does not exist.
    pub fn set_email_notifications(
        &mut self,
        account_id: &str,
        enabled: bool,
    ) -> Result<(), PersistenceError> {
        mutations::accounts::set_email_notifications(&mut self.conn, account_id, enabled)
    }

    /// Verifies a password against a stored hash.
    ///
    /// # Errors
    ///
    /// Returns an error if password verification fails.
    pub fn verify_password(
        &self,
        password: &str,
        password_hash: &str,
    ) -> Result<bool, PersistenceError> {
        queries::accounts::verify_password(password, password_hash)
    }

    // ========================================================================
    // Session Management
    // ========================================================================

    /// Creates a new session for an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be created.
    pub fn create_session(
        &mut self,
        session_token: &str,
        account_id: &str,
        created_at: &str,
        expires_at: &str,
    ) -> Result<i64, PersistenceError> {
        mutations::accounts::create_session(
            &mut self.conn,
            session_token,
            account_id,
            created_at,
            expires_at,
        )
    }

    /// Retrieves a session by token.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_session_by_token(
        &mut self,
        session_token: &str,
    ) -> Result<Option<SessionData>, PersistenceError> {
        queries::accounts::get_session_by_token(&mut self.conn, session_token)
    }

    /// Updates the last activity timestamp for a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub fn touch_session(&mut self, session_id: i64, at: &str) -> Result<(), PersistenceError> {
        mutations::accounts::touch_session(&mut self.conn, session_id, at)
    }

    /// Deletes a session by token.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub fn delete_session(&mut self, session_token: &str) -> Result<(), PersistenceError> {
        mutations::accounts::delete_session(&mut self.conn, session_token)
    }

    /// Deletes all sessions that expired before `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub fn delete_expired_sessions(&mut self, now: &str) -> Result<usize, PersistenceError> {
        mutations::accounts::delete_expired_sessions(&mut self.conn, now)
    }

    // ========================================================================
    // Races
    // ========================================================================

    /// Inserts a race and returns its generated id.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn insert_race(
        &mut self,
        draft: &RaceDraft,
        status: ModerationStatus,
        submitted_by: Option<&str>,
        created_at: &str,
    ) -> Result<String, PersistenceError> {
        mutations::races::insert_race(&mut self.conn, draft, status, submitted_by, created_at)
    }

    /// Retrieves a race by id, whatever its moderation status.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_race(&mut self, race_id: &str) -> Result<Option<Race>, PersistenceError> {
        queries::races::get_race(&mut self.conn, race_id)
    }

    /// Lists races in a moderation status, ordered by race date.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_races_by_status(
        &mut self,
        status: ModerationStatus,
    ) -> Result<Vec<Race>, PersistenceError> {
        queries::races::list_races_by_status(&mut self.conn, status)
    }

    /// Lists up to `limit` pending races, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_pending_races(&mut self, limit: i64) -> Result<Vec<Race>, PersistenceError> {
        queries::races::list_pending_races(&mut self.conn, limit)
    }

    /// Loads the races with the given ids, skipping unknown ones.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_races_by_ids(&mut self, race_ids: &[String]) -> Result<Vec<Race>, PersistenceError> {
        queries::races::get_races_by_ids(&mut self.conn, race_ids)
    }

    /// Overwrites a race's content.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the race does not exist.
    pub fn update_race_content(
        &mut self,
        race_id: &str,
        draft: &RaceDraft,
    ) -> Result<(), PersistenceError> {
        mutations::races::update_race_content(&mut self.conn, race_id, draft)
    }

    /// Sets a race's moderation status.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the race does not exist.
    pub fn set_moderation_status(
        &mut self,
        race_id: &str,
        status: ModerationStatus,
    ) -> Result<(), PersistenceError> {
        mutations::races::set_moderation_status(&mut self.conn, race_id, status)
    }

    /// Forces a race's registration closed.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the race does not exist.
    pub fn apply_forced_closure(
        &mut self,
        race_id: &str,
        close_date: &str,
        stamped_at: &str,
        mark: ClosureMark<'_>,
    ) -> Result<(), PersistenceError> {
        mutations::races::apply_forced_closure(&mut self.conn, race_id, close_date, stamped_at, mark)
    }

    /// Deletes a race and its favorites.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the race does not exist.
    pub fn delete_race(&mut self, race_id: &str) -> Result<(), PersistenceError> {
        mutations::races::delete_race(&mut self.conn, race_id)
    }

    /// Lists the distinct regions of approved races.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_regions(&mut self) -> Result<Vec<String>, PersistenceError> {
        queries::races::list_regions(&mut self.conn)
    }

    /// Lists the distinct departments of approved races, optionally
    /// restricted to one region.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_departments(
        &mut self,
        region: Option<&str>,
    ) -> Result<Vec<String>, PersistenceError> {
        queries::races::list_departments(&mut self.conn, region)
    }

    // ========================================================================
    // Reports
    // ========================================================================

    /// Inserts a pending report and returns its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn insert_report(&mut self, report: &NewReport) -> Result<i64, PersistenceError> {
        mutations::reports::insert_report(&mut self.conn, report)
    }

    /// Counts a race's pending reports created at or after `window_start`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn count_pending_reports_since(
        &mut self,
        race_id: &str,
        window_start: &str,
    ) -> Result<i64, PersistenceError> {
        queries::reports::count_pending_reports_since(&mut self.conn, race_id, window_start)
    }

    /// Lists all pending reports in submission order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_pending_reports(&mut self) -> Result<Vec<Report>, PersistenceError> {
        queries::reports::list_pending_reports(&mut self.conn)
    }

    /// Lists every report of a race in submission order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    #[cfg(any(test, feature = "testing"))]
    pub fn list_reports_for_race(&mut self, race_id: &str) -> Result<Vec<Report>, PersistenceError> {
        queries::reports::list_reports_for_race(&mut self.conn, race_id)
    }

    /// Moves every pending report of a race to `target`.
    ///
    /// # Returns
    ///
    /// The number of reports modified.
    ///
    /// # Errors
    ///
    /// Returns an error if `target` is not terminal or the update fails.
    pub fn resolve_pending_reports(
        &mut self,
        race_id: &str,
        target: ReportStatus,
        reviewed_by: Option<&str>,
        reviewed_at: &str,
    ) -> Result<usize, PersistenceError> {
        mutations::reports::resolve_pending_reports(
            &mut self.conn,
            race_id,
            target,
            reviewed_by,
            reviewed_at,
        )
    }

    // ========================================================================
    // Favorites
    // ========================================================================

    /// Adds a favorite and returns its id.
    ///
    /// # Errors
    ///
    /// Returns `UniqueViolation` if the race is already a favorite.
    pub fn insert_favorite(
        &mut self,
        account_id: &str,
        race_id: &str,
        notify_on_registration: bool,
        created_at: &str,
    ) -> Result<String, PersistenceError> {
        mutations::favorites::insert_favorite(
            &mut self.conn,
            account_id,
            race_id,
            notify_on_registration,
            created_at,
        )
    }

    /// Retrieves the favorite linking an account to a race.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_favorite(
        &mut self,
        account_id: &str,
        race_id: &str,
    ) -> Result<Option<FavoriteData>, PersistenceError> {
        queries::favorites::get_favorite(&mut self.conn, account_id, race_id)
    }

    /// Removes a favorite. Returns `true` if one was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub fn delete_favorite(&mut self, account_id: &str, race_id: &str) -> Result<bool, PersistenceError> {
        mutations::favorites::delete_favorite(&mut self.conn, account_id, race_id)
    }

    /// Sets a favorite's registration notification flag. Returns `true`
    /// if the favorite exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub fn set_favorite_notify(
        &mut self,
        account_id: &str,
        race_id: &str,
        notify: bool,
    ) -> Result<bool, PersistenceError> {
        mutations::favorites::set_favorite_notify(&mut self.conn, account_id, race_id, notify)
    }

    /// Lists an account's favorites, most recent first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_favorites(&mut self, account_id: &str) -> Result<Vec<FavoriteData>, PersistenceError> {
        queries::favorites::list_favorites(&mut self.conn, account_id)
    }

    /// Lists the emails to notify when a race is approved.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_notification_recipients(
        &mut self,
        race_id: &str,
    ) -> Result<Vec<String>, PersistenceError> {
        queries::favorites::list_notification_recipients(&mut self.conn, race_id)
    }
}
