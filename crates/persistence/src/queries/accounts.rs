// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Account and session queries.

use diesel::SqliteConnection;
use diesel::dsl::count;
use diesel::prelude::*;
use tracing::debug;

use crate::data_models::{AccountData, SessionData};
use crate::diesel_schema::{accounts, sessions};
use crate::error::PersistenceError;

/// Diesel Queryable struct for account rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = accounts)]
struct AccountRow {
    account_id: String,
    email: String,
    name: String,
    password_hash: String,
    role: String,
    email_notifications: i32,
    created_at: String,
}

impl From<AccountRow> for AccountData {
    fn from(row: AccountRow) -> Self {
        Self {
            account_id: row.account_id,
            email: row.email,
            name: row.name,
            password_hash: row.password_hash,
            role: row.role,
            email_notifications: row.email_notifications != 0,
            created_at: row.created_at,
        }
    }
}

/// Diesel Queryable struct for session rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = sessions)]
struct SessionRow {
    session_id: i64,
    session_token: String,
    account_id: String,
    created_at: String,
    last_activity_at: String,
    expires_at: String,
}

/// Retrieves an account by its (already normalized) email.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if no account has this email.
pub fn get_account_by_email(
    conn: &mut SqliteConnection,
    email: &str,
) -> Result<Option<AccountData>, PersistenceError> {
    debug!("Looking up account by email: {}", email);

    let result: Result<AccountRow, diesel::result::Error> = accounts::table
        .filter(accounts::email.eq(email))
        .select(AccountRow::as_select())
        .first(conn);

    match result {
        Ok(row) => Ok(Some(row.into())),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Retrieves an account by id.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if no account has this id.
pub fn get_account_by_id(
    conn: &mut SqliteConnection,
    account_id: &str,
) -> Result<Option<AccountData>, PersistenceError> {
    let result: Result<AccountRow, diesel::result::Error> = accounts::table
        .filter(accounts::account_id.eq(account_id))
        .select(AccountRow::as_select())
        .first(conn);

    match result {
        Ok(row) => Ok(Some(row.into())),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Counts accounts holding the given role.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_accounts_with_role(
    conn: &mut SqliteConnection,
    role: &str,
) -> Result<i64, PersistenceError> {
    let total: i64 = accounts::table
        .filter(accounts::role.eq(role))
        .select(count(accounts::account_id))
        .first(conn)?;

    debug!("Accounts with role {}: {}", role, total);
    Ok(total)
}

/// Retrieves a session by token.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the token is unknown.
pub fn get_session_by_token(
    conn: &mut SqliteConnection,
    session_token: &str,
) -> Result<Option<SessionData>, PersistenceError> {
    let result: Result<SessionRow, diesel::result::Error> = sessions::table
        .filter(sessions::session_token.eq(session_token))
        .select(SessionRow::as_select())
        .first(conn);

    match result {
        Ok(row) => Ok(Some(SessionData {
            session_id: row.session_id,
            session_token: row.session_token,
            account_id: row.account_id,
            created_at: row.created_at,
            last_activity_at: row.last_activity_at,
            expires_at: row.expires_at,
        })),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Verifies a password against a stored bcrypt hash.
///
/// # Errors
///
/// Returns an error if the hash cannot be parsed.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, PersistenceError> {
    bcrypt::verify(password, password_hash)
        .map_err(|e| PersistenceError::PasswordHashing(e.to_string()))
}
