// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Account and session mutations.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::{debug, info};

use crate::diesel_schema::{accounts, sessions};
use crate::error::PersistenceError;
use crate::mutations::generate_id;

/// Creates an account and returns its generated id.
///
/// The email must already be normalized. The password is hashed with
/// bcrypt before it is stored.
///
/// # Errors
///
/// Returns `UniqueViolation` if the email is taken, or another error if
/// hashing or the insert fails.
pub fn create_account(
    conn: &mut SqliteConnection,
    email: &str,
    name: &str,
    password: &str,
    role: &str,
    created_at: &str,
) -> Result<String, PersistenceError> {
    info!("Creating account with email: {}, role: {}", email, role);

    let password_hash: String = bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| PersistenceError::PasswordHashing(e.to_string()))?;

    let account_id: String = generate_id();

    diesel::insert_into(accounts::table)
        .values((
            accounts::account_id.eq(&account_id),
            accounts::email.eq(email),
            accounts::name.eq(name),
            accounts::password_hash.eq(&password_hash),
            accounts::role.eq(role),
            accounts::email_notifications.eq(1),
            accounts::created_at.eq(created_at),
        ))
        .execute(conn)?;

    info!(account_id = %account_id, "Account created");
    Ok(account_id)
}

/// Sets whether an account receives email notifications.
///
/// # Errors
///
/// Returns `NotFound` if no account has this id.
pub fn set_email_notifications(
    conn: &mut SqliteConnection,
    account_id: &str,
    enabled: bool,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(accounts::table.filter(accounts::account_id.eq(account_id)))
        .set(accounts::email_notifications.eq(i32::from(enabled)))
        .execute(conn)?;

    if updated == 0 {
        return Err(PersistenceError::NotFound(format!("Account {account_id}")));
    }

    info!(account_id, enabled, "Email notification preference updated");
    Ok(())
}

/// Creates a session and returns its id.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `session_token` - The unique session token
/// * `account_id` - The owning account
/// * `created_at` - Creation timestamp, also the initial activity stamp
/// * `expires_at` - Expiration timestamp
///
/// # Errors
///
/// Returns an error if the session cannot be created.
pub fn create_session(
    conn: &mut SqliteConnection,
    session_token: &str,
    account_id: &str,
    created_at: &str,
    expires_at: &str,
) -> Result<i64, PersistenceError> {
    debug!(
        "Creating session for account {} expiring at {}",
        account_id, expires_at
    );

    let session_id: i64 = diesel::insert_into(sessions::table)
        .values((
            sessions::session_token.eq(session_token),
            sessions::account_id.eq(account_id),
            sessions::created_at.eq(created_at),
            sessions::last_activity_at.eq(created_at),
            sessions::expires_at.eq(expires_at),
        ))
        .returning(sessions::session_id)
        .get_result(conn)?;

    debug!(session_id, account_id, "Session created");
    Ok(session_id)
}

/// Records activity on a session.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn touch_session(
    conn: &mut SqliteConnection,
    session_id: i64,
    at: &str,
) -> Result<(), PersistenceError> {
    diesel::update(sessions::table.filter(sessions::session_id.eq(session_id)))
        .set(sessions::last_activity_at.eq(at))
        .execute(conn)?;
    Ok(())
}

/// Deletes a session by token. Unknown tokens are ignored.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn delete_session(conn: &mut SqliteConnection, session_token: &str) -> Result<(), PersistenceError> {
    diesel::delete(sessions::table.filter(sessions::session_token.eq(session_token)))
        .execute(conn)?;
    debug!("Session deleted");
    Ok(())
}

/// Deletes every session that expired before `now`.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn delete_expired_sessions(
    conn: &mut SqliteConnection,
    now: &str,
) -> Result<usize, PersistenceError> {
    let deleted: usize =
        diesel::delete(sessions::table.filter(sessions::expires_at.lt(now))).execute(conn)?;

    debug!("Deleted {} expired sessions", deleted);
    Ok(deleted)
}
