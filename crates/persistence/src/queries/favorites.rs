// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Favorite queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::debug;

use crate::data_models::FavoriteData;
use crate::diesel_schema::{accounts, favorites};
use crate::error::PersistenceError;

/// Diesel Queryable struct for favorite rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = favorites)]
struct FavoriteRow {
    favorite_id: String,
    account_id: String,
    race_id: String,
    notify_on_registration: i32,
    created_at: String,
}

impl From<FavoriteRow> for FavoriteData {
    fn from(row: FavoriteRow) -> Self {
        Self {
            favorite_id: row.favorite_id,
            account_id: row.account_id,
            race_id: row.race_id,
            notify_on_registration: row.notify_on_registration != 0,
            created_at: row.created_at,
        }
    }
}

/// Retrieves the favorite linking an account to a race.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the account has not favorited the race.
pub fn get_favorite(
    conn: &mut SqliteConnection,
    account_id: &str,
    race_id: &str,
) -> Result<Option<FavoriteData>, PersistenceError> {
    let result: Result<FavoriteRow, diesel::result::Error> = favorites::table
        .filter(favorites::account_id.eq(account_id))
        .filter(favorites::race_id.eq(race_id))
        .select(FavoriteRow::as_select())
        .first(conn);

    match result {
        Ok(row) => Ok(Some(row.into())),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Lists an account's favorites, most recent first.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_favorites(
    conn: &mut SqliteConnection,
    account_id: &str,
) -> Result<Vec<FavoriteData>, PersistenceError> {
    let rows: Vec<FavoriteRow> = favorites::table
        .filter(favorites::account_id.eq(account_id))
        .order((favorites::created_at.desc(), favorites::favorite_id.asc()))
        .select(FavoriteRow::as_select())
        .load(conn)?;

    debug!("Account {} has {} favorites", account_id, rows.len());
    Ok(rows.into_iter().map(FavoriteData::from).collect())
}

/// Lists the email addresses to notify when a race is approved.
///
/// An account qualifies when it favorited the race with
/// `notify_on_registration` set and keeps `email_notifications` enabled.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_notification_recipients(
    conn: &mut SqliteConnection,
    race_id: &str,
) -> Result<Vec<String>, PersistenceError> {
    let emails: Vec<String> = favorites::table
        .inner_join(accounts::table)
        .filter(favorites::race_id.eq(race_id))
        .filter(favorites::notify_on_registration.eq(1))
        .filter(accounts::email_notifications.eq(1))
        .select(accounts::email)
        .order(accounts::email.asc())
        .load(conn)?;

    debug!(race_id, recipients = emails.len(), "Resolved notification recipients");
    Ok(emails)
}
