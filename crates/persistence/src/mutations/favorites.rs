// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Favorite mutations.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::info;

use crate::diesel_schema::favorites;
use crate::error::PersistenceError;
use crate::mutations::generate_id;

/// Adds a race to an account's favorites and returns the favorite id.
///
/// # Errors
///
/// Returns `UniqueViolation` if the race is already a favorite.
pub fn insert_favorite(
    conn: &mut SqliteConnection,
    account_id: &str,
    race_id: &str,
    notify_on_registration: bool,
    created_at: &str,
) -> Result<String, PersistenceError> {
    let favorite_id: String = generate_id();

    diesel::insert_into(favorites::table)
        .values((
            favorites::favorite_id.eq(&favorite_id),
            favorites::account_id.eq(account_id),
            favorites::race_id.eq(race_id),
            favorites::notify_on_registration.eq(i32::from(notify_on_registration)),
            favorites::created_at.eq(created_at),
        ))
        .execute(conn)?;

    info!(account_id, race_id, "Favorite added");
    Ok(favorite_id)
}

/// Removes a race from an account's favorites.
///
/// # Returns
///
/// `true` if a favorite was removed.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn delete_favorite(
    conn: &mut SqliteConnection,
    account_id: &str,
    race_id: &str,
) -> Result<bool, PersistenceError> {
    let deleted: usize = diesel::delete(
        favorites::table
            .filter(favorites::account_id.eq(account_id))
            .filter(favorites::race_id.eq(race_id)),
    )
    .execute(conn)?;

    info!(account_id, race_id, deleted, "Favorite removal");
    Ok(deleted > 0)
}

/// Sets the registration notification flag of a favorite.
///
/// # Returns
///
/// `true` if the favorite exists.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn set_favorite_notify(
    conn: &mut SqliteConnection,
    account_id: &str,
    race_id: &str,
    notify: bool,
) -> Result<bool, PersistenceError> {
    let updated: usize = diesel::update(
        favorites::table
            .filter(favorites::account_id.eq(account_id))
            .filter(favorites::race_id.eq(race_id)),
    )
    .set(favorites::notify_on_registration.eq(i32::from(notify)))
    .execute(conn)?;

    Ok(updated > 0)
}
