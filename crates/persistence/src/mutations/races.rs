// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Race mutations.
//!
//! Each function is a single statement scoped to one race row.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::{debug, info};
use trail_france_domain::{ModerationStatus, RaceDraft};

use crate::data_models::ClosureMark;
use crate::diesel_schema::races;
use crate::error::PersistenceError;
use crate::mutations::generate_id;

/// Inserts a new race and returns its generated id.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `draft` - The race content, already validated
/// * `status` - The initial moderation status
/// * `submitted_by` - The creating account, if any
/// * `created_at` - Creation timestamp in storage format
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_race(
    conn: &mut SqliteConnection,
    draft: &RaceDraft,
    status: ModerationStatus,
    submitted_by: Option<&str>,
    created_at: &str,
) -> Result<String, PersistenceError> {
    let race_id: String = generate_id();

    diesel::insert_into(races::table)
        .values((
            races::race_id.eq(&race_id),
            races::name.eq(&draft.name),
            races::description.eq(&draft.description),
            races::location.eq(&draft.location),
            races::region.eq(&draft.region),
            races::department.eq(&draft.department),
            races::latitude.eq(draft.latitude),
            races::longitude.eq(draft.longitude),
            races::distance_km.eq(draft.distance_km),
            races::elevation_gain.eq(draft.elevation_gain),
            races::race_date.eq(&draft.race_date),
            races::registration_open_date.eq(&draft.registration_open_date),
            races::registration_close_date.eq(draft.registration_close_date.as_deref()),
            races::is_utmb.eq(i32::from(draft.is_utmb)),
            races::website_url.eq(draft.website_url.as_deref()),
            races::image_url.eq(draft.image_url.as_deref()),
            races::moderation_status.eq(status.as_str()),
            races::submitted_by.eq(submitted_by),
            races::created_at.eq(created_at),
        ))
        .execute(conn)?;

    info!(race_id = %race_id, status = %status, "Race created");
    Ok(race_id)
}

/// Overwrites the content columns of a race.
///
/// # Errors
///
/// Returns `NotFound` if no race has this id.
pub fn update_race_content(
    conn: &mut SqliteConnection,
    race_id: &str,
    draft: &RaceDraft,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(races::table.filter(races::race_id.eq(race_id)))
        .set((
            races::name.eq(&draft.name),
            races::description.eq(&draft.description),
            races::location.eq(&draft.location),
            races::region.eq(&draft.region),
            races::department.eq(&draft.department),
            races::latitude.eq(draft.latitude),
            races::longitude.eq(draft.longitude),
            races::distance_km.eq(draft.distance_km),
            races::elevation_gain.eq(draft.elevation_gain),
            races::race_date.eq(&draft.race_date),
            races::registration_open_date.eq(&draft.registration_open_date),
            races::registration_close_date.eq(draft.registration_close_date.as_deref()),
            races::is_utmb.eq(i32::from(draft.is_utmb)),
            races::website_url.eq(draft.website_url.as_deref()),
            races::image_url.eq(draft.image_url.as_deref()),
        ))
        .execute(conn)?;

    if updated == 0 {
        return Err(PersistenceError::NotFound(format!("Race {race_id}")));
    }

    info!(race_id, "Race content updated");
    Ok(())
}

/// Sets the moderation status of a race.
///
/// # Errors
///
/// Returns `NotFound` if no race has this id.
pub fn set_moderation_status(
    conn: &mut SqliteConnection,
    race_id: &str,
    status: ModerationStatus,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(races::table.filter(races::race_id.eq(race_id)))
        .set(races::moderation_status.eq(status.as_str()))
        .execute(conn)?;

    if updated == 0 {
        return Err(PersistenceError::NotFound(format!("Race {race_id}")));
    }

    info!(race_id, status = %status, "Race moderation status set");
    Ok(())
}

/// Forces a race's registration closed.
///
/// The close date is overwritten and the flags matching `mark` are
/// stamped. Applying the same closure twice leaves the row as the second
/// call wrote it.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `race_id` - The race to close
/// * `close_date` - New registration close date
/// * `stamped_at` - Instant recorded in `auto_closed_at` or `closed_at`
/// * `mark` - Whether the quorum or an admin closed it
///
/// # Errors
///
/// Returns `NotFound` if no race has this id.
pub fn apply_forced_closure(
    conn: &mut SqliteConnection,
    race_id: &str,
    close_date: &str,
    stamped_at: &str,
    mark: ClosureMark<'_>,
) -> Result<(), PersistenceError> {
    let target = races::table.filter(races::race_id.eq(race_id));

    let updated: usize = match mark {
        ClosureMark::Automatic => diesel::update(target)
            .set((
                races::registration_close_date.eq(close_date),
                races::auto_closed_by_reports.eq(1),
                races::auto_closed_at.eq(stamped_at),
            ))
            .execute(conn)?,
        ClosureMark::Manual { admin_id } => diesel::update(target)
            .set((
                races::registration_close_date.eq(close_date),
                races::manually_closed.eq(1),
                races::closed_at.eq(stamped_at),
                races::closed_by.eq(admin_id),
            ))
            .execute(conn)?,
    };

    if updated == 0 {
        return Err(PersistenceError::NotFound(format!("Race {race_id}")));
    }

    info!(race_id, close_date, ?mark, "Race registration forced closed");
    Ok(())
}

/// Deletes a race. Favorites cascade; reports are kept.
///
/// # Errors
///
/// Returns `NotFound` if no race has this id.
pub fn delete_race(conn: &mut SqliteConnection, race_id: &str) -> Result<(), PersistenceError> {
    let deleted: usize =
        diesel::delete(races::table.filter(races::race_id.eq(race_id))).execute(conn)?;

    if deleted == 0 {
        return Err(PersistenceError::NotFound(format!("Race {race_id}")));
    }

    debug!("Deleted race {}", race_id);
    info!(race_id, "Race deleted");
    Ok(())
}
