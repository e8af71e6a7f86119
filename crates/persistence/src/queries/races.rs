// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Race queries.
//!
//! Rows are converted into `trail_france_domain::Race` at this boundary;
//! a row whose moderation status no longer parses is reported as corrupt.

use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::debug;
use trail_france_domain::{ModerationStatus, Race, RaceDraft};

use crate::diesel_schema::races;
use crate::error::PersistenceError;

/// Diesel Queryable struct for race rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = races)]
pub(crate) struct RaceRow {
    race_id: String,
    name: String,
    description: String,
    location: String,
    region: String,
    department: String,
    latitude: f64,
    longitude: f64,
    distance_km: f64,
    elevation_gain: i32,
    race_date: String,
    registration_open_date: String,
    registration_close_date: Option<String>,
    is_utmb: i32,
    website_url: Option<String>,
    image_url: Option<String>,
    moderation_status: String,
    submitted_by: Option<String>,
    created_at: String,
    auto_closed_by_reports: i32,
    auto_closed_at: Option<String>,
    manually_closed: i32,
    closed_at: Option<String>,
    closed_by: Option<String>,
}

impl TryFrom<RaceRow> for Race {
    type Error = PersistenceError;

    fn try_from(row: RaceRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.race_id,
            content: RaceDraft {
                name: row.name,
                description: row.description,
                location: row.location,
                region: row.region,
                department: row.department,
                latitude: row.latitude,
                longitude: row.longitude,
                distance_km: row.distance_km,
                elevation_gain: row.elevation_gain,
                race_date: row.race_date,
                registration_open_date: row.registration_open_date,
                registration_close_date: row.registration_close_date,
                is_utmb: row.is_utmb != 0,
                website_url: row.website_url,
                image_url: row.image_url,
            },
            moderation_status: ModerationStatus::parse_str(&row.moderation_status)?,
            submitted_by: row.submitted_by,
            created_at: row.created_at,
            auto_closed_by_reports: row.auto_closed_by_reports != 0,
            auto_closed_at: row.auto_closed_at,
            manually_closed: row.manually_closed != 0,
            closed_at: row.closed_at,
            closed_by: row.closed_by,
        })
    }
}

fn into_races(rows: Vec<RaceRow>) -> Result<Vec<Race>, PersistenceError> {
    rows.into_iter().map(Race::try_from).collect()
}

/// Retrieves a race by id, whatever its moderation status.
///
/// # Errors
///
/// Returns an error if the database query fails or the row is corrupt.
/// Returns `Ok(None)` if no race has this id.
pub fn get_race(conn: &mut SqliteConnection, race_id: &str) -> Result<Option<Race>, PersistenceError> {
    debug!("Looking up race: {}", race_id);

    let result: Result<RaceRow, diesel::result::Error> = races::table
        .filter(races::race_id.eq(race_id))
        .select(RaceRow::as_select())
        .first(conn);

    match result {
        Ok(row) => Ok(Some(Race::try_from(row)?)),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Lists races with the given moderation status, ordered by race date
/// ascending.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_races_by_status(
    conn: &mut SqliteConnection,
    status: ModerationStatus,
) -> Result<Vec<Race>, PersistenceError> {
    let rows: Vec<RaceRow> = races::table
        .filter(races::moderation_status.eq(status.as_str()))
        .order((races::race_date.asc(), races::race_id.asc()))
        .select(RaceRow::as_select())
        .load(conn)?;

    debug!("Loaded {} {} races", rows.len(), status);
    into_races(rows)
}

/// Lists pending races, oldest submission first.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `limit` - Maximum number of races returned
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_pending_races(
    conn: &mut SqliteConnection,
    limit: i64,
) -> Result<Vec<Race>, PersistenceError> {
    let rows: Vec<RaceRow> = races::table
        .filter(races::moderation_status.eq(ModerationStatus::Pending.as_str()))
        .order((races::created_at.asc(), races::race_id.asc()))
        .limit(limit)
        .select(RaceRow::as_select())
        .load(conn)?;

    into_races(rows)
}

/// Loads the races with the given ids. Unknown ids are skipped.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_races_by_ids(
    conn: &mut SqliteConnection,
    race_ids: &[String],
) -> Result<Vec<Race>, PersistenceError> {
    let rows: Vec<RaceRow> = races::table
        .filter(races::race_id.eq_any(race_ids))
        .select(RaceRow::as_select())
        .load(conn)?;

    into_races(rows)
}

/// Lists the distinct non-empty regions of approved races, sorted.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_regions(conn: &mut SqliteConnection) -> Result<Vec<String>, PersistenceError> {
    let regions: Vec<String> = races::table
        .filter(races::moderation_status.eq(ModerationStatus::Approved.as_str()))
        .filter(races::region.ne(""))
        .select(races::region)
        .distinct()
        .order(races::region.asc())
        .load(conn)?;

    debug!("Found {} regions", regions.len());
    Ok(regions)
}

/// Lists the distinct non-empty departments of approved races, sorted.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `region` - When given, only departments of races in exactly this region
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_departments(
    conn: &mut SqliteConnection,
    region: Option<&str>,
) -> Result<Vec<String>, PersistenceError> {
    let mut query = races::table
        .filter(races::moderation_status.eq(ModerationStatus::Approved.as_str()))
        .filter(races::department.ne(""))
        .select(races::department)
        .distinct()
        .order(races::department.asc())
        .into_boxed();

    if let Some(region) = region {
        query = query.filter(races::region.eq(region));
    }

    let departments: Vec<String> = query.load(conn)?;
    Ok(departments)
}
