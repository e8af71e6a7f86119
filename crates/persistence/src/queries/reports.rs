// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Crowd report queries.

use diesel::SqliteConnection;
use diesel::dsl::count;
use diesel::prelude::*;
use tracing::debug;
use trail_france_domain::{Report, ReportStatus};

use crate::diesel_schema::reports;
use crate::error::PersistenceError;

/// Diesel Queryable struct for report rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = reports)]
struct ReportRow {
    report_id: i64,
    race_id: String,
    race_name: String,
    reporter_fingerprint: String,
    reason: String,
    status: String,
    created_at: String,
    reviewed_by: Option<String>,
    reviewed_at: Option<String>,
}

impl TryFrom<ReportRow> for Report {
    type Error = PersistenceError;

    fn try_from(row: ReportRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.report_id,
            race_id: row.race_id,
            race_name: row.race_name,
            reporter_fingerprint: row.reporter_fingerprint,
            reason: row.reason,
            status: ReportStatus::parse_str(&row.status)?,
            created_at: row.created_at,
            reviewed_by: row.reviewed_by,
            reviewed_at: row.reviewed_at,
        })
    }
}

/// Counts the pending reports of a race created at or after `window_start`.
///
/// Timestamps are fixed-width UTC text, so the window is a plain string
/// comparison.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `race_id` - The race the reports target
/// * `window_start` - Inclusive lower bound, in storage format
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_pending_reports_since(
    conn: &mut SqliteConnection,
    race_id: &str,
    window_start: &str,
) -> Result<i64, PersistenceError> {
    let total: i64 = reports::table
        .filter(reports::race_id.eq(race_id))
        .filter(reports::status.eq(ReportStatus::Pending.as_str()))
        .filter(reports::created_at.ge(window_start))
        .select(count(reports::report_id))
        .first(conn)?;

    debug!(race_id, window_start, total, "Counted pending reports in window");
    Ok(total)
}

/// Lists every pending report in submission order.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_pending_reports(conn: &mut SqliteConnection) -> Result<Vec<Report>, PersistenceError> {
    let rows: Vec<ReportRow> = reports::table
        .filter(reports::status.eq(ReportStatus::Pending.as_str()))
        .order(reports::report_id.asc())
        .select(ReportRow::as_select())
        .load(conn)?;

    rows.into_iter().map(Report::try_from).collect()
}

/// Lists every report of a race, whatever its status, in submission order.
///
/// # Errors
///
/// Returns an error if the database query fails.
#[cfg(any(test, feature = "testing"))]
pub fn list_reports_for_race(
    conn: &mut SqliteConnection,
    race_id: &str,
) -> Result<Vec<Report>, PersistenceError> {
    let rows: Vec<ReportRow> = reports::table
        .filter(reports::race_id.eq(race_id))
        .order(reports::report_id.asc())
        .select(ReportRow::as_select())
        .load(conn)?;

    rows.into_iter().map(Report::try_from).collect()
}
