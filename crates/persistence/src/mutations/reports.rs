// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Crowd report mutations.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::info;
use trail_france_domain::ReportStatus;

use crate::data_models::NewReport;
use crate::diesel_schema::reports;
use crate::error::PersistenceError;

/// Inserts a pending report and returns its id.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_report(
    conn: &mut SqliteConnection,
    report: &NewReport,
) -> Result<i64, PersistenceError> {
    let report_id: i64 = diesel::insert_into(reports::table)
        .values((
            reports::race_id.eq(&report.race_id),
            reports::race_name.eq(&report.race_name),
            reports::reporter_fingerprint.eq(&report.reporter_fingerprint),
            reports::reason.eq(&report.reason),
            reports::status.eq(ReportStatus::Pending.as_str()),
            reports::created_at.eq(&report.created_at),
        ))
        .returning(reports::report_id)
        .get_result(conn)?;

    info!(report_id, race_id = %report.race_id, "Report recorded");
    Ok(report_id)
}

/// Moves every pending report of a race to a terminal status.
///
/// Reports already validated or rejected are left untouched, so a second
/// call modifies nothing.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `race_id` - The race whose reports are reviewed
/// * `target` - `Validated` or `Rejected`
/// * `reviewed_by` - The reviewing admin, `None` for automatic validation
/// * `reviewed_at` - Review timestamp in storage format
///
/// # Returns
///
/// The number of reports modified.
///
/// # Errors
///
/// Returns an error if `target` is not terminal or the update fails.
pub fn resolve_pending_reports(
    conn: &mut SqliteConnection,
    race_id: &str,
    target: ReportStatus,
    reviewed_by: Option<&str>,
    reviewed_at: &str,
) -> Result<usize, PersistenceError> {
    ReportStatus::Pending
        .validate_transition(target)
        .map_err(|e| PersistenceError::InvalidTransition(e.to_string()))?;

    let modified: usize = diesel::update(
        reports::table
            .filter(reports::race_id.eq(race_id))
            .filter(reports::status.eq(ReportStatus::Pending.as_str())),
    )
    .set((
        reports::status.eq(target.as_str()),
        reports::reviewed_by.eq(reviewed_by),
        reports::reviewed_at.eq(reviewed_at),
    ))
    .execute(conn)?;

    info!(race_id, status = %target, modified, "Pending reports resolved");
    Ok(modified)
}
