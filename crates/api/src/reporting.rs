// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Crowd reports: submission with quorum auto-close, and admin review.
//!
//! The quorum count is re-derived from the store on every submission, so
//! reports older than the lookback window drop out without any cleanup
//! job. Each step below is its own write; two concurrent submissions may
//! both close the same race, which leaves the same end state.

use time::OffsetDateTime;
use tracing::{debug, info};
use trail_france::{
    ClosureCause, ForcedClosure, QuorumDecision, ReportGroup, evaluate_quorum, force_close,
    group_pending_reports,
};
use trail_france_domain::{Race, ReportStatus, format_timestamp, normalize_reason};
use trail_france_persistence::{ClosureMark, NewReport, Persistence};

use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::config::EngineConfig;
use crate::error::{
    ApiError, translate_core_error, translate_domain_error, translate_persistence_error,
};
use crate::notifications::{Notification, NotificationSink, RaceSummary};
use crate::request_response::{ReviewReportsResponse, SubmitReportRequest, SubmitReportResponse};

/// Records a visitor report that a race's registration is closed.
///
/// No authentication is required. Every call creates a new report with a
/// fresh reporter fingerprint; repeated reports from one visitor are not
/// merged.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `config` - Quorum policy and admin address
/// * `notifier` - Receives the admin notification
/// * `race_id` - The reported race
/// * `request` - Optional free-text reason
/// * `now` - The current instant
///
/// # Errors
///
/// Returns `ResourceNotFound` if the race does not exist (no report is
/// written in that case), or an internal error if a store write fails.
pub fn submit_report(
    persistence: &mut Persistence,
    config: &EngineConfig,
    notifier: &dyn NotificationSink,
    race_id: &str,
    request: &SubmitReportRequest,
    now: OffsetDateTime,
) -> Result<SubmitReportResponse, ApiError> {
    let race: Race = persistence
        .get_race(race_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::race_not_found(race_id))?;

    let reason: String = normalize_reason(request.reason.as_deref());
    let created_at: String = format_timestamp(now).map_err(translate_domain_error)?;

    let report_id: i64 = persistence
        .insert_report(&NewReport {
            race_id: race.id.clone(),
            race_name: race.content.name.clone(),
            reporter_fingerprint: generate_fingerprint(),
            reason: reason.clone(),
            created_at,
        })
        .map_err(translate_persistence_error)?;

    let window_start: String =
        format_timestamp(config.policy.window_start(now)).map_err(translate_domain_error)?;
    let pending: i64 = persistence
        .count_pending_reports_since(&race.id, &window_start)
        .map_err(translate_persistence_error)?;
    let pending: u32 = u32::try_from(pending).unwrap_or(u32::MAX);

    info!(race_id = %race.id, report_id, pending, "Report submitted");

    match evaluate_quorum(&config.policy, pending) {
        QuorumDecision::AutoClose { report_count } => {
            let closure: ForcedClosure =
                force_close(now, ClosureCause::ReportQuorum).map_err(translate_core_error)?;

            write_closure(persistence, &race.id, &closure)?;

            let validated: usize = persistence
                .resolve_pending_reports(&race.id, ReportStatus::Validated, None, &closure.stamped_at)
                .map_err(translate_persistence_error)?;

            info!(race_id = %race.id, report_count, validated, "Registration auto-closed by reports");

            if let Some(to) = config.admin_recipient() {
                notifier.submit(Notification::RaceAutoClosed {
                    to: to.to_string(),
                    race: RaceSummary::from(&race),
                    report_count,
                });
            } else {
                debug!("Admin email not configured, skipping auto-close notification");
            }

            Ok(SubmitReportResponse {
                message: format!("Registration closed after {report_count} reports"),
                auto_closed: true,
                report_count,
            })
        }
        QuorumDecision::BelowThreshold {
            report_count,
            threshold,
        } => {
            if let Some(to) = config.admin_recipient() {
                notifier.submit(Notification::ReportReceived {
                    to: to.to_string(),
                    race: RaceSummary::from(&race),
                    reason,
                    report_count,
                    threshold,
                });
            } else {
                debug!("Admin email not configured, skipping report notification");
            }

            Ok(SubmitReportResponse {
                message: format!("Report recorded ({report_count}/{threshold})"),
                auto_closed: false,
                report_count,
            })
        }
    }
}

/// Stamps `closure` on the race with the flags its cause calls for.
fn write_closure(
    persistence: &mut Persistence,
    race_id: &str,
    closure: &ForcedClosure,
) -> Result<(), ApiError> {
    let mark: ClosureMark<'_> = match &closure.cause {
        ClosureCause::ReportQuorum => ClosureMark::Automatic,
        ClosureCause::AdminValidation { admin_id } => ClosureMark::Manual { admin_id },
    };
    persistence
        .apply_forced_closure(race_id, &closure.close_date, &closure.stamped_at, mark)
        .map_err(translate_persistence_error)
}

/// Lists pending reports grouped by race, most recently reported first.
///
/// # Errors
///
/// Returns an error if the actor is not an admin or the query fails.
pub fn list_pending_reports(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
) -> Result<Vec<ReportGroup>, ApiError> {
    AuthorizationService::authorize_admin(actor, "list_reports")?;

    let reports = persistence
        .list_pending_reports()
        .map_err(translate_persistence_error)?;

    Ok(group_pending_reports(reports))
}

/// Confirms the pending reports of a race and closes its registration.
///
/// The race is marked manually closed by `actor`, and every pending report
/// is validated and stamped with the admin's id.
///
/// # Errors
///
/// Returns an error if the actor is not an admin, the race does not exist,
/// or a store write fails.
pub fn validate_reports(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    race_id: &str,
    now: OffsetDateTime,
) -> Result<ReviewReportsResponse, ApiError> {
    AuthorizationService::authorize_admin(actor, "validate_reports")?;

    if persistence
        .get_race(race_id)
        .map_err(translate_persistence_error)?
        .is_none()
    {
        return Err(ApiError::race_not_found(race_id));
    }

    let closure: ForcedClosure = force_close(
        now,
        ClosureCause::AdminValidation {
            admin_id: actor.id.clone(),
        },
    )
    .map_err(translate_core_error)?;

    write_closure(persistence, race_id, &closure)?;

    let modified: usize = persistence
        .resolve_pending_reports(
            race_id,
            ReportStatus::Validated,
            Some(&actor.id),
            &closure.stamped_at,
        )
        .map_err(translate_persistence_error)?;

    info!(race_id, admin = %actor.id, modified, "Reports validated, registration closed");

    Ok(ReviewReportsResponse {
        message: format!("{modified} report(s) validated, registration closed"),
        modified,
    })
}

/// Dismisses the pending reports of a race.
///
/// The race need not exist: reports against a deleted race can still be
/// dismissed, and an unknown id simply modifies nothing.
///
/// # Errors
///
/// Returns an error if the actor is not an admin or the update fails.
pub fn reject_reports(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    race_id: &str,
    now: OffsetDateTime,
) -> Result<ReviewReportsResponse, ApiError> {
    AuthorizationService::authorize_admin(actor, "reject_reports")?;

    let reviewed_at: String = format_timestamp(now).map_err(translate_domain_error)?;
    let modified: usize = persistence
        .resolve_pending_reports(race_id, ReportStatus::Rejected, Some(&actor.id), &reviewed_at)
        .map_err(translate_persistence_error)?;

    info!(race_id, admin = %actor.id, modified, "Reports rejected");

    Ok(ReviewReportsResponse {
        message: format!("{modified} report(s) rejected"),
        modified,
    })
}

fn generate_fingerprint() -> String {
    format!("visitor-{:032x}", rand::random::<u128>())
}
