// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::macros::datetime;
use time::{Duration, OffsetDateTime};
use trail_france_domain::{ModerationAction, ModerationStatus, RegistrationStatus};

use crate::tests::helpers::create_test_race;
use crate::{
    ClosureCause, ForcedClosure, QuorumDecision, ReportingPolicy, evaluate_quorum, force_close,
    moderate,
};

#[test]
fn test_quorum_below_threshold_reports_tally() {
    let policy: ReportingPolicy = ReportingPolicy::default();
    let decision: QuorumDecision = evaluate_quorum(&policy, 2);

    assert_eq!(
        decision,
        QuorumDecision::BelowThreshold {
            report_count: 2,
            threshold: 3,
        }
    );
}

#[test]
fn test_quorum_reached_at_threshold() {
    let policy: ReportingPolicy = ReportingPolicy::default();
    let decision: QuorumDecision = evaluate_quorum(&policy, 3);

    assert_eq!(decision, QuorumDecision::AutoClose { report_count: 3 });
}

#[test]
fn test_quorum_beyond_threshold_still_closes() {
    let policy: ReportingPolicy = ReportingPolicy::new(2, Duration::days(1)).unwrap();
    assert_eq!(
        evaluate_quorum(&policy, 5),
        QuorumDecision::AutoClose { report_count: 5 }
    );
}

#[test]
fn test_threshold_of_one_closes_on_first_report() {
    let policy: ReportingPolicy = ReportingPolicy::new(1, Duration::days(7)).unwrap();
    assert_eq!(
        evaluate_quorum(&policy, 1),
        QuorumDecision::AutoClose { report_count: 1 }
    );
}

#[test]
fn test_forced_closure_makes_status_closed_afterwards() {
    let now: OffsetDateTime = datetime!(2026-05-15 14:30:00 UTC);
    let closure: ForcedClosure = force_close(now, ClosureCause::ReportQuorum).unwrap();

    let mut race = create_test_race("r1", "Ultra des Aiguilles");
    assert_eq!(race.registration_status(now), RegistrationStatus::Open);

    race.content.registration_close_date = Some(closure.close_date.clone());

    assert_eq!(closure.cause, ClosureCause::ReportQuorum);
    assert_eq!(closure.stamped_at, "2026-05-15T14:30:00.000000Z");
    assert_eq!(
        race.registration_status(now + Duration::seconds(1)),
        RegistrationStatus::Closed
    );
}

#[test]
fn test_admin_closure_keeps_admin_id() {
    let closure: ForcedClosure = force_close(
        datetime!(2026-05-15 14:30:00 UTC),
        ClosureCause::AdminValidation {
            admin_id: String::from("admin-1"),
        },
    )
    .unwrap();
    assert!(matches!(
        closure.cause,
        ClosureCause::AdminValidation { ref admin_id } if admin_id == "admin-1"
    ));
}

#[test]
fn test_moderation_from_pending() {
    let approve = moderate(ModerationStatus::Pending, ModerationAction::Approve);
    assert_eq!(approve.to, ModerationStatus::Approved);
    assert!(approve.notify_subscribers);

    let reject = moderate(ModerationStatus::Pending, ModerationAction::Reject);
    assert_eq!(reject.to, ModerationStatus::Rejected);
    assert!(!reject.notify_subscribers);
}

#[test]
fn test_remoderation_overwrites_terminal_state() {
    let transition = moderate(ModerationStatus::Rejected, ModerationAction::Approve);
    assert_eq!(transition.from, ModerationStatus::Rejected);
    assert_eq!(transition.to, ModerationStatus::Approved);

    let transition = moderate(ModerationStatus::Approved, ModerationAction::Reject);
    assert_eq!(transition.to, ModerationStatus::Rejected);
}
