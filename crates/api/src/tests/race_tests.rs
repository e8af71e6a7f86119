// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::Duration;
use trail_france_domain::{ModerationStatus, RacePatch, RegistrationStatus};
use trail_france_persistence::{Persistence, PersistenceError};

use super::helpers::{
    RecordingSink, create_approved_race, create_open_draft, create_stored_actor, create_test_admin,
    create_test_user, test_now,
};
use crate::handlers::notify_approval;
use crate::{
    ApiError, ListRacesRequest, ModerateRaceRequest, Notification, Role, create_race, delete_race,
    get_race, list_departments, list_pending_races, list_races, list_regions, moderate_race,
    update_race,
};

fn approve() -> ModerateRaceRequest {
    ModerateRaceRequest {
        action: String::from("approve"),
        reason: None,
    }
}

#[test]
fn test_admin_submission_is_approved_immediately() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let race = create_approved_race(&mut persistence, "Trail du Salève");

    assert_eq!(race.race.moderation_status, ModerationStatus::Approved);
    assert_eq!(race.race.submitted_by.as_deref(), Some("admin-123"));
    assert_eq!(race.registration_status, RegistrationStatus::Open);
}

#[test]
fn test_user_submission_waits_for_moderation() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let user = create_test_user();

    let race = create_race(
        &mut persistence,
        &user,
        &create_open_draft("Ultra des Bauges"),
        test_now(),
    )
    .unwrap();
    assert_eq!(race.race.moderation_status, ModerationStatus::Pending);

    let listed = list_races(&mut persistence, &ListRacesRequest::default(), test_now()).unwrap();
    assert!(listed.is_empty());

    let queue = list_pending_races(&mut persistence, &create_test_admin(), test_now()).unwrap();
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].race.id, race.race.id);
}

#[test]
fn test_invalid_content_is_refused() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let mut draft = create_open_draft("Trail");
    draft.distance_km = -5.0;

    let result = create_race(&mut persistence, &create_test_admin(), &draft, test_now());
    assert!(matches!(
        result,
        Err(ApiError::InvalidInput { ref field, .. }) if field == "distance_km"
    ));
}

#[test]
fn test_listing_includes_not_yet_open_races() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let mut draft = create_open_draft("Trail de Printemps");
    draft.registration_open_date = String::from("2026-12-01");
    create_race(&mut persistence, &create_test_admin(), &draft, test_now()).unwrap();

    let listed = list_races(&mut persistence, &ListRacesRequest::default(), test_now()).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].registration_status, RegistrationStatus::NotOpen);
}

#[test]
fn test_status_filter_uses_computed_status() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let admin = create_test_admin();

    create_approved_race(&mut persistence, "Open race");

    let mut future = create_open_draft("Future race");
    future.registration_open_date = String::from("2026-12-01");
    create_race(&mut persistence, &admin, &future, test_now()).unwrap();

    let mut closed = create_open_draft("Closed race");
    closed.registration_close_date = Some(String::from("2026-05-01"));
    create_race(&mut persistence, &admin, &closed, test_now()).unwrap();

    let names = |status: &str, persistence: &mut Persistence| -> Vec<String> {
        let request = ListRacesRequest {
            registration_status: Some(status.to_string()),
            ..ListRacesRequest::default()
        };
        list_races(persistence, &request, test_now())
            .unwrap()
            .into_iter()
            .map(|r| r.race.content.name)
            .collect()
    };

    assert_eq!(names("open", &mut persistence), vec!["Open race"]);
    assert_eq!(names("not_open", &mut persistence), vec!["Future race"]);
    assert_eq!(names("closed", &mut persistence), vec!["Closed race"]);
}

#[test]
fn test_unknown_status_filter_is_invalid_input() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let request = ListRacesRequest {
        registration_status: Some(String::from("sold_out")),
        ..ListRacesRequest::default()
    };

    let result = list_races(&mut persistence, &request, test_now());
    assert!(matches!(result, Err(ApiError::InvalidInput { .. })));
}

#[test]
fn test_content_filters() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let admin = create_test_admin();

    create_approved_race(&mut persistence, "Short Annecy");
    let mut long = create_open_draft("Grand Raid des Vosges");
    long.distance_km = 120.0;
    long.is_utmb = true;
    long.location = String::from("Gérardmer");
    long.region = String::from("Grand Est");
    long.department = String::from("Vosges");
    create_race(&mut persistence, &admin, &long, test_now()).unwrap();

    let request = ListRacesRequest {
        min_distance: Some(100.0),
        ..ListRacesRequest::default()
    };
    let listed = list_races(&mut persistence, &request, test_now()).unwrap();
    assert_eq!(listed.len(), 1);
    assert!(listed[0].race.content.is_utmb);

    let request = ListRacesRequest {
        region: Some(String::from("grand est")),
        ..ListRacesRequest::default()
    };
    assert_eq!(
        list_races(&mut persistence, &request, test_now()).unwrap().len(),
        1
    );

    let request = ListRacesRequest {
        search: Some(String::from("annecy")),
        ..ListRacesRequest::default()
    };
    let listed = list_races(&mut persistence, &request, test_now()).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].race.content.name, "Short Annecy");
}

#[test]
fn test_get_race_visibility() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let user = create_test_user();
    let other = crate::AuthenticatedActor::new(String::from("user-789"), Role::User);

    let pending = create_race(&mut persistence, &user, &create_open_draft("Pending"), test_now())
        .unwrap()
        .race
        .id;

    assert!(matches!(
        get_race(&mut persistence, &pending, None, test_now()),
        Err(ApiError::ResourceNotFound { .. })
    ));
    assert!(matches!(
        get_race(&mut persistence, &pending, Some(&other), test_now()),
        Err(ApiError::ResourceNotFound { .. })
    ));
    assert!(matches!(
        get_race(&mut persistence, &pending, Some(&user), test_now()),
        Err(ApiError::ResourceNotFound { .. })
    ));
    assert!(get_race(&mut persistence, &pending, Some(&create_test_admin()), test_now()).is_ok());

    let approved = create_approved_race(&mut persistence, "Approved").race.id;
    assert!(get_race(&mut persistence, &approved, None, test_now()).is_ok());
}

#[test]
fn test_submitter_cannot_see_own_rejected_race() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let sink = RecordingSink::new();
    let user = create_test_user();
    let id = create_race(&mut persistence, &user, &create_open_draft("Refused"), test_now())
        .unwrap()
        .race
        .id;

    let reject = ModerateRaceRequest {
        action: String::from("reject"),
        reason: Some(String::from("Not a trail race")),
    };
    moderate_race(&mut persistence, &sink, &create_test_admin(), &id, &reject).unwrap();

    assert!(matches!(
        get_race(&mut persistence, &id, Some(&user), test_now()),
        Err(ApiError::ResourceNotFound { .. })
    ));
}

#[test]
fn test_get_unknown_race_is_not_found() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    assert!(matches!(
        get_race(&mut persistence, "missing", None, test_now()),
        Err(ApiError::ResourceNotFound { .. })
    ));
}

#[test]
fn test_registration_status_moves_with_now() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let mut draft = create_open_draft("Trail");
    draft.registration_close_date = Some(String::from("2026-05-20"));
    let id = create_race(&mut persistence, &create_test_admin(), &draft, test_now())
        .unwrap()
        .race
        .id;

    let later = test_now() + Duration::days(10);
    let race = get_race(&mut persistence, &id, None, later).unwrap();
    assert_eq!(race.registration_status, RegistrationStatus::Closed);
}

#[test]
fn test_submitter_can_update_own_race() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let user = create_test_user();
    let id = create_race(&mut persistence, &user, &create_open_draft("Trail"), test_now())
        .unwrap()
        .race
        .id;

    let patch = RacePatch {
        name: Some(String::from("Trail renamed")),
        elevation_gain: Some(4200),
        ..RacePatch::default()
    };
    let updated = update_race(&mut persistence, &user, &id, patch, test_now()).unwrap();

    assert_eq!(updated.race.content.name, "Trail renamed");
    assert_eq!(updated.race.content.elevation_gain, 4200);
    assert_eq!(updated.race.content.location, "Annecy");
    assert_eq!(updated.race.moderation_status, ModerationStatus::Pending);
}

#[test]
fn test_other_user_cannot_update_race() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let id = create_approved_race(&mut persistence, "Trail").race.id;

    let patch = RacePatch {
        name: Some(String::from("Hijacked")),
        ..RacePatch::default()
    };
    let result = update_race(&mut persistence, &create_test_user(), &id, patch, test_now());
    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
}

#[test]
fn test_update_rejects_invalid_patch() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let id = create_approved_race(&mut persistence, "Trail").race.id;

    let patch = RacePatch {
        latitude: Some(120.0),
        ..RacePatch::default()
    };
    let result = update_race(&mut persistence, &create_test_admin(), &id, patch, test_now());
    assert!(matches!(result, Err(ApiError::InvalidInput { .. })));
}

#[test]
fn test_delete_race() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let admin = create_test_admin();
    let id = create_approved_race(&mut persistence, "Trail").race.id;

    let response = delete_race(&mut persistence, &admin, &id).unwrap();
    assert_eq!(response.message, "Race deleted");
    assert!(matches!(
        delete_race(&mut persistence, &admin, &id),
        Err(ApiError::ResourceNotFound { .. })
    ));
}

#[test]
fn test_moderation_approve_and_reject() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let sink = RecordingSink::new();
    let admin = create_test_admin();
    let id = create_race(
        &mut persistence,
        &create_test_user(),
        &create_open_draft("Trail"),
        test_now(),
    )
    .unwrap()
    .race
    .id;

    let response = moderate_race(&mut persistence, &sink, &admin, &id, &approve()).unwrap();
    assert_eq!(response.message, "Race approved successfully");
    assert_eq!(
        persistence.get_race(&id).unwrap().unwrap().moderation_status,
        ModerationStatus::Approved
    );

    let reject = ModerateRaceRequest {
        action: String::from("reject"),
        reason: Some(String::from("Duplicate")),
    };
    let response = moderate_race(&mut persistence, &sink, &admin, &id, &reject).unwrap();
    assert_eq!(response.message, "Race rejected successfully");

    let listed = list_races(&mut persistence, &ListRacesRequest::default(), test_now()).unwrap();
    assert!(listed.is_empty());

    // nobody follows the race
    assert!(sink.take().is_empty());
}

#[test]
fn test_unknown_moderation_action_is_invalid_input() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let sink = RecordingSink::new();
    let id = create_approved_race(&mut persistence, "Trail").race.id;

    let request = ModerateRaceRequest {
        action: String::from("archive"),
        reason: None,
    };
    let result = moderate_race(&mut persistence, &sink, &create_test_admin(), &id, &request);
    assert!(matches!(result, Err(ApiError::InvalidInput { .. })));
}

#[test]
fn test_approval_notifies_opted_in_followers() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let sink = RecordingSink::new();
    let admin = create_test_admin();

    let follower = create_stored_actor(&mut persistence, "follower@example.com", Role::User);
    let silent = create_stored_actor(&mut persistence, "silent@example.com", Role::User);

    let id = create_race(&mut persistence, &follower, &create_open_draft("Trail"), test_now())
        .unwrap()
        .race
        .id;
    crate::add_favorite(&mut persistence, &follower, &id, true, test_now()).unwrap();
    crate::add_favorite(&mut persistence, &silent, &id, false, test_now()).unwrap();

    moderate_race(&mut persistence, &sink, &admin, &id, &approve()).unwrap();
    let notifications = sink.take();
    assert_eq!(notifications.len(), 1);
    match &notifications[0] {
        Notification::RaceApproved { race, recipients } => {
            assert_eq!(race.id, id);
            assert_eq!(recipients, &vec![String::from("follower@example.com")]);
        }
        other => panic!("unexpected notification {other:?}"),
    }

    // a repeated approval notifies again
    moderate_race(&mut persistence, &sink, &admin, &id, &approve()).unwrap();
    assert_eq!(sink.take().len(), 1);
}

#[test]
fn test_failed_recipient_lookup_skips_notification() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let sink = RecordingSink::new();
    let race = create_approved_race(&mut persistence, "Trail").race;

    notify_approval(
        &sink,
        &race,
        Err(PersistenceError::Database(String::from("database is locked"))),
    );
    assert!(sink.take().is_empty());

    notify_approval(&sink, &race, Ok(Vec::new()));
    assert!(sink.take().is_empty());

    notify_approval(&sink, &race, Ok(vec![String::from("follower@example.com")]));
    assert_eq!(sink.take().len(), 1);
}

#[test]
fn test_facets_only_list_approved_races() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    create_approved_race(&mut persistence, "Annecy");

    let mut pending = create_open_draft("Pending");
    pending.region = String::from("Bretagne");
    pending.department = String::from("Finistère");
    create_race(&mut persistence, &create_test_user(), &pending, test_now()).unwrap();

    assert_eq!(
        list_regions(&mut persistence).unwrap(),
        vec!["Auvergne-Rhône-Alpes"]
    );
    assert_eq!(
        list_departments(&mut persistence, Some("Auvergne-Rhône-Alpes")).unwrap(),
        vec!["Haute-Savoie"]
    );
    assert!(
        list_departments(&mut persistence, Some("Bretagne"))
            .unwrap()
            .is_empty()
    );
    assert_eq!(
        list_departments(&mut persistence, Some("  ")).unwrap(),
        vec!["Haute-Savoie"]
    );
}

#[test]
fn test_race_management_requires_admin() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let sink = RecordingSink::new();
    let user = create_test_user();
    let id = create_approved_race(&mut persistence, "Trail").race.id;

    assert!(matches!(
        delete_race(&mut persistence, &user, &id),
        Err(ApiError::Unauthorized { .. })
    ));
    assert!(matches!(
        list_pending_races(&mut persistence, &user, test_now()),
        Err(ApiError::Unauthorized { .. })
    ));
    assert!(matches!(
        moderate_race(&mut persistence, &sink, &user, &id, &approve()),
        Err(ApiError::Unauthorized { .. })
    ));
}

#[test]
fn test_race_response_wire_shape_is_flat() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let race = create_approved_race(&mut persistence, "Trail du Semnoz");

    let json: serde_json::Value = serde_json::to_value(&race).unwrap();

    assert_eq!(json["name"], "Trail du Semnoz");
    assert_eq!(json["moderation_status"], "approved");
    assert_eq!(json["registration_status"], "open");
    assert_eq!(json["auto_closed_by_reports"], false);
    assert!(json["closed_by"].is_null());
    assert!(json.get("race").is_none());
    assert!(json.get("content").is_none());
}
