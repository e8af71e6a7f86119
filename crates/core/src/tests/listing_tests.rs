// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::OffsetDateTime;
use time::macros::datetime;
use trail_france_domain::{ModerationStatus, Race, RegistrationStatus};

use crate::tests::helpers::create_test_race;
use crate::{LISTING_LIMIT, RaceQuery, select_listed};

const NOW: OffsetDateTime = datetime!(2026-03-01 12:00:00 UTC);

fn ids(listed: &[(Race, RegistrationStatus)]) -> Vec<&str> {
    listed.iter().map(|(race, _)| race.id.as_str()).collect()
}

#[test]
fn test_pending_and_rejected_races_are_not_listed() {
    let mut pending: Race = create_test_race("pending", "Pending Trail");
    pending.moderation_status = ModerationStatus::Pending;
    let mut rejected: Race = create_test_race("rejected", "Rejected Trail");
    rejected.moderation_status = ModerationStatus::Rejected;
    let approved: Race = create_test_race("approved", "Approved Trail");

    let listed = select_listed(vec![pending, rejected, approved], &RaceQuery::default(), NOW);
    assert_eq!(ids(&listed), vec!["approved"]);
}

#[test]
fn test_not_open_race_is_listed_without_status_filter() {
    let mut race: Race = create_test_race("future", "Future Trail");
    race.content.registration_open_date = String::from("2026-12-01");

    let listed = select_listed(vec![race.clone()], &RaceQuery::default(), NOW);
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].1, RegistrationStatus::NotOpen);

    let open_only: RaceQuery = RaceQuery {
        registration_status: Some(RegistrationStatus::Open),
        ..RaceQuery::default()
    };
    assert!(select_listed(vec![race], &open_only, NOW).is_empty());
}

#[test]
fn test_region_and_department_are_case_insensitive_substrings() {
    let race: Race = create_test_race("r", "Trail");
    let query: RaceQuery = RaceQuery {
        region: Some(String::from("rhône")),
        department: Some(String::from("SAVOIE")),
        ..RaceQuery::default()
    };
    assert!(query.matches_content(&race));

    let query: RaceQuery = RaceQuery {
        region: Some(String::from("Bretagne")),
        ..RaceQuery::default()
    };
    assert!(!query.matches_content(&race));
}

#[test]
fn test_distance_bounds_are_inclusive() {
    let race: Race = create_test_race("r", "Trail");
    let exact: RaceQuery = RaceQuery {
        min_distance: Some(42.0),
        max_distance: Some(42.0),
        ..RaceQuery::default()
    };
    assert!(exact.matches_content(&race));

    let above: RaceQuery = RaceQuery {
        min_distance: Some(42.5),
        ..RaceQuery::default()
    };
    assert!(!above.matches_content(&race));
}

#[test]
fn test_search_matches_name_or_location() {
    let race: Race = create_test_race("r", "Marathon du Mont-Blanc");
    for term in ["mont-blanc", "CHAMONIX"] {
        let query: RaceQuery = RaceQuery {
            search: Some(term.to_string()),
            ..RaceQuery::default()
        };
        assert!(query.matches_content(&race), "{term} should match");
    }
    let query: RaceQuery = RaceQuery {
        search: Some(String::from("Annecy")),
        ..RaceQuery::default()
    };
    assert!(!query.matches_content(&race));
}

#[test]
fn test_flagship_filter() {
    let mut flagship: Race = create_test_race("utmb", "UTMB");
    flagship.content.is_utmb = true;
    let regular: Race = create_test_race("regular", "Regular");

    let query: RaceQuery = RaceQuery {
        is_utmb: Some(true),
        ..RaceQuery::default()
    };
    assert_eq!(ids(&select_listed(vec![flagship, regular], &query, NOW)), vec!["utmb"]);
}

#[test]
fn test_blank_text_filters_are_ignored() {
    let race: Race = create_test_race("r", "Trail");
    let query: RaceQuery = RaceQuery {
        region: Some(String::new()),
        search: Some(String::from("  ")),
        ..RaceQuery::default()
    };
    assert!(query.matches_content(&race));
}

#[test]
fn test_listing_is_capped_before_status_filter() {
    let races: Vec<Race> = (0..=LISTING_LIMIT)
        .map(|i| create_test_race(&format!("r{i}"), "Trail"))
        .collect();

    let listed = select_listed(races, &RaceQuery::default(), NOW);
    assert_eq!(listed.len(), LISTING_LIMIT);
}
