// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod account_tests;

use trail_france_domain::{ModerationStatus, RaceDraft};

use crate::{NewReport, Persistence};

pub fn create_test_draft(name: &str) -> RaceDraft {
    RaceDraft {
        name: name.to_string(),
        description: String::from("Boucle technique en forêt"),
        location: String::from("Gérardmer"),
        region: String::from("Grand Est"),
        department: String::from("Vosges"),
        latitude: 48.07,
        longitude: 6.88,
        distance_km: 32.5,
        elevation_gain: 1400,
        race_date: String::from("2026-10-18"),
        registration_open_date: String::from("2026-04-01"),
        registration_close_date: None,
        is_utmb: false,
        website_url: Some(String::from("https://example.org/trail")),
        image_url: None,
    }
}

/// Inserts an approved race and returns its id.
pub fn insert_approved_race(persistence: &mut Persistence, name: &str) -> String {
    persistence
        .insert_race(
            &create_test_draft(name),
            ModerationStatus::Approved,
            None,
            "2026-01-01T00:00:00.000000Z",
        )
        .unwrap()
}

pub fn create_new_report(race_id: &str, created_at: &str) -> NewReport {
    NewReport {
        race_id: race_id.to_string(),
        race_name: String::from("Trail de la Vologne"),
        reporter_fingerprint: format!("visitor-{created_at}"),
        reason: String::from("Registration closed"),
        created_at: created_at.to_string(),
    }
}
