// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]


use crate::RaceDraft;

/// A valid race draft used across domain tests.
pub fn sample_draft() -> RaceDraft {
    RaceDraft {
        name: String::from("Trail des Sangliers"),
        description: String::from("Forest loop through the Ardennes"),
        location: String::from("Bouillon"),
        region: String::from("Grand Est"),
        department: String::from("Ardennes"),
        latitude: 49.79,
        longitude: 4.73,
        distance_km: 25.0,
        elevation_gain: 900,
        race_date: String::from("2026-09-12"),
        registration_open_date: String::from("2026-03-01"),
        registration_close_date: None,
        is_utmb: false,
        website_url: None,
        image_url: None,
    }
}
