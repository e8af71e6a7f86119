// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use trail_france_domain::{ModerationStatus, Race, RaceDraft, Report, ReportStatus};

pub fn create_test_race(id: &str, name: &str) -> Race {
    Race {
        id: id.to_string(),
        content: RaceDraft {
            name: name.to_string(),
            description: String::from("Test race"),
            location: String::from("Chamonix"),
            region: String::from("Auvergne-Rhône-Alpes"),
            department: String::from("Haute-Savoie"),
            latitude: 45.92,
            longitude: 6.87,
            distance_km: 42.0,
            elevation_gain: 2500,
            race_date: String::from("2026-08-28"),
            registration_open_date: String::from("2026-01-10"),
            registration_close_date: Some(String::from("2026-06-30")),
            is_utmb: false,
            website_url: None,
            image_url: None,
        },
        moderation_status: ModerationStatus::Approved,
        submitted_by: None,
        created_at: String::from("2026-01-01T00:00:00.000000Z"),
        auto_closed_by_reports: false,
        auto_closed_at: None,
        manually_closed: false,
        closed_at: None,
        closed_by: None,
    }
}

pub fn create_test_report(id: i64, race_id: &str, created_at: &str) -> Report {
    Report {
        id,
        race_id: race_id.to_string(),
        race_name: format!("Race {race_id}"),
        reporter_fingerprint: format!("visitor-{id}"),
        reason: String::from("Registration closed"),
        status: ReportStatus::Pending,
        created_at: created_at.to_string(),
        reviewed_by: None,
        reviewed_at: None,
    }
}
