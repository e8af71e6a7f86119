// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use std::sync::Mutex;

use time::macros::datetime;
use time::{Duration, OffsetDateTime};
use trail_france::ReportingPolicy;
use trail_france_domain::RaceDraft;
use trail_france_persistence::Persistence;

use crate::{
    AuthenticatedActor, EngineConfig, Notification, NotificationSink, RaceResponse, Role,
    create_race,
};

pub const ADMIN_EMAIL: &str = "moderation@trail-france.test";

pub fn test_now() -> OffsetDateTime {
    datetime!(2026-05-15 12:00:00 UTC)
}

pub fn create_test_admin() -> AuthenticatedActor {
    AuthenticatedActor::new(String::from("admin-123"), Role::Admin)
}

pub fn create_test_user() -> AuthenticatedActor {
    AuthenticatedActor::new(String::from("user-456"), Role::User)
}

pub fn create_test_config() -> EngineConfig {
    EngineConfig::new(
        ReportingPolicy::new(3, Duration::days(7)).unwrap(),
        String::from(ADMIN_EMAIL),
    )
}

/// A race whose registration opened yesterday and has no close date.
pub fn create_open_draft(name: &str) -> RaceDraft {
    let yesterday = (test_now() - Duration::days(1)).date();
    RaceDraft {
        name: name.to_string(),
        description: String::from("Sentiers en crête au-dessus du lac"),
        location: String::from("Annecy"),
        region: String::from("Auvergne-Rhône-Alpes"),
        department: String::from("Haute-Savoie"),
        latitude: 45.9,
        longitude: 6.13,
        distance_km: 55.0,
        elevation_gain: 3500,
        race_date: String::from("2026-09-12"),
        registration_open_date: yesterday.to_string(),
        registration_close_date: None,
        is_utmb: false,
        website_url: None,
        image_url: None,
    }
}

/// Creates an approved race through the admin path.
pub fn create_approved_race(persistence: &mut Persistence, name: &str) -> RaceResponse {
    create_race(
        persistence,
        &create_test_admin(),
        &create_open_draft(name),
        test_now(),
    )
    .unwrap()
}

/// Creates a stored account and returns an actor for it.
pub fn create_stored_actor(persistence: &mut Persistence, email: &str, role: Role) -> AuthenticatedActor {
    let account_id = persistence
        .create_account(email, "Test Runner", "long-enough-pw", role.as_str(), "2026-01-01T00:00:00.000000Z")
        .unwrap();
    AuthenticatedActor::new(account_id, role)
}

/// Keeps every submitted notification for inspection.
#[derive(Default)]
pub struct RecordingSink {
    submitted: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns and clears the recorded notifications.
    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.submitted.lock().unwrap())
    }
}

impl NotificationSink for RecordingSink {
    fn submit(&self, notification: Notification) {
        self.submitted.lock().unwrap().push(notification);
    }
}
