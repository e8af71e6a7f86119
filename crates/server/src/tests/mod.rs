// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]


use std::sync::{Arc, Mutex as StdMutex};

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use time::{Duration, OffsetDateTime};
use tokio::sync::Mutex;
use tower::ServiceExt;
use trail_france::ReportingPolicy;
use trail_france_api::{EngineConfig, Notification, NotificationSink};
use trail_france_persistence::Persistence;

use crate::{AppState, build_router};

pub const ADMIN_EMAIL: &str = "admin@trail-france.test";
pub const ADMIN_PASSWORD: &str = "admin-password";
pub const MODERATION_EMAIL: &str = "moderation@trail-france.test";
pub const USER_PASSWORD: &str = "runner-password";

/// Collects the notifications handlers schedule.
#[derive(Default)]
pub struct RecordingSink {
    submitted: StdMutex<Vec<Notification>>,
}

impl RecordingSink {
    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.submitted.lock().unwrap())
    }
}

impl NotificationSink for RecordingSink {
    fn submit(&self, notification: Notification) {
        self.submitted.lock().unwrap().push(notification);
    }
}

/// A router over a fresh in-memory store with one bootstrap admin.
pub struct TestApp {
    router: Router,
    pub notifications: Arc<RecordingSink>,
}

pub fn create_test_app() -> TestApp {
    let mut persistence: Persistence =
        Persistence::new_in_memory().expect("Failed to create in-memory persistence");
    trail_france_api::bootstrap_admin(
        &mut persistence,
        ADMIN_EMAIL,
        ADMIN_PASSWORD,
        "Admin",
        OffsetDateTime::now_utc(),
    )
    .unwrap();

    let notifications: Arc<RecordingSink> = Arc::new(RecordingSink::default());
    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        config: Arc::new(EngineConfig::new(
            ReportingPolicy::new(3, Duration::days(7)).unwrap(),
            String::from(MODERATION_EMAIL),
        )),
        notifier: notifications.clone(),
    };

    TestApp {
        router: build_router(app_state),
        notifications,
    }
}

/// Race content whose registration is open and never closes.
pub fn race_body(name: &str) -> Value {
    json!({
        "name": name,
        "description": "Boucle en altitude",
        "location": "Chamonix",
        "region": "Auvergne-Rhône-Alpes",
        "department": "Haute-Savoie",
        "latitude": 45.92,
        "longitude": 6.87,
        "distance_km": 42.0,
        "elevation_gain": 2500,
        "race_date": "2030-08-29",
        "registration_open_date": "2020-01-01",
        "is_utmb": false
    })
}

impl TestApp {
    /// Sends one request and returns the status and the JSON body
    /// (`Null` when the body is empty or not JSON).
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body: Body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status: StatusCode = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    pub async fn login(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .request(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["session_token"].as_str().unwrap().to_string()
    }

    pub async fn admin_token(&self) -> String {
        self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }

    /// Registers a user account and returns a session token for it.
    pub async fn user_token(&self, email: &str) -> String {
        let (status, body) = self
            .request(
                "POST",
                "/api/auth/register",
                None,
                Some(json!({ "email": email, "password": USER_PASSWORD, "name": "Runner" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "register failed: {body}");
        self.login(email, USER_PASSWORD).await
    }

    /// Creates a race and returns its id.
    pub async fn create_race(&self, token: &str, name: &str) -> String {
        let (status, body) = self
            .request("POST", "/api/races", Some(token), Some(race_body(name)))
            .await;
        assert_eq!(status, StatusCode::OK, "create race failed: {body}");
        body["id"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn test_service_banner() {
    let app: TestApp = create_test_app();
    let (status, body) = app.request("GET", "/api", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Trail France API");
}
