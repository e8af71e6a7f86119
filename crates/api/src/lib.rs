// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API boundary for the Trail France race directory.
//!
//! Handlers here orchestrate the lifecycle engine (`trail_france`), the
//! store (`trail_france_persistence`) and notification scheduling. They
//! are transport-agnostic and synchronous: the HTTP server owns the clock,
//! the store lock, and the notification dispatcher.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod auth;
mod config;
mod error;
mod handlers;
mod notifications;
mod password_policy;
mod reporting;
mod request_response;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedActor, AuthenticationService, AuthorizationService, Role};
pub use config::EngineConfig;
pub use error::{
    ApiError, AuthError, translate_core_error, translate_domain_error,
    translate_persistence_error,
};
pub use handlers::{
    PENDING_QUEUE_LIMIT, add_favorite, bootstrap_admin, create_race, delete_race, get_race,
    list_departments, list_favorites, list_pending_races, list_races, list_regions, login, logout,
    moderate_race, parse_race_query, register, remove_favorite, set_favorite_notify, update_race,
    update_settings, whoami,
};
pub use notifications::{Notification, NotificationSink, RaceSummary};
pub use password_policy::{PasswordPolicy, PasswordPolicyError};
pub use reporting::{list_pending_reports, reject_reports, submit_report, validate_reports};
pub use request_response::{
    AccountResponse, FavoriteEntry, ListRacesRequest, LoginRequest, LoginResponse,
    MessageResponse, ModerateRaceRequest, RaceResponse, RegisterRequest, ReviewReportsResponse,
    SubmitReportRequest, SubmitReportResponse,
};
pub use trail_france::ReportGroup;
