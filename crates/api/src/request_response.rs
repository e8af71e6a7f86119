// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.

use serde::{Deserialize, Serialize};
use trail_france_domain::{Race, RegistrationStatus};
use trail_france_persistence::{AccountData, FavoriteData};

/// API request to register an account.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// API request to log in.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Public view of an account. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub created_at: String,
    pub email_notifications: bool,
}

impl From<AccountData> for AccountResponse {
    fn from(account: AccountData) -> Self {
        Self {
            id: account.account_id,
            email: account.email,
            name: account.name,
            role: account.role,
            created_at: account.created_at,
            email_notifications: account.email_notifications,
        }
    }
}

/// API response for a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token for subsequent requests.
    pub session_token: String,
    pub expires_at: String,
    pub account: AccountResponse,
}

/// A race as served to clients: stored fields plus the registration
/// status computed at response time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceResponse {
    #[serde(flatten)]
    pub race: Race,
    pub registration_status: RegistrationStatus,
}

impl RaceResponse {
    #[must_use]
    pub const fn new(race: Race, registration_status: RegistrationStatus) -> Self {
        Self {
            race,
            registration_status,
        }
    }
}

/// Listing filters as received from the query string.
///
/// `registration_status` stays a string here so an unknown value can be
/// refused with a proper message instead of a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ListRacesRequest {
    pub region: Option<String>,
    pub department: Option<String>,
    pub min_distance: Option<f64>,
    pub max_distance: Option<f64>,
    pub is_utmb: Option<bool>,
    pub registration_status: Option<String>,
    pub search: Option<String>,
}

/// API request to submit a crowd report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SubmitReportRequest {
    pub reason: Option<String>,
}

/// API response for a submitted report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitReportResponse {
    pub message: String,
    /// Whether this report completed the quorum.
    pub auto_closed: bool,
    /// Pending reports in the lookback window, this one included.
    pub report_count: u32,
}

/// API response for an admin review of a race's reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewReportsResponse {
    pub message: String,
    /// Reports moved out of `pending`.
    pub modified: usize,
}

/// API request to moderate a race.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModerateRaceRequest {
    /// `approve` or `reject`.
    pub action: String,
    pub reason: Option<String>,
}

/// A favorite together with its race.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteEntry {
    pub favorite: FavoriteData,
    pub race: RaceResponse,
}

/// Generic acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
