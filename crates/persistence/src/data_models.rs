// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde::{Deserialize, Serialize};

/// A stored account, including its password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountData {
    pub account_id: String,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: String,
    pub email_notifications: bool,
    pub created_at: String,
}

/// A stored login session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    pub session_id: i64,
    pub session_token: String,
    pub account_id: String,
    pub created_at: String,
    pub last_activity_at: String,
    pub expires_at: String,
}

/// A race bookmarked by an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteData {
    pub favorite_id: String,
    pub account_id: String,
    pub race_id: String,
    pub notify_on_registration: bool,
    pub created_at: String,
}

/// A report about to be written. The store assigns the id and the
/// initial `pending` status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReport {
    pub race_id: String,
    pub race_name: String,
    pub reporter_fingerprint: String,
    pub reason: String,
    pub created_at: String,
}

/// Who forced a race's registration closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosureMark<'a> {
    /// The report quorum was reached.
    Automatic,
    /// An admin validated the pending reports.
    Manual { admin_id: &'a str },
}
