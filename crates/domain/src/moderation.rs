// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Moderation status of a race.
//!
//! Moderation gates visibility: only `approved` races appear in public
//! listings. A race starts `approved` when an admin creates it and
//! `pending` otherwise. Admin moderation may move a race to `approved`
//! or `rejected` from any state, overwriting the previous decision.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Admin-controlled visibility state of a race.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationStatus {
    /// Awaiting admin review; visible only in the pending queue.
    Pending,
    /// Publicly listed.
    Approved,
    /// Retained but hidden from every public path.
    Rejected,
}

impl ModerationStatus {
    /// Returns the stored form of this status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parses a status from its stored form.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a known status.
    pub fn parse_str(s: &str) -> Result<Self, DomainError> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(DomainError::InvalidModerationStatus(s.to_string())),
        }
    }

    /// Initial status for a newly submitted race.
    #[must_use]
    pub const fn initial(submitted_by_admin: bool) -> Self {
        if submitted_by_admin {
            Self::Approved
        } else {
            Self::Pending
        }
    }

    /// Returns true if races in this status may appear in public listings.
    #[must_use]
    pub const fn is_publicly_visible(&self) -> bool {
        matches!(self, Self::Approved)
    }
}

impl std::str::FromStr for ModerationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for ModerationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A moderation decision requested by an admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationAction {
    /// Publish the race.
    Approve,
    /// Hide the race.
    Reject,
}

impl ModerationAction {
    /// Parses an action from its request form.
    ///
    /// # Errors
    ///
    /// Returns an error for anything other than `approve` or `reject`.
    pub fn parse_str(s: &str) -> Result<Self, DomainError> {
        match s {
            "approve" => Ok(Self::Approve),
            "reject" => Ok(Self::Reject),
            _ => Err(DomainError::InvalidModerationAction(s.to_string())),
        }
    }

    /// The status a race ends up in after this action.
    #[must_use]
    pub const fn target_status(&self) -> ModerationStatus {
        match self {
            Self::Approve => ModerationStatus::Approved,
            Self::Reject => ModerationStatus::Rejected,
        }
    }

    /// Past participle used in user-facing messages.
    #[must_use]
    pub const fn past_tense(&self) -> &'static str {
        match self {
            Self::Approve => "approved",
            Self::Reject => "rejected",
        }
    }
}

impl std::str::FromStr for ModerationAction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}
