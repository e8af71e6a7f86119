// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Crowd reports claiming that a race's registration has closed.
//!
//! A report is created `pending` and moves exactly once, to `validated`
//! (quorum reached or admin validation) or to `rejected` (admin only).
//! Both are terminal; terminal reports never count toward quorum again.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Reason recorded when a visitor does not supply one.
pub const DEFAULT_REPORT_REASON: &str = "Registration closed";

/// Review state of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    /// Counting toward quorum, awaiting review.
    Pending,
    /// Confirmed, automatically or by an admin.
    Validated,
    /// Dismissed by an admin.
    Rejected,
}

impl ReportStatus {
    /// Returns the stored form of this status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Validated => "validated",
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
            "validated" => Ok(Self::Validated),
            "rejected" => Ok(Self::Rejected),
            _ => Err(DomainError::InvalidReportStatus(s.to_string())),
        }
    }

    /// Returns true if no further transition is possible.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Validated | Self::Rejected)
    }

    /// Validates a transition from this status to `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if this status is terminal or if `target` is
    /// `pending`.
    pub fn validate_transition(&self, target: Self) -> Result<(), DomainError> {
        if self.is_terminal() {
            return Err(DomainError::InvalidReportTransition {
                from: self.as_str().to_string(),
                to: target.as_str().to_string(),
                reason: String::from("report has already been reviewed"),
            });
        }
        if target == Self::Pending {
            return Err(DomainError::InvalidReportTransition {
                from: self.as_str().to_string(),
                to: target.as_str().to_string(),
                reason: String::from("report is already pending"),
            });
        }
        Ok(())
    }
}

impl std::str::FromStr for ReportStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A visitor report against one race.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Store-assigned identifier, increasing in submission order.
    pub id: i64,
    /// The reported race. Not enforced as a foreign key: reports outlive
    /// deleted races.
    pub race_id: String,
    /// Race name captured when the report was filed.
    pub race_name: String,
    /// Random per-report visitor identifier.
    pub reporter_fingerprint: String,
    /// Free-text reason.
    pub reason: String,
    /// Review state.
    pub status: ReportStatus,
    /// Submission instant (storage form).
    pub created_at: String,
    /// Admin account that reviewed the report, if reviewed by hand.
    pub reviewed_by: Option<String>,
    /// When the report left `pending`.
    pub reviewed_at: Option<String>,
}

/// Returns the trimmed reason, or the default when it is absent or blank.
#[must_use]
pub fn normalize_reason(reason: Option<&str>) -> String {
    reason
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or(DEFAULT_REPORT_REASON)
        .to_string()
}
