// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A race content field is missing or out of range.
    InvalidRaceField {
        /// The offending field name.
        field: String,
        /// Why the value was refused.
        reason: String,
    },
    /// A stored or submitted moderation status is not recognized.
    InvalidModerationStatus(String),
    /// A moderation action other than `approve` or `reject` was requested.
    InvalidModerationAction(String),
    /// A stored report status is not recognized.
    InvalidReportStatus(String),
    /// A report status transition is not allowed.
    InvalidReportTransition {
        /// The current status.
        from: String,
        /// The requested status.
        to: String,
        /// The reason the transition is refused.
        reason: String,
    },
    /// A registration status filter value is not recognized.
    InvalidRegistrationStatus(String),
    /// A timestamp string could not be parsed.
    InvalidTimestamp {
        /// The raw value.
        value: String,
        /// The parser error.
        error: String,
    },
    /// A timestamp could not be rendered to its storage form.
    TimestampFormat {
        /// The formatter error.
        error: String,
    },
    /// An email address is empty or malformed.
    InvalidEmail(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRaceField { field, reason } => {
                write!(f, "Invalid race field '{field}': {reason}")
            }
            Self::InvalidModerationStatus(value) => {
                write!(f, "Invalid moderation status: {value}")
            }
            Self::InvalidModerationAction(value) => {
                write!(
                    f,
                    "Invalid moderation action '{value}': expected 'approve' or 'reject'"
                )
            }
            Self::InvalidReportStatus(value) => write!(f, "Invalid report status: {value}"),
            Self::InvalidReportTransition { from, to, reason } => {
                write!(
                    f,
                    "Invalid report status transition from {from} to {to}: {reason}"
                )
            }
            Self::InvalidRegistrationStatus(value) => {
                write!(
                    f,
                    "Invalid registration status '{value}': expected 'not_open', 'open' or 'closed'"
                )
            }
            Self::InvalidTimestamp { value, error } => {
                write!(f, "Invalid timestamp '{value}': {error}")
            }
            Self::TimestampFormat { error } => write!(f, "Failed to format timestamp: {error}"),
            Self::InvalidEmail(value) => write!(f, "Invalid email address: '{value}'"),
        }
    }
}

impl std::error::Error for DomainError {}
