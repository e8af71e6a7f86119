// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use trail_france::CoreError;
use trail_france_domain::DomainError;
use trail_france_persistence::PersistenceError;

use crate::password_policy::PasswordPolicyError;

/// Failures while establishing or checking who is calling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Bad credentials, or an unknown or expired session.
    AuthenticationFailed { reason: String },
    /// The caller is known but lacks the role for `action`.
    Unauthorized {
        action: String,
        required_role: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => write!(f, "Authentication failed: {reason}"),
            Self::Unauthorized {
                action,
                required_role,
            } => write!(f, "'{action}' requires the {required_role} role"),
        }
    }
}

impl std::error::Error for AuthError {}

/// Errors returned by every use case in this crate.
///
/// The server maps each variant onto one HTTP status; the message is shown
/// to the client as is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    AuthenticationFailed {
        reason: String,
    },
    Unauthorized {
        action: String,
        required_role: String,
    },
    /// The request is well-formed but a lifecycle rule forbids it.
    DomainRuleViolation {
        rule: String,
        message: String,
    },
    /// A field failed validation; `field` uses the wire name.
    InvalidInput {
        field: String,
        message: String,
    },
    ResourceNotFound {
        resource_type: String,
        message: String,
    },
    /// Duplicate email or favorite.
    Conflict {
        resource_type: String,
        message: String,
    },
    PasswordPolicyViolation {
        message: String,
    },
    /// Store or clock failure; never the caller's fault.
    Internal {
        message: String,
    },
}

impl ApiError {
    /// The 404 returned when a race id does not resolve.
    #[must_use]
    pub fn race_not_found(race_id: &str) -> Self {
        Self::ResourceNotFound {
            resource_type: String::from("Race"),
            message: format!("Race '{race_id}' does not exist"),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => write!(f, "Authentication failed: {reason}"),
            Self::Unauthorized {
                action,
                required_role,
            } => write!(f, "'{action}' requires the {required_role} role"),
            Self::DomainRuleViolation { rule, message } => write!(f, "{message} ({rule})"),
            Self::InvalidInput { field, message } => write!(f, "Invalid {field}: {message}"),
            Self::ResourceNotFound { message, .. }
            | Self::Conflict { message, .. }
            | Self::PasswordPolicyViolation { message } => write!(f, "{message}"),
            Self::Internal { message } => write!(f, "Internal error: {message}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Unauthorized {
                action,
                required_role,
            } => Self::Unauthorized {
                action,
                required_role,
            },
        }
    }
}

impl From<PasswordPolicyError> for ApiError {
    fn from(err: PasswordPolicyError) -> Self {
        Self::PasswordPolicyViolation {
            message: err.to_string(),
        }
    }
}

/// Maps a domain validation failure onto the wire-level error.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::InvalidRaceField { field, reason } => ApiError::InvalidInput {
            field,
            message: reason,
        },
        DomainError::InvalidModerationStatus(value) => ApiError::InvalidInput {
            field: String::from("moderation_status"),
            message: format!("Unknown moderation status '{value}'"),
        },
        DomainError::InvalidModerationAction(value) => ApiError::InvalidInput {
            field: String::from("action"),
            message: format!("Unknown action '{value}', expected 'approve' or 'reject'"),
        },
        DomainError::InvalidReportStatus(value) => ApiError::InvalidInput {
            field: String::from("status"),
            message: format!("Unknown report status '{value}'"),
        },
        DomainError::InvalidReportTransition { from, to, reason } => {
            ApiError::DomainRuleViolation {
                rule: String::from("report_transition"),
                message: format!("Cannot move report from {from} to {to}: {reason}"),
            }
        }
        DomainError::InvalidRegistrationStatus(value) => ApiError::InvalidInput {
            field: String::from("registration_status"),
            message: format!(
                "Unknown registration status '{value}', expected 'not_open', 'open' or 'closed'"
            ),
        },
        DomainError::InvalidTimestamp { value, error } => ApiError::InvalidInput {
            field: String::from("timestamp"),
            message: format!("Failed to parse '{value}': {error}"),
        },
        DomainError::TimestampFormat { error } => ApiError::Internal {
            message: format!("Failed to format timestamp: {error}"),
        },
        DomainError::InvalidEmail(value) => ApiError::InvalidInput {
            field: String::from("email"),
            message: format!("'{value}' is not a valid email address"),
        },
    }
}

/// Maps an engine failure onto the wire-level error.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::InvalidPolicy { reason } => ApiError::Internal {
            message: format!("Invalid reporting policy: {reason}"),
        },
    }
}

/// Translates a persistence error into an API error.
///
/// Missing rows and uniqueness collisions are client errors; everything
/// else is internal.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::NotFound(message) => ApiError::ResourceNotFound {
            resource_type: String::from("Resource"),
            message,
        },
        PersistenceError::UniqueViolation(message) => ApiError::Conflict {
            resource_type: String::from("Resource"),
            message,
        },
        other => ApiError::Internal {
            message: other.to_string(),
        },
    }
}
