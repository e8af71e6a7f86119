// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use trail_france_domain::DomainError;

/// Failures of the race directory store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// The database path is not valid UTF-8.
    InvalidDatabasePath(String),
    /// The connection could not be opened.
    ConnectionFailed(String),
    /// A connection pragma could not be applied.
    PragmaFailed(String),
    /// Embedded migrations failed to apply.
    MigrationFailed(String),
    /// `PRAGMA foreign_keys` is off after setup.
    ForeignKeyEnforcementNotEnabled,
    /// An email or favorite already exists.
    UniqueViolation(String),
    /// The row to update or delete does not exist.
    NotFound(String),
    /// A stored value no longer parses into its domain type.
    CorruptRow(String),
    /// A report status change that the lifecycle forbids.
    InvalidTransition(String),
    /// bcrypt failed to hash or verify.
    PasswordHashing(String),
    /// Any other database failure.
    Database(String),
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDatabasePath(path) => write!(f, "Invalid database path: {path}"),
            Self::ConnectionFailed(msg) => write!(f, "Could not open database: {msg}"),
            Self::PragmaFailed(msg) => write!(f, "Could not configure database: {msg}"),
            Self::MigrationFailed(msg) => write!(f, "Migration failed: {msg}"),
            Self::ForeignKeyEnforcementNotEnabled => {
                write!(f, "Foreign key enforcement is not enabled")
            }
            Self::UniqueViolation(msg) => write!(f, "Already exists: {msg}"),
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::CorruptRow(msg) => write!(f, "Stored row is invalid: {msg}"),
            Self::InvalidTransition(msg) => write!(f, "Invalid status change: {msg}"),
            Self::PasswordHashing(msg) => write!(f, "Password hashing failed: {msg}"),
            Self::Database(msg) => write!(f, "Database error: {msg}"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<DieselError> for PersistenceError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => Self::NotFound(String::from("no matching row")),
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                Self::UniqueViolation(info.message().to_string())
            }
            other => Self::Database(other.to_string()),
        }
    }
}

impl From<DomainError> for PersistenceError {
    fn from(err: DomainError) -> Self {
        Self::CorruptRow(err.to_string())
    }
}
