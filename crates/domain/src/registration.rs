// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Registration status classification.
//!
//! The registration status of a race is never stored. It is recomputed
//! from `(now, registration_open_date, registration_close_date)` every
//! time a race is serialized.
//!
//! ## Date Interpretation
//!
//! - A bare calendar date (`2025-06-01`) covers the whole day in UTC: it
//!   starts at `00:00:00` when used as an opening date and ends at
//!   `23:59:59` when used as a closing date.
//! - An RFC 3339 timestamp (`2025-06-01T08:00:00+02:00`) is used as-is.
//! - A date-time without an offset (`2025-06-01T08:00:00`) is read as UTC.
//!
//! ## Invariants
//!
//! - `not_open` iff `now < open`
//! - `closed` iff a close date is present and `now > close`
//! - `open` otherwise
//! - Any value that cannot be parsed yields `not_open`; the classifier
//!   never fails.

use serde::{Deserialize, Serialize};
use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};

use crate::error::DomainError;

const BARE_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const NAIVE_DATE_TIME: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
const NAIVE_DATE_TIME_FRACTIONAL: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]");

/// Derived sign-up state of a race.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    /// Registration has not opened yet, or its dates are unreadable.
    NotOpen,
    /// Registration is currently open.
    Open,
    /// Registration has closed.
    Closed,
}

impl RegistrationStatus {
    /// Returns the wire form of this status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotOpen => "not_open",
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }

    /// Parses a status from its wire form.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a known status.
    pub fn parse_str(s: &str) -> Result<Self, DomainError> {
        match s {
            "not_open" => Ok(Self::NotOpen),
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            _ => Err(DomainError::InvalidRegistrationStatus(s.to_string())),
        }
    }
}

impl std::str::FromStr for RegistrationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which end of the registration period a date describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateBoundary {
    /// The opening date; a bare date starts at midnight UTC.
    Opening,
    /// The closing date; a bare date ends at 23:59:59 UTC.
    Closing,
}

/// Parses a registration date into an instant.
///
/// # Arguments
///
/// * `value` - The stored date or timestamp
/// * `boundary` - Whether the value opens or closes the period
///
/// # Errors
///
/// Returns an error if the value matches none of the accepted layouts.
pub fn parse_boundary(value: &str, boundary: DateBoundary) -> Result<OffsetDateTime, DomainError> {
    let value: &str = value.trim();

    if let Ok(date) = Date::parse(value, BARE_DATE) {
        let time_of_day: Time = match boundary {
            DateBoundary::Opening => Time::MIDNIGHT,
            DateBoundary::Closing => {
                Time::from_hms(23, 59, 59).map_err(|e| DomainError::InvalidTimestamp {
                    value: value.to_string(),
                    error: e.to_string(),
                })?
            }
        };
        return Ok(PrimitiveDateTime::new(date, time_of_day).assume_utc());
    }

    if let Ok(at) = OffsetDateTime::parse(value, &Rfc3339) {
        return Ok(at);
    }

    PrimitiveDateTime::parse(value, NAIVE_DATE_TIME)
        .or_else(|_| PrimitiveDateTime::parse(value, NAIVE_DATE_TIME_FRACTIONAL))
        .map(PrimitiveDateTime::assume_utc)
        .map_err(|e| DomainError::InvalidTimestamp {
            value: value.to_string(),
            error: e.to_string(),
        })
}

/// Classifies the registration period of a race at `now`.
///
/// An empty close date is treated as absent.
#[must_use]
pub fn registration_status(
    now: OffsetDateTime,
    open_date: &str,
    close_date: Option<&str>,
) -> RegistrationStatus {
    let Ok(opens_at) = parse_boundary(open_date, DateBoundary::Opening) else {
        return RegistrationStatus::NotOpen;
    };
    if now < opens_at {
        return RegistrationStatus::NotOpen;
    }

    match close_date.map(str::trim).filter(|c| !c.is_empty()) {
        None => RegistrationStatus::Open,
        Some(close) => match parse_boundary(close, DateBoundary::Closing) {
            Ok(closes_at) if now > closes_at => RegistrationStatus::Closed,
            Ok(_) => RegistrationStatus::Open,
            Err(_) => RegistrationStatus::NotOpen,
        },
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_before_opening_is_not_open() {
        let now: OffsetDateTime = datetime!(2025-05-31 23:59:59 UTC);
        assert_eq!(
            registration_status(now, "2025-06-01", None),
            RegistrationStatus::NotOpen
        );
    }

    #[test]
    fn test_bare_opening_date_starts_at_midnight_utc() {
        let now: OffsetDateTime = datetime!(2025-06-01 00:00:00 UTC);
        assert_eq!(
            registration_status(now, "2025-06-01", None),
            RegistrationStatus::Open
        );
    }

    #[test]
    fn test_open_without_close_date_stays_open() {
        let now: OffsetDateTime = datetime!(2030-01-01 00:00:00 UTC);
        assert_eq!(
            registration_status(now, "2025-06-01", None),
            RegistrationStatus::Open
        );
    }

    #[test]
    fn test_bare_close_date_covers_whole_day() {
        let late_on_close_day: OffsetDateTime = datetime!(2025-06-30 23:59:59 UTC);
        let just_after: OffsetDateTime = datetime!(2025-07-01 00:00:00 UTC);

        assert_eq!(
            registration_status(late_on_close_day, "2025-06-01", Some("2025-06-30")),
            RegistrationStatus::Open
        );
        assert_eq!(
            registration_status(just_after, "2025-06-01", Some("2025-06-30")),
            RegistrationStatus::Closed
        );
    }

    #[test]
    fn test_bare_close_date_equals_end_of_day_timestamp() {
        let instants: [OffsetDateTime; 4] = [
            datetime!(2025-06-01 12:00:00 UTC),
            datetime!(2025-06-01 23:59:59 UTC),
            datetime!(2025-06-01 23:59:59.5 UTC),
            datetime!(2025-06-02 00:00:00 UTC),
        ];
        for now in instants {
            assert_eq!(
                registration_status(now, "2025-05-01", Some("2025-06-01")),
                registration_status(now, "2025-05-01", Some("2025-06-01T23:59:59Z")),
                "mismatch at {now}"
            );
        }
    }

    #[test]
    fn test_offset_timestamps_are_used_as_is() {
        // 08:00 in +02:00 is 06:00 UTC.
        let before: OffsetDateTime = datetime!(2025-06-01 05:59:59 UTC);
        let after: OffsetDateTime = datetime!(2025-06-01 06:00:00 UTC);

        assert_eq!(
            registration_status(before, "2025-06-01T08:00:00+02:00", None),
            RegistrationStatus::NotOpen
        );
        assert_eq!(
            registration_status(after, "2025-06-01T08:00:00+02:00", None),
            RegistrationStatus::Open
        );
    }

    #[test]
    fn test_naive_date_time_is_read_as_utc() {
        let now: OffsetDateTime = datetime!(2025-06-01 10:00:01 UTC);
        assert_eq!(
            registration_status(now, "2025-06-01T10:00:00", Some("2025-06-01T10:00:00.5")),
            RegistrationStatus::Closed
        );
    }

    #[test]
    fn test_unparseable_dates_yield_not_open() {
        let now: OffsetDateTime = datetime!(2025-06-01 12:00:00 UTC);

        assert_eq!(
            registration_status(now, "soon", None),
            RegistrationStatus::NotOpen
        );
        assert_eq!(
            registration_status(now, "", None),
            RegistrationStatus::NotOpen
        );
        assert_eq!(
            registration_status(now, "2025-01-01", Some("31/12/2025")),
            RegistrationStatus::NotOpen
        );
    }

    #[test]
    fn test_blank_close_date_is_absent() {
        let now: OffsetDateTime = datetime!(2025-06-01 12:00:00 UTC);
        assert_eq!(
            registration_status(now, "2025-01-01", Some("  ")),
            RegistrationStatus::Open
        );
    }

    #[test]
    fn test_close_at_exact_instant_is_still_open() {
        let now: OffsetDateTime = datetime!(2025-06-01 12:00:00 UTC);
        assert_eq!(
            registration_status(now, "2025-01-01", Some("2025-06-01T12:00:00Z")),
            RegistrationStatus::Open
        );
    }

    #[test]
    fn test_status_wire_form() {
        assert_eq!(RegistrationStatus::NotOpen.as_str(), "not_open");
        assert_eq!(
            "closed".parse::<RegistrationStatus>().unwrap(),
            RegistrationStatus::Closed
        );
        assert!(matches!(
            RegistrationStatus::parse_str("Open"),
            Err(DomainError::InvalidRegistrationStatus(_))
        ));
    }
}
