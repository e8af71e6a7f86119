// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Storage form for instants.
//!
//! Every instant written by the system (creation times, closure stamps,
//! report review times) uses one fixed-width UTC layout:
//! `YYYY-MM-DDTHH:MM:SS.ffffffZ`. Because the width never varies, the
//! lexical order of two stored values equals their chronological order,
//! which lets the store evaluate the report lookback window as a plain
//! range predicate. The layout is also valid RFC 3339, so the registration
//! calculator accepts it as a fully qualified timestamp.

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::error::DomainError;

const STORAGE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6]Z");

/// Renders an instant in the fixed-width UTC storage form.
///
/// # Errors
///
/// Returns an error if the instant cannot be represented (years outside
/// 0000-9999).
pub fn format_timestamp(at: OffsetDateTime) -> Result<String, DomainError> {
    at.to_offset(UtcOffset::UTC)
        .format(STORAGE_FORMAT)
        .map_err(|e| DomainError::TimestampFormat {
            error: e.to_string(),
        })
}

/// Parses a value previously produced by [`format_timestamp`].
///
/// # Errors
///
/// Returns an error if the value is not in the storage form.
pub fn parse_timestamp(value: &str) -> Result<OffsetDateTime, DomainError> {
    PrimitiveDateTime::parse(value, STORAGE_FORMAT)
        .map(PrimitiveDateTime::assume_utc)
        .map_err(|e| DomainError::InvalidTimestamp {
            value: value.to_string(),
            error: e.to_string(),
        })
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_format_is_fixed_width_utc() {
        let whole_second: String = format_timestamp(datetime!(2026-03-01 08:00:00 UTC)).unwrap();
        let fractional: String =
            format_timestamp(datetime!(2026-03-01 08:00:00.5 UTC)).unwrap();

        assert_eq!(whole_second, "2026-03-01T08:00:00.000000Z");
        assert_eq!(fractional, "2026-03-01T08:00:00.500000Z");
        assert_eq!(whole_second.len(), fractional.len());
        assert!(whole_second < fractional);
    }

    #[test]
    fn test_format_converts_offsets_to_utc() {
        let formatted: String =
            format_timestamp(datetime!(2026-03-01 10:30:00 +02:00)).unwrap();
        assert_eq!(formatted, "2026-03-01T08:30:00.000000Z");
    }

    #[test]
    fn test_parse_reads_back_formatted_value() {
        let at: OffsetDateTime = datetime!(2026-07-14 23:59:59.123456 UTC);
        let parsed: OffsetDateTime = parse_timestamp(&format_timestamp(at).unwrap()).unwrap();
        assert_eq!(parsed, at);
    }

    #[test]
    fn test_parse_rejects_other_layouts() {
        assert!(matches!(
            parse_timestamp("2026-07-14"),
            Err(DomainError::InvalidTimestamp { .. })
        ));
    }
}
