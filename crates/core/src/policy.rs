// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::{Duration, OffsetDateTime};

use crate::error::CoreError;

/// Quorum size and lookback window for crowd reports.
///
/// The policy is an immutable value built once from configuration and
/// passed to every report submission; nothing about it is global.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportingPolicy {
    threshold: u32,
    lookback: Duration,
}

impl ReportingPolicy {
    /// Default quorum size.
    pub const DEFAULT_THRESHOLD: u32 = 3;
    /// Default lookback window.
    pub const DEFAULT_LOOKBACK: Duration = Duration::days(7);

    /// Creates a policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the threshold is zero or the lookback is not
    /// positive.
    pub fn new(threshold: u32, lookback: Duration) -> Result<Self, CoreError> {
        if threshold == 0 {
            return Err(CoreError::InvalidPolicy {
                reason: String::from("report threshold must be at least 1"),
            });
        }
        if !lookback.is_positive() {
            return Err(CoreError::InvalidPolicy {
                reason: String::from("report lookback must be positive"),
            });
        }
        Ok(Self {
            threshold,
            lookback,
        })
    }

    /// Number of pending reports that closes registration.
    #[must_use]
    pub const fn threshold(&self) -> u32 {
        self.threshold
    }

    /// How far back pending reports still count.
    #[must_use]
    pub const fn lookback(&self) -> Duration {
        self.lookback
    }

    /// Earliest creation instant of a report that still counts at `now`.
    #[must_use]
    pub fn window_start(&self, now: OffsetDateTime) -> OffsetDateTime {
        now.checked_sub(self.lookback)
            .unwrap_or(OffsetDateTime::UNIX_EPOCH)
    }
}

impl Default for ReportingPolicy {
    fn default() -> Self {
        Self {
            threshold: Self::DEFAULT_THRESHOLD,
            lookback: Self::DEFAULT_LOOKBACK,
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_default_policy() {
        let policy: ReportingPolicy = ReportingPolicy::default();
        assert_eq!(policy.threshold(), 3);
        assert_eq!(policy.lookback(), Duration::days(7));
    }

    #[test]
    fn test_zero_threshold_is_refused() {
        assert!(matches!(
            ReportingPolicy::new(0, Duration::days(7)),
            Err(CoreError::InvalidPolicy { .. })
        ));
    }

    #[test]
    fn test_non_positive_lookback_is_refused() {
        assert!(ReportingPolicy::new(3, Duration::ZERO).is_err());
        assert!(ReportingPolicy::new(3, Duration::days(-1)).is_err());
    }

    #[test]
    fn test_window_start() {
        let policy: ReportingPolicy = ReportingPolicy::new(2, Duration::days(2)).unwrap();
        assert_eq!(
            policy.window_start(datetime!(2026-05-10 12:00:00 UTC)),
            datetime!(2026-05-08 12:00:00 UTC)
        );
    }
}
