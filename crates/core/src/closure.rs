// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Forced registration closure.
//!
//! Both the report quorum and an admin validation close registration the
//! same way: the close date becomes the current instant, so the
//! registration calculator reports `closed` from then on. They differ only
//! in which flags are stamped on the race.

use time::OffsetDateTime;
use trail_france_domain::format_timestamp;

use crate::error::CoreError;

/// Who closed registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClosureCause {
    /// The report quorum was reached.
    ReportQuorum,
    /// An admin validated the reports.
    AdminValidation {
        /// The validating admin account.
        admin_id: String,
    },
}

/// Field values to write on a race when registration is forced closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForcedClosure {
    /// New `registration_close_date`.
    pub close_date: String,
    /// Stamp for `auto_closed_at` or `closed_at`.
    pub stamped_at: String,
    /// Why registration closed.
    pub cause: ClosureCause,
}

/// Builds the closure written at `now`.
///
/// # Errors
///
/// Returns an error if `now` cannot be rendered in storage form.
pub fn force_close(now: OffsetDateTime, cause: ClosureCause) -> Result<ForcedClosure, CoreError> {
    let stamp: String = format_timestamp(now)?;
    Ok(ForcedClosure {
        close_date: stamp.clone(),
        stamped_at: stamp,
        cause,
    })
}
