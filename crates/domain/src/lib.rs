// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Domain types and rule validation for the Trail France race directory.
//!
//! This crate owns the entities the rest of the system moves around
//! (races, crowd reports, account emails) and the pure rules attached to
//! them. Nothing in here performs I/O or reads the clock: every
//! time-dependent function takes `now` as an argument.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod account;
mod error;
mod moderation;
mod race;
mod registration;
mod report;
mod timestamp;

#[cfg(test)]
mod tests;

pub use account::normalize_email;
pub use error::DomainError;
pub use moderation::{ModerationAction, ModerationStatus};
pub use race::{Race, RaceDraft, RacePatch};
pub use registration::{DateBoundary, RegistrationStatus, parse_boundary, registration_status};
pub use report::{DEFAULT_REPORT_REASON, Report, ReportStatus, normalize_reason};
pub use timestamp::{format_timestamp, parse_timestamp};
