// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Race lifecycle engine.
//!
//! Pure decisions behind the race directory: report quorum evaluation,
//! forced registration closure, moderation transitions, the admin review
//! queue and public listing selection. Callers load data from the store,
//! ask this crate what to do, and write the result back.

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

mod closure;
mod error;
mod listing;
mod moderation;
mod policy;
mod quorum;
mod review;

#[cfg(test)]
mod tests;

pub use closure::{ClosureCause, ForcedClosure, force_close};
pub use error::CoreError;
pub use listing::{LISTING_LIMIT, RaceQuery, select_listed};
pub use moderation::{ModerationTransition, moderate};
pub use policy::ReportingPolicy;
pub use quorum::{QuorumDecision, evaluate_quorum};
pub use review::{ReportGroup, group_pending_reports};
