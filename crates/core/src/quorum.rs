// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Quorum evaluation for crowd reports.
//!
//! The count fed into [`evaluate_quorum`] is always re-derived from the
//! store (pending reports inside the lookback window, including the one
//! just filed). No running counter exists, so reports leaving the window
//! stop counting without any cleanup job.

use crate::policy::ReportingPolicy;

/// Outcome of counting the pending reports of one race.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuorumDecision {
    /// The quorum is reached: close registration and validate the
    /// pending reports.
    AutoClose {
        /// Pending reports inside the window.
        report_count: u32,
    },
    /// Not enough reports yet.
    BelowThreshold {
        /// Pending reports inside the window.
        report_count: u32,
        /// Reports needed to close.
        threshold: u32,
    },
}

/// Decides whether `pending_in_window` reports reach the quorum.
#[must_use]
pub const fn evaluate_quorum(policy: &ReportingPolicy, pending_in_window: u32) -> QuorumDecision {
    if pending_in_window >= policy.threshold() {
        QuorumDecision::AutoClose {
            report_count: pending_in_window,
        }
    } else {
        QuorumDecision::BelowThreshold {
            report_count: pending_in_window,
            threshold: policy.threshold(),
        }
    }
}
