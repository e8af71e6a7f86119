// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use trail_france_domain::{ModerationAction, ModerationStatus};

/// The effect of a moderation decision on one race.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModerationTransition {
    /// Status before the decision.
    pub from: ModerationStatus,
    /// Status after the decision.
    pub to: ModerationStatus,
    /// Whether subscribers must be told the race is published.
    pub notify_subscribers: bool,
}

/// Applies a moderation action.
///
/// Every state accepts both actions: re-moderating an approved or rejected
/// race overwrites the earlier decision. Each approval schedules a
/// subscriber notification, including a repeated one.
#[must_use]
pub const fn moderate(current: ModerationStatus, action: ModerationAction) -> ModerationTransition {
    ModerationTransition {
        from: current,
        to: action.target_status(),
        notify_subscribers: matches!(action, ModerationAction::Approve),
    }
}
