// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Notification jobs handed to the dispatcher.
//!
//! Handlers decide whether to notify and with what content. Delivery is
//! somebody else's problem: `NotificationSink::submit` must return
//! immediately and never report failure to the caller.

use serde::Serialize;
use trail_france_domain::Race;

/// The race details a notification needs to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RaceSummary {
    pub id: String,
    pub name: String,
    pub location: String,
    pub race_date: String,
}

impl From<&Race> for RaceSummary {
    fn from(race: &Race) -> Self {
        Self {
            id: race.id.clone(),
            name: race.content.name.clone(),
            location: race.content.location.clone(),
            race_date: race.content.race_date.clone(),
        }
    }
}

/// A notification job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    /// A visitor reported a race's registration as closed, below quorum.
    ReportReceived {
        /// Admin address.
        to: String,
        race: RaceSummary,
        reason: String,
        report_count: u32,
        threshold: u32,
    },
    /// The report quorum closed a race's registration.
    RaceAutoClosed {
        /// Admin address.
        to: String,
        race: RaceSummary,
        report_count: u32,
    },
    /// An admin approved a race that some accounts follow.
    RaceApproved {
        race: RaceSummary,
        recipients: Vec<String>,
    },
}

impl Notification {
    /// The race this notification is about.
    #[must_use]
    pub const fn race(&self) -> &RaceSummary {
        match self {
            Self::ReportReceived { race, .. }
            | Self::RaceAutoClosed { race, .. }
            | Self::RaceApproved { race, .. } => race,
        }
    }
}

/// Accepts notification jobs without blocking.
pub trait NotificationSink: Send + Sync {
    /// Schedules a notification. Must not block on delivery.
    fn submit(&self, notification: Notification);
}
