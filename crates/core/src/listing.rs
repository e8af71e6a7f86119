// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Public race listing.
//!
//! Listing works in three steps:
//!
//! 1. Only approved races are candidates, in race-date order.
//! 2. Content filters (region, department, distance, flagship flag,
//!    free-text search) select candidates, capped at [`LISTING_LIMIT`].
//! 3. The registration status is computed for each remaining race at
//!    `now`, and the optional status filter is applied last, because the
//!    status is never stored.

use time::OffsetDateTime;
use trail_france_domain::{Race, RegistrationStatus};

/// Maximum number of races considered for one listing.
pub const LISTING_LIMIT: usize = 500;

/// Filters accepted by the public listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RaceQuery {
    /// Case-insensitive substring of the region.
    pub region: Option<String>,
    /// Case-insensitive substring of the department.
    pub department: Option<String>,
    /// Inclusive lower bound on distance.
    pub min_distance: Option<f64>,
    /// Inclusive upper bound on distance.
    pub max_distance: Option<f64>,
    /// Flagship flag.
    pub is_utmb: Option<bool>,
    /// Derived status filter.
    pub registration_status: Option<RegistrationStatus>,
    /// Case-insensitive substring of the name or the location.
    pub search: Option<String>,
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.trim().is_empty())
}

impl RaceQuery {
    /// Applies the content filters (everything except the status).
    #[must_use]
    pub fn matches_content(&self, race: &Race) -> bool {
        let content = &race.content;

        if let Some(region) = non_blank(self.region.as_ref())
            && !contains_ignore_case(&content.region, region)
        {
            return false;
        }
        if let Some(department) = non_blank(self.department.as_ref())
            && !contains_ignore_case(&content.department, department)
        {
            return false;
        }
        if let Some(min) = self.min_distance
            && content.distance_km < min
        {
            return false;
        }
        if let Some(max) = self.max_distance
            && content.distance_km > max
        {
            return false;
        }
        if let Some(is_utmb) = self.is_utmb
            && content.is_utmb != is_utmb
        {
            return false;
        }
        if let Some(search) = non_blank(self.search.as_ref())
            && !contains_ignore_case(&content.name, search)
            && !contains_ignore_case(&content.location, search)
        {
            return false;
        }
        true
    }
}

/// Selects the races to list, paired with their status at `now`.
///
/// `races` may contain non-approved races; they are dropped.
#[must_use]
pub fn select_listed(
    races: Vec<Race>,
    query: &RaceQuery,
    now: OffsetDateTime,
) -> Vec<(Race, RegistrationStatus)> {
    races
        .into_iter()
        .filter(|race| race.moderation_status.is_publicly_visible())
        .filter(|race| query.matches_content(race))
        .take(LISTING_LIMIT)
        .map(|race| {
            let status: RegistrationStatus = race.registration_status(now);
            (race, status)
        })
        .filter(|(_, status)| {
            query
                .registration_status
                .is_none_or(|wanted| wanted == *status)
        })
        .collect()
}
