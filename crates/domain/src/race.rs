// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Race records.
//!
//! A [`Race`] combines submitted content ([`RaceDraft`]), the moderation
//! state, and the closure fields written when crowd reports or an admin
//! force registration closed. The registration status itself is not a
//! field; see [`Race::registration_status`].

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::DomainError;
use crate::moderation::ModerationStatus;
use crate::registration::{RegistrationStatus, registration_status};

/// Submitted content of a race.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceDraft {
    /// Display name.
    pub name: String,
    /// Long description.
    pub description: String,
    /// Town or venue.
    pub location: String,
    /// Administrative region.
    pub region: String,
    /// Department within the region.
    pub department: String,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Course length in kilometres.
    pub distance_km: f64,
    /// Positive elevation in metres.
    pub elevation_gain: i32,
    /// Race day.
    pub race_date: String,
    /// Registration opening date or timestamp.
    pub registration_open_date: String,
    /// Registration closing date or timestamp.
    pub registration_close_date: Option<String>,
    /// Flagship (UTMB index) race.
    pub is_utmb: bool,
    /// Organizer website.
    pub website_url: Option<String>,
    /// Cover image.
    pub image_url: Option<String>,
}

impl RaceDraft {
    /// Validates content rules.
    ///
    /// Registration dates are not validated here: an unreadable date is
    /// accepted and classifies as `not_open`.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule.
    pub fn validate(&self) -> Result<(), DomainError> {
        require_text("name", &self.name)?;
        require_text("location", &self.location)?;
        require_text("race_date", &self.race_date)?;
        require_text("registration_open_date", &self.registration_open_date)?;

        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(invalid("latitude", "must be between -90 and 90"));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(invalid("longitude", "must be between -180 and 180"));
        }
        if !self.distance_km.is_finite() || self.distance_km < 0.0 {
            return Err(invalid("distance_km", "must be a non-negative number"));
        }
        if self.elevation_gain < 0 {
            return Err(invalid("elevation_gain", "must not be negative"));
        }
        Ok(())
    }
}

fn require_text(field: &str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(invalid(field, "must not be empty"));
    }
    Ok(())
}

fn invalid(field: &str, reason: &str) -> DomainError {
    DomainError::InvalidRaceField {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

/// A partial update of race content. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RacePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub region: Option<String>,
    pub department: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub distance_km: Option<f64>,
    pub elevation_gain: Option<i32>,
    pub race_date: Option<String>,
    pub registration_open_date: Option<String>,
    pub registration_close_date: Option<String>,
    pub is_utmb: Option<bool>,
    pub website_url: Option<String>,
    pub image_url: Option<String>,
}

impl RacePatch {
    /// Returns true if the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Applies the provided fields to `draft`.
    pub fn apply_to(self, draft: &mut RaceDraft) {
        if let Some(v) = self.name {
            draft.name = v;
        }
        if let Some(v) = self.description {
            draft.description = v;
        }
        if let Some(v) = self.location {
            draft.location = v;
        }
        if let Some(v) = self.region {
            draft.region = v;
        }
        if let Some(v) = self.department {
            draft.department = v;
        }
        if let Some(v) = self.latitude {
            draft.latitude = v;
        }
        if let Some(v) = self.longitude {
            draft.longitude = v;
        }
        if let Some(v) = self.distance_km {
            draft.distance_km = v;
        }
        if let Some(v) = self.elevation_gain {
            draft.elevation_gain = v;
        }
        if let Some(v) = self.race_date {
            draft.race_date = v;
        }
        if let Some(v) = self.registration_open_date {
            draft.registration_open_date = v;
        }
        if let Some(v) = self.registration_close_date {
            draft.registration_close_date = Some(v);
        }
        if let Some(v) = self.is_utmb {
            draft.is_utmb = v;
        }
        if let Some(v) = self.website_url {
            draft.website_url = Some(v);
        }
        if let Some(v) = self.image_url {
            draft.image_url = Some(v);
        }
    }
}

/// A stored race.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Race {
    /// Opaque identifier, immutable once assigned.
    pub id: String,
    /// Submitted content.
    #[serde(flatten)]
    pub content: RaceDraft,
    /// Visibility state.
    pub moderation_status: ModerationStatus,
    /// Submitting account.
    pub submitted_by: Option<String>,
    /// Creation instant (storage form).
    pub created_at: String,
    /// Registration was closed by reaching the report quorum.
    pub auto_closed_by_reports: bool,
    /// When the quorum closed registration.
    pub auto_closed_at: Option<String>,
    /// Registration was closed by an admin validating reports.
    pub manually_closed: bool,
    /// When the admin closed registration.
    pub closed_at: Option<String>,
    /// Admin account that closed registration.
    pub closed_by: Option<String>,
}

impl Race {
    /// Classifies the registration period at `now`.
    #[must_use]
    pub fn registration_status(&self, now: OffsetDateTime) -> RegistrationStatus {
        registration_status(
            now,
            &self.content.registration_open_date,
            self.content.registration_close_date.as_deref(),
        )
    }

    /// Returns true if `account_id` submitted this race.
    #[must_use]
    pub fn is_submitted_by(&self, account_id: &str) -> bool {
        self.submitted_by.as_deref() == Some(account_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::sample_draft;

    #[test]
    fn test_sample_draft_is_valid() {
        assert!(sample_draft().validate().is_ok());
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let mut draft: RaceDraft = sample_draft();
        draft.name = String::from("  ");
        assert_eq!(
            draft.validate(),
            Err(DomainError::InvalidRaceField {
                field: String::from("name"),
                reason: String::from("must not be empty"),
            })
        );
    }

    #[test]
    fn test_coordinates_must_be_in_range() {
        let mut draft: RaceDraft = sample_draft();
        draft.latitude = 91.0;
        assert!(draft.validate().is_err());

        let mut draft: RaceDraft = sample_draft();
        draft.longitude = -180.5;
        assert!(draft.validate().is_err());
    }

    #[test]
    fn test_negative_distance_and_elevation_are_rejected() {
        let mut draft: RaceDraft = sample_draft();
        draft.distance_km = -1.0;
        assert!(draft.validate().is_err());

        let mut draft: RaceDraft = sample_draft();
        draft.distance_km = f64::NAN;
        assert!(draft.validate().is_err());

        let mut draft: RaceDraft = sample_draft();
        draft.elevation_gain = -10;
        assert!(draft.validate().is_err());
    }

    #[test]
    fn test_unreadable_registration_date_is_accepted() {
        let mut draft: RaceDraft = sample_draft();
        draft.registration_open_date = String::from("spring");
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn test_patch_only_touches_provided_fields() {
        let mut draft: RaceDraft = sample_draft();
        let patch: RacePatch = RacePatch {
            name: Some(String::from("Trail des Crêtes")),
            distance_km: Some(42.0),
            registration_close_date: Some(String::from("2026-05-01")),
            ..RacePatch::default()
        };
        assert!(!patch.is_empty());

        patch.apply_to(&mut draft);

        assert_eq!(draft.name, "Trail des Crêtes");
        assert!((draft.distance_km - 42.0).abs() < f64::EPSILON);
        assert_eq!(draft.registration_close_date.as_deref(), Some("2026-05-01"));
        assert_eq!(draft.location, sample_draft().location);
    }

    #[test]
    fn test_default_patch_is_empty() {
        assert!(RacePatch::default().is_empty());
    }
}
