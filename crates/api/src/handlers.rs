// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Use-case handlers for accounts, races, favorites and filter facets.
//!
//! Handlers are synchronous and take the current instant as an argument;
//! the caller owns the clock and the store lock.

use time::OffsetDateTime;
use tracing::{debug, info, warn};
use trail_france::{ModerationTransition, RaceQuery, moderate, select_listed};
use trail_france_domain::{
    ModerationAction, ModerationStatus, Race, RaceDraft, RacePatch, RegistrationStatus,
    format_timestamp, normalize_email,
};
use trail_france_persistence::{AccountData, FavoriteData, Persistence, PersistenceError};

use crate::auth::{AuthenticatedActor, AuthenticationService, AuthorizationService, Role};
use crate::error::{ApiError, translate_domain_error, translate_persistence_error};
use crate::notifications::{Notification, NotificationSink, RaceSummary};
use crate::password_policy::PasswordPolicy;
use crate::request_response::{
    AccountResponse, FavoriteEntry, ListRacesRequest, LoginRequest, LoginResponse,
    MessageResponse, ModerateRaceRequest, RaceResponse, RegisterRequest,
};

/// Maximum size of the admin pending queue.
pub const PENDING_QUEUE_LIMIT: i64 = 100;

fn timestamp(now: OffsetDateTime) -> Result<String, ApiError> {
    format_timestamp(now).map_err(translate_domain_error)
}

fn load_race(persistence: &mut Persistence, race_id: &str) -> Result<Race, ApiError> {
    persistence
        .get_race(race_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::race_not_found(race_id))
}

fn respond(race: Race, now: OffsetDateTime) -> RaceResponse {
    let status: RegistrationStatus = race.registration_status(now);
    RaceResponse::new(race, status)
}

// ============================================================================
// Accounts
// ============================================================================

/// Registers a new account with the `user` role.
///
/// # Errors
///
/// Returns an error if:
/// - The email is malformed
/// - The password violates the policy
/// - The email is already registered (`Conflict`)
pub fn register(
    persistence: &mut Persistence,
    request: &RegisterRequest,
    now: OffsetDateTime,
) -> Result<AccountResponse, ApiError> {
    let email: String = normalize_email(&request.email).map_err(translate_domain_error)?;
    let name: &str = request.name.trim();
    if name.is_empty() {
        return Err(ApiError::InvalidInput {
            field: String::from("name"),
            message: String::from("Name must not be empty"),
        });
    }

    PasswordPolicy::default().validate(&request.password, &email)?;

    let account_id: String = persistence
        .create_account(&email, name, &request.password, Role::User.as_str(), &timestamp(now)?)
        .map_err(|e| match e {
            PersistenceError::UniqueViolation(_) => ApiError::Conflict {
                resource_type: String::from("Account"),
                message: String::from("Email already registered"),
            },
            other => translate_persistence_error(other),
        })?;

    info!(account_id = %account_id, "Account registered");

    let account: AccountData = persistence
        .get_account_by_id(&account_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::Internal {
            message: String::from("Account not found after creation"),
        })?;

    Ok(AccountResponse::from(account))
}

/// Logs in and issues a session token.
///
/// # Errors
///
/// Returns `AuthenticationFailed` with "Invalid credentials" when the
/// email is unknown or the password is wrong.
pub fn login(
    persistence: &mut Persistence,
    request: &LoginRequest,
    now: OffsetDateTime,
) -> Result<LoginResponse, ApiError> {
    let (session_token, expires_at, _actor, account) =
        AuthenticationService::login(persistence, &request.email, &request.password, now)?;

    Ok(LoginResponse {
        session_token,
        expires_at,
        account: AccountResponse::from(account),
    })
}

/// Logs out by deleting the session.
///
/// # Errors
///
/// Returns an error if the logout fails.
pub fn logout(persistence: &mut Persistence, session_token: &str) -> Result<(), ApiError> {
    AuthenticationService::logout(persistence, session_token)?;
    Ok(())
}

/// Returns the current account.
#[must_use]
pub fn whoami(account: &AccountData) -> AccountResponse {
    AccountResponse::from(account.clone())
}

/// Creates the first admin account if none exists yet.
///
/// # Returns
///
/// The new account id, or `None` if an admin already exists.
///
/// # Errors
///
/// Returns an error if the email or password is invalid, or the email
/// belongs to an existing account.
pub fn bootstrap_admin(
    persistence: &mut Persistence,
    email: &str,
    password: &str,
    name: &str,
    now: OffsetDateTime,
) -> Result<Option<String>, ApiError> {
    let admins: i64 = persistence
        .count_accounts_with_role(Role::Admin.as_str())
        .map_err(translate_persistence_error)?;
    if admins > 0 {
        debug!("Admin account already present, skipping bootstrap");
        return Ok(None);
    }

    let email: String = normalize_email(email).map_err(translate_domain_error)?;
    PasswordPolicy::default().validate(password, &email)?;

    let account_id: String = persistence
        .create_account(&email, name, password, Role::Admin.as_str(), &timestamp(now)?)
        .map_err(translate_persistence_error)?;

    info!(account_id = %account_id, "Bootstrap admin account created");
    Ok(Some(account_id))
}

/// Sets the account-wide email notification preference.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn update_settings(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    email_notifications: bool,
) -> Result<MessageResponse, ApiError> {
    persistence
        .set_email_notifications(&actor.id, email_notifications)
        .map_err(translate_persistence_error)?;
    Ok(MessageResponse::new("Settings updated"))
}

// ============================================================================
// Races
// ============================================================================

/// Converts raw listing filters into a `RaceQuery`.
///
/// # Errors
///
/// Returns `InvalidInput` for an unknown registration status.
pub fn parse_race_query(request: &ListRacesRequest) -> Result<RaceQuery, ApiError> {
    let registration_status: Option<RegistrationStatus> = request
        .registration_status
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(RegistrationStatus::parse_str)
        .transpose()
        .map_err(translate_domain_error)?;

    Ok(RaceQuery {
        region: request.region.clone(),
        department: request.department.clone(),
        min_distance: request.min_distance,
        max_distance: request.max_distance,
        is_utmb: request.is_utmb,
        registration_status,
        search: request.search.clone(),
    })
}

/// Lists approved races matching the filters, by race date.
///
/// The registration status is computed for `now`; the status filter runs
/// after that computation.
///
/// # Errors
///
/// Returns an error if a filter is invalid or the query fails.
pub fn list_races(
    persistence: &mut Persistence,
    request: &ListRacesRequest,
    now: OffsetDateTime,
) -> Result<Vec<RaceResponse>, ApiError> {
    let query: RaceQuery = parse_race_query(request)?;

    let races: Vec<Race> = persistence
        .list_races_by_status(ModerationStatus::Approved)
        .map_err(translate_persistence_error)?;

    let listed = select_listed(races, &query, now);
    debug!("Listing {} races", listed.len());

    Ok(listed
        .into_iter()
        .map(|(race, status)| RaceResponse::new(race, status))
        .collect())
}

/// Returns one race.
///
/// # Errors
///
/// Returns `ResourceNotFound` if the race does not exist or `viewer` may
/// not see it.
pub fn get_race(
    persistence: &mut Persistence,
    race_id: &str,
    viewer: Option<&AuthenticatedActor>,
    now: OffsetDateTime,
) -> Result<RaceResponse, ApiError> {
    let race: Race = load_race(persistence, race_id)?;

    if !AuthorizationService::can_view_race(viewer, &race) {
        return Err(ApiError::race_not_found(race_id));
    }

    Ok(respond(race, now))
}

/// Creates a race. Admin submissions are approved at once; other
/// submissions wait in the moderation queue.
///
/// # Errors
///
/// Returns an error if the content is invalid or the insert fails.
pub fn create_race(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    draft: &RaceDraft,
    now: OffsetDateTime,
) -> Result<RaceResponse, ApiError> {
    draft.validate().map_err(translate_domain_error)?;

    let status: ModerationStatus = ModerationStatus::initial(actor.is_admin());
    let race_id: String = persistence
        .insert_race(draft, status, Some(&actor.id), &timestamp(now)?)
        .map_err(translate_persistence_error)?;

    info!(race_id = %race_id, submitted_by = %actor.id, status = %status, "Race submitted");

    Ok(respond(load_race(persistence, &race_id)?, now))
}

/// Applies a partial update to a race's content.
///
/// # Errors
///
/// Returns an error if:
/// - The race does not exist
/// - The actor is neither admin nor the submitter
/// - The patched content is invalid
pub fn update_race(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    race_id: &str,
    patch: RacePatch,
    now: OffsetDateTime,
) -> Result<RaceResponse, ApiError> {
    let race: Race = load_race(persistence, race_id)?;
    AuthorizationService::authorize_edit_race(actor, &race)?;

    if patch.is_empty() {
        return Ok(respond(race, now));
    }

    let mut content: RaceDraft = race.content;
    patch.apply_to(&mut content);
    content.validate().map_err(translate_domain_error)?;

    persistence
        .update_race_content(race_id, &content)
        .map_err(translate_persistence_error)?;

    info!(race_id, editor = %actor.id, "Race updated");

    Ok(respond(load_race(persistence, race_id)?, now))
}

/// Deletes a race.
///
/// # Errors
///
/// Returns an error if the actor is not an admin or the race does not exist.
pub fn delete_race(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    race_id: &str,
) -> Result<MessageResponse, ApiError> {
    AuthorizationService::authorize_admin(actor, "delete_race")?;

    persistence.delete_race(race_id).map_err(|e| match e {
        PersistenceError::NotFound(_) => ApiError::race_not_found(race_id),
        other => translate_persistence_error(other),
    })?;

    Ok(MessageResponse::new("Race deleted"))
}

/// Lists the moderation queue, oldest submission first.
///
/// # Errors
///
/// Returns an error if the actor is not an admin or the query fails.
pub fn list_pending_races(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    now: OffsetDateTime,
) -> Result<Vec<RaceResponse>, ApiError> {
    AuthorizationService::authorize_admin(actor, "list_pending_races")?;

    let races: Vec<Race> = persistence
        .list_pending_races(PENDING_QUEUE_LIMIT)
        .map_err(translate_persistence_error)?;

    Ok(races.into_iter().map(|race| respond(race, now)).collect())
}

/// Approves or rejects a race.
///
/// An approval notifies the accounts that favorited the race and opted in.
/// Notification scheduling never fails the call.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an admin
/// - The action is neither `approve` nor `reject`
/// - The race does not exist
pub fn moderate_race(
    persistence: &mut Persistence,
    notifier: &dyn NotificationSink,
    actor: &AuthenticatedActor,
    race_id: &str,
    request: &ModerateRaceRequest,
) -> Result<MessageResponse, ApiError> {
    AuthorizationService::authorize_admin(actor, "moderate_race")?;

    let action: ModerationAction =
        ModerationAction::parse_str(request.action.trim()).map_err(translate_domain_error)?;
    let race: Race = load_race(persistence, race_id)?;

    let transition: ModerationTransition = moderate(race.moderation_status, action);
    persistence
        .set_moderation_status(race_id, transition.to)
        .map_err(translate_persistence_error)?;

    info!(
        race_id,
        admin = %actor.id,
        from = %transition.from,
        to = %transition.to,
        reason = request.reason.as_deref().unwrap_or(""),
        "Race moderated"
    );

    if transition.notify_subscribers {
        let recipients = persistence.list_notification_recipients(race_id);
        notify_approval(notifier, &race, recipients);
    }

    Ok(MessageResponse::new(format!(
        "Race {} successfully",
        action.past_tense()
    )))
}

/// Schedules the approval notification for `race`.
///
/// A failed recipient lookup skips the notification and leaves the
/// moderation in place.
pub(crate) fn notify_approval(
    notifier: &dyn NotificationSink,
    race: &Race,
    recipients: Result<Vec<String>, PersistenceError>,
) {
    let recipients: Vec<String> = match recipients {
        Ok(recipients) => recipients,
        Err(e) => {
            warn!(
                race_id = %race.id,
                error = %e,
                "Could not load approval recipients, skipping notification"
            );
            return;
        }
    };
    if recipients.is_empty() {
        debug!(race_id = %race.id, "No subscribers to notify of approval");
        return;
    }
    notifier.submit(Notification::RaceApproved {
        race: RaceSummary::from(race),
        recipients,
    });
}

// ============================================================================
// Favorites
// ============================================================================

/// Adds a race to the actor's favorites.
///
/// # Errors
///
/// Returns `ResourceNotFound` for an unknown race and `Conflict` when the
/// race is already a favorite.
pub fn add_favorite(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    race_id: &str,
    notify_on_registration: bool,
    now: OffsetDateTime,
) -> Result<MessageResponse, ApiError> {
    load_race(persistence, race_id)?;

    persistence
        .insert_favorite(&actor.id, race_id, notify_on_registration, &timestamp(now)?)
        .map_err(|e| match e {
            PersistenceError::UniqueViolation(_) => ApiError::Conflict {
                resource_type: String::from("Favorite"),
                message: String::from("Already in favorites"),
            },
            other => translate_persistence_error(other),
        })?;

    Ok(MessageResponse::new("Added to favorites"))
}

fn favorite_not_found(race_id: &str) -> ApiError {
    ApiError::ResourceNotFound {
        resource_type: String::from("Favorite"),
        message: format!("Race '{race_id}' is not in favorites"),
    }
}

/// Removes a race from the actor's favorites.
///
/// # Errors
///
/// Returns `ResourceNotFound` when the race is not a favorite.
pub fn remove_favorite(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    race_id: &str,
) -> Result<MessageResponse, ApiError> {
    let removed: bool = persistence
        .delete_favorite(&actor.id, race_id)
        .map_err(translate_persistence_error)?;
    if !removed {
        return Err(favorite_not_found(race_id));
    }
    Ok(MessageResponse::new("Removed from favorites"))
}

/// Sets whether the actor is notified about a favorite race.
///
/// # Errors
///
/// Returns `ResourceNotFound` when the race is not a favorite.
pub fn set_favorite_notify(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    race_id: &str,
    notify: bool,
) -> Result<MessageResponse, ApiError> {
    let updated: bool = persistence
        .set_favorite_notify(&actor.id, race_id, notify)
        .map_err(translate_persistence_error)?;
    if !updated {
        return Err(favorite_not_found(race_id));
    }
    Ok(MessageResponse::new("Notification preference updated"))
}

/// Lists the actor's favorites with their races.
///
/// # Errors
///
/// Returns an error if a query fails.
pub fn list_favorites(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    now: OffsetDateTime,
) -> Result<Vec<FavoriteEntry>, ApiError> {
    let favorites: Vec<FavoriteData> = persistence
        .list_favorites(&actor.id)
        .map_err(translate_persistence_error)?;

    let race_ids: Vec<String> = favorites.iter().map(|f| f.race_id.clone()).collect();
    let mut races: Vec<Race> = persistence
        .get_races_by_ids(&race_ids)
        .map_err(translate_persistence_error)?;

    Ok(favorites
        .into_iter()
        .filter_map(|favorite| {
            let position: usize = races.iter().position(|r| r.id == favorite.race_id)?;
            let race: Race = races.swap_remove(position);
            Some(FavoriteEntry {
                favorite,
                race: respond(race, now),
            })
        })
        .collect())
}

// ============================================================================
// Filter facets
// ============================================================================

/// Lists the regions of approved races.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_regions(persistence: &mut Persistence) -> Result<Vec<String>, ApiError> {
    persistence.list_regions().map_err(translate_persistence_error)
}

/// Lists the departments of approved races, optionally within one region.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_departments(
    persistence: &mut Persistence,
    region: Option<&str>,
) -> Result<Vec<String>, ApiError> {
    let region: Option<&str> = region.map(str::trim).filter(|r| !r.is_empty());
    persistence
        .list_departments(region)
        .map_err(translate_persistence_error)
}
