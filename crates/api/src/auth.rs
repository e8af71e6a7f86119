// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication and authorization types and services.

use time::{Duration, OffsetDateTime};
use trail_france_domain::{Race, format_timestamp, normalize_email, parse_timestamp};
use trail_france_persistence::{AccountData, Persistence, PersistenceError, SessionData};

use crate::error::AuthError;

/// Account roles for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Moderates races and reports, and may edit or delete any race.
    Admin,
    /// A registered runner: submits races, keeps favorites.
    User,
}

impl Role {
    /// Returns the stored string form of this role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }

    /// Parses a stored role.
    ///
    /// # Errors
    ///
    /// Returns an error if the role is not recognized.
    pub fn parse_str(s: &str) -> Result<Self, AuthError> {
        match s {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            _ => Err(AuthError::AuthenticationFailed {
                reason: format!("Invalid role: {s}"),
            }),
        }
    }
}

/// An authenticated account with an associated role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The account id.
    pub id: String,
    /// The role assigned to this account.
    pub role: Role,
}

impl AuthenticatedActor {
    /// Creates a new authenticated actor.
    ///
    /// # Arguments
    ///
    /// * `id` - The account id
    /// * `role` - The role assigned to this account
    #[must_use]
    pub const fn new(id: String, role: Role) -> Self {
        Self { id, role }
    }

    /// Whether this actor holds the admin role.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }
}

/// Authorization service for enforcing role-based access control.
///
/// Every check runs before any side effect of the guarded operation.
pub struct AuthorizationService;

impl AuthorizationService {
    /// Checks that an actor holds the admin role.
    ///
    /// # Arguments
    ///
    /// * `actor` - The authenticated actor
    /// * `action` - The action name reported on refusal
    ///
    /// # Errors
    ///
    /// Returns an error if the actor does not have the Admin role.
    pub fn authorize_admin(actor: &AuthenticatedActor, action: &str) -> Result<(), AuthError> {
        match actor.role {
            Role::Admin => Ok(()),
            Role::User => Err(AuthError::Unauthorized {
                action: action.to_string(),
                required_role: String::from("admin"),
            }),
        }
    }

    /// Checks that an actor may edit a race's content.
    ///
    /// Admins may edit any race; other accounts only races they submitted.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is neither admin nor the submitter.
    pub fn authorize_edit_race(actor: &AuthenticatedActor, race: &Race) -> Result<(), AuthError> {
        if actor.is_admin() || race.is_submitted_by(&actor.id) {
            return Ok(());
        }
        Err(AuthError::Unauthorized {
            action: String::from("update_race"),
            required_role: String::from("admin or submitter"),
        })
    }

    /// Whether a viewer may see a race through the detail endpoint.
    ///
    /// Approved races are public. Pending and rejected races are admin
    /// tooling only, their submitter included.
    #[must_use]
    pub fn can_view_race(viewer: Option<&AuthenticatedActor>, race: &Race) -> bool {
        race.moderation_status.is_publicly_visible()
            || viewer.is_some_and(AuthenticatedActor::is_admin)
    }
}

/// Authentication service for session-based authentication.
pub struct AuthenticationService;

impl AuthenticationService {
    /// Session lifetime.
    pub const SESSION_DURATION: Duration = Duration::hours(24);

    /// Authenticates an account and creates a session.
    ///
    /// Unknown emails and wrong passwords produce the same error.
    ///
    /// # Arguments
    ///
    /// * `persistence` - The persistence layer
    /// * `email` - The account email, normalized before lookup
    /// * `password` - The plain-text password
    /// * `now` - The current instant
    ///
    /// # Returns
    ///
    /// A tuple of (`session_token`, `expires_at`, `authenticated_actor`, `account`)
    ///
    /// # Errors
    ///
    /// Returns an error if authentication fails.
    pub fn login(
        persistence: &mut Persistence,
        email: &str,
        password: &str,
        now: OffsetDateTime,
    ) -> Result<(String, String, AuthenticatedActor, AccountData), AuthError> {
        let invalid = || AuthError::AuthenticationFailed {
            reason: String::from("Invalid credentials"),
        };

        let normalized: String = normalize_email(email).map_err(|_| invalid())?;

        let account: AccountData = persistence
            .get_account_by_email(&normalized)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(invalid)?;

        let verified: bool = persistence
            .verify_password(password, &account.password_hash)
            .map_err(Self::map_persistence_error)?;
        if !verified {
            return Err(invalid());
        }

        let role: Role = Role::parse_str(&account.role)?;

        let session_token: String = Self::generate_session_token();
        let created_at: String = Self::format(now)?;
        let expires_at: String = Self::format(now + Self::SESSION_DURATION)?;

        persistence
            .delete_expired_sessions(&created_at)
            .map_err(Self::map_persistence_error)?;

        persistence
            .create_session(&session_token, &account.account_id, &created_at, &expires_at)
            .map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Failed to create session: {e}"),
            })?;

        let actor: AuthenticatedActor = AuthenticatedActor::new(account.account_id.clone(), role);

        Ok((session_token, expires_at, actor, account))
    }

    /// Validates a session token and returns the authenticated actor.
    ///
    /// # Arguments
    ///
    /// * `persistence` - The persistence layer
    /// * `session_token` - The session token to validate
    /// * `now` - The current instant
    ///
    /// # Returns
    ///
    /// A tuple of (`authenticated_actor`, `account`)
    ///
    /// # Errors
    ///
    /// Returns an error if the session is invalid or expired.
    pub fn validate_session(
        persistence: &mut Persistence,
        session_token: &str,
        now: OffsetDateTime,
    ) -> Result<(AuthenticatedActor, AccountData), AuthError> {
        let session: SessionData = persistence
            .get_session_by_token(session_token)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("Invalid session token"),
            })?;

        let expires_at: OffsetDateTime =
            parse_timestamp(&session.expires_at).map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Failed to parse session expiration: {e}"),
            })?;

        if now > expires_at {
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Session expired"),
            });
        }

        let account: AccountData = persistence
            .get_account_by_id(&session.account_id)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("Account not found"),
            })?;

        let role: Role = Role::parse_str(&account.role)?;

        persistence
            .touch_session(session.session_id, &Self::format(now)?)
            .map_err(Self::map_persistence_error)?;

        Ok((AuthenticatedActor::new(account.account_id.clone(), role), account))
    }

    /// Logs out by deleting the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the logout fails.
    pub fn logout(persistence: &mut Persistence, session_token: &str) -> Result<(), AuthError> {
        persistence
            .delete_session(session_token)
            .map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Failed to delete session: {e}"),
            })
    }

    /// Generates an opaque 256-bit session token.
    fn generate_session_token() -> String {
        format!(
            "{:032x}{:032x}",
            rand::random::<u128>(),
            rand::random::<u128>()
        )
    }

    fn format(at: OffsetDateTime) -> Result<String, AuthError> {
        format_timestamp(at).map_err(|e| AuthError::AuthenticationFailed {
            reason: e.to_string(),
        })
    }

    /// Maps persistence errors to authentication errors.
    fn map_persistence_error(err: PersistenceError) -> AuthError {
        AuthError::AuthenticationFailed {
            reason: format!("Database error: {err}"),
        }
    }
}
