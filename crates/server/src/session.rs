// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Session extraction for the server.
//!
//! Tokens travel as `Authorization: Bearer <token>`. [`SessionAccount`]
//! requires a valid session; [`OptionalSession`] resolves one when present
//! and otherwise lets the request through anonymously.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use time::OffsetDateTime;
use tracing::{debug, warn};
use trail_france_api::{AuthenticatedActor, AuthenticationService};
use trail_france_persistence::AccountData;

use crate::{AppState, ErrorResponse};

/// Extractor for authenticated accounts.
///
/// # Usage
///
/// ```ignore
/// async fn my_handler(
///     SessionAccount { actor, account, .. }: SessionAccount,
/// ) -> Result<Json<Response>, HttpError> {
///     // actor: AuthenticatedActor
///     // account: AccountData
/// }
/// ```
///
/// # Errors
///
/// Rejects with 401 if the header is missing or malformed, or the token is
/// unknown or expired.
pub struct SessionAccount {
    pub actor: AuthenticatedActor,
    pub account: AccountData,
    /// The raw bearer token, needed for logout.
    pub token: String,
}

impl FromRequestParts<AppState> for SessionAccount {
    type Rejection = SessionError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token: String = bearer_token(parts)?.ok_or_else(|| {
            debug!("Missing Authorization header");
            SessionError::MissingAuthorizationHeader
        })?;

        let mut persistence = state.persistence.lock().await;
        let (actor, account) =
            AuthenticationService::validate_session(&mut persistence, &token, OffsetDateTime::now_utc())
                .map_err(|e| {
                    warn!(error = %e, "Session validation failed");
                    SessionError::InvalidSession(e.to_string())
                })?;
        drop(persistence);

        debug!(account_id = %actor.id, role = ?actor.role, "Session validated");

        Ok(Self {
            actor,
            account,
            token,
        })
    }
}

/// Extractor for routes that anyone may call but that show more to
/// signed-in accounts.
///
/// A missing header yields `None`. A header that is present but invalid is
/// still rejected.
pub struct OptionalSession(pub Option<AuthenticatedActor>);

impl FromRequestParts<AppState> for OptionalSession {
    type Rejection = SessionError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if bearer_token(parts)?.is_none() {
            return Ok(Self(None));
        }
        let session: SessionAccount = SessionAccount::from_request_parts(parts, state).await?;
        Ok(Self(Some(session.actor)))
    }
}

fn bearer_token(parts: &Parts) -> Result<Option<String>, SessionError> {
    let Some(header) = parts.headers.get(AUTHORIZATION) else {
        return Ok(None);
    };

    let value: &str = header.to_str().map_err(|_| {
        warn!("Invalid Authorization header encoding");
        SessionError::InvalidAuthorizationHeader
    })?;

    let token: &str = value.strip_prefix("Bearer ").ok_or_else(|| {
        warn!("Authorization header does not start with 'Bearer '");
        SessionError::InvalidAuthorizationHeader
    })?;

    Ok(Some(token.trim().to_string()))
}

/// Session extraction errors.
#[derive(Debug)]
pub enum SessionError {
    /// Authorization header is missing.
    MissingAuthorizationHeader,
    /// Authorization header format is invalid.
    InvalidAuthorizationHeader,
    /// Session validation failed.
    InvalidSession(String),
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let message: String = match self {
            Self::MissingAuthorizationHeader => String::from("Not authenticated"),
            Self::InvalidAuthorizationHeader => {
                String::from("Invalid Authorization header format. Expected: 'Bearer <token>'")
            }
            Self::InvalidSession(reason) => format!("Session validation failed: {reason}"),
        };

        (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: true,
                message,
            }),
        )
            .into_response()
    }
}
