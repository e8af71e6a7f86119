// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

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
#![allow(clippy::multiple_crate_versions)]

mod dispatcher;
mod session;

use axum::{
    Json, Router,
    extract::{Path, Query, State as AxumState},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::{Duration, OffsetDateTime};
use tokio::sync::Mutex;
use tracing::{error, info};
use trail_france::ReportingPolicy;
use trail_france_api::{
    AccountResponse, ApiError, EngineConfig, FavoriteEntry, ListRacesRequest, LoginRequest,
    LoginResponse, MessageResponse, ModerateRaceRequest, NotificationSink, RaceResponse,
    RegisterRequest, ReportGroup, ReviewReportsResponse, SubmitReportRequest,
    SubmitReportResponse,
};
use trail_france_domain::{RaceDraft, RacePatch};
use trail_france_persistence::Persistence;

use crate::dispatcher::{DispatcherConfig, LogTransport, NotificationDispatcher};
use crate::session::{OptionalSession, SessionAccount};

/// Trail France server - HTTP API for the trail race directory
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long, env = "TRAIL_DATABASE")]
    database: Option<String>,

    /// Address to bind the server to
    #[arg(long, env = "TRAIL_BIND", default_value = "127.0.0.1")]
    bind: String,

    /// Port to bind the server to
    #[arg(short, long, env = "TRAIL_PORT", default_value_t = 3000)]
    port: u16,

    /// Pending reports inside the lookback window that close registration
    #[arg(
        long,
        env = "TRAIL_REPORT_THRESHOLD",
        default_value_t = ReportingPolicy::DEFAULT_THRESHOLD,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    report_threshold: u32,

    /// How many days a pending report keeps counting
    #[arg(
        long,
        env = "TRAIL_REPORT_LOOKBACK_DAYS",
        default_value_t = 7,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    report_lookback_days: u32,

    /// Recipient of report and auto-close notifications. Empty disables them.
    #[arg(long, env = "TRAIL_ADMIN_EMAIL", default_value = "")]
    admin_email: String,

    /// Public site URL used for links in notifications
    #[arg(long, env = "TRAIL_PUBLIC_BASE_URL", default_value = "http://localhost:3000")]
    public_base_url: String,

    /// From-address of outbound notifications
    #[arg(long, env = "TRAIL_SENDER_EMAIL", default_value = "noreply@trail-france.local")]
    sender_email: String,

    /// Email of the admin account to create when no admin exists
    #[arg(long, env = "TRAIL_BOOTSTRAP_ADMIN_EMAIL", requires = "bootstrap_admin_password")]
    bootstrap_admin_email: Option<String>,

    /// Password of the bootstrap admin account
    #[arg(long, env = "TRAIL_BOOTSTRAP_ADMIN_PASSWORD", requires = "bootstrap_admin_email")]
    bootstrap_admin_password: Option<String>,

    /// Display name of the bootstrap admin account
    #[arg(long, env = "TRAIL_BOOTSTRAP_ADMIN_NAME", default_value = "Admin")]
    bootstrap_admin_name: String,
}

/// Application state shared across handlers.
///
/// The single store connection sits behind a mutex; handlers lock it for
/// the duration of one use case and release it before responding.
#[derive(Clone)]
struct AppState {
    persistence: Arc<Mutex<Persistence>>,
    config: Arc<EngineConfig>,
    notifier: Arc<dyn NotificationSink>,
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
#[derive(Debug)]
struct HttpError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match &err {
            ApiError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::DomainRuleViolation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InvalidInput { .. } | ApiError::PasswordPolicyViolation { .. } => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Internal { .. } => {
                error!(error = %err, "Internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

/// Service banner.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct BannerResponse {
    message: String,
    version: String,
}

/// Query parameters for adding a favorite.
#[derive(Debug, Deserialize)]
struct AddFavoriteQuery {
    #[serde(default = "default_notify")]
    notify: bool,
}

const fn default_notify() -> bool {
    true
}

/// Query parameters for the favorite notification toggle.
#[derive(Debug, Deserialize)]
struct NotifyQuery {
    notify: bool,
}

/// Query parameters for account settings.
#[derive(Debug, Deserialize)]
struct SettingsQuery {
    email_notifications: bool,
}

/// Query parameters for the department facet.
#[derive(Debug, Deserialize)]
struct DepartmentsQuery {
    region: Option<String>,
}

#[allow(clippy::unused_async)]
async fn handle_root() -> Json<BannerResponse> {
    Json(BannerResponse {
        message: String::from("Trail France API"),
        version: String::from(env!("CARGO_PKG_VERSION")),
    })
}

// ============================================================================
// Accounts
// ============================================================================

async fn handle_register(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<AccountResponse>, HttpError> {
    info!(email = %req.email, "Handling register request");

    let mut persistence = app_state.persistence.lock().await;
    let response: AccountResponse =
        trail_france_api::register(&mut persistence, &req, OffsetDateTime::now_utc())?;
    drop(persistence);

    Ok(Json(response))
}

async fn handle_login(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, HttpError> {
    info!(email = %req.email, "Handling login request");

    let mut persistence = app_state.persistence.lock().await;
    let response: LoginResponse =
        trail_france_api::login(&mut persistence, &req, OffsetDateTime::now_utc())?;
    drop(persistence);

    info!(account_id = %response.account.id, "Login successful");
    Ok(Json(response))
}

async fn handle_logout(
    AxumState(app_state): AxumState<AppState>,
    session: SessionAccount,
) -> Result<Json<MessageResponse>, HttpError> {
    info!(account_id = %session.actor.id, "Handling logout request");

    let mut persistence = app_state.persistence.lock().await;
    trail_france_api::logout(&mut persistence, &session.token)?;
    drop(persistence);

    Ok(Json(MessageResponse::new("Logged out")))
}

#[allow(clippy::unused_async)]
async fn handle_whoami(session: SessionAccount) -> Json<AccountResponse> {
    Json(trail_france_api::whoami(&session.account))
}

async fn handle_update_settings(
    AxumState(app_state): AxumState<AppState>,
    session: SessionAccount,
    Query(query): Query<SettingsQuery>,
) -> Result<Json<MessageResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: MessageResponse = trail_france_api::update_settings(
        &mut persistence,
        &session.actor,
        query.email_notifications,
    )?;
    drop(persistence);

    Ok(Json(response))
}

// ============================================================================
// Races
// ============================================================================

async fn handle_list_races(
    AxumState(app_state): AxumState<AppState>,
    Query(req): Query<ListRacesRequest>,
) -> Result<Json<Vec<RaceResponse>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let races: Vec<RaceResponse> =
        trail_france_api::list_races(&mut persistence, &req, OffsetDateTime::now_utc())?;
    drop(persistence);

    Ok(Json(races))
}

async fn handle_create_race(
    AxumState(app_state): AxumState<AppState>,
    session: SessionAccount,
    Json(draft): Json<RaceDraft>,
) -> Result<Json<RaceResponse>, HttpError> {
    info!(account_id = %session.actor.id, name = %draft.name, "Handling create_race request");

    let mut persistence = app_state.persistence.lock().await;
    let race: RaceResponse = trail_france_api::create_race(
        &mut persistence,
        &session.actor,
        &draft,
        OffsetDateTime::now_utc(),
    )?;
    drop(persistence);

    Ok(Json(race))
}

async fn handle_get_race(
    AxumState(app_state): AxumState<AppState>,
    OptionalSession(viewer): OptionalSession,
    Path(race_id): Path<String>,
) -> Result<Json<RaceResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let race: RaceResponse = trail_france_api::get_race(
        &mut persistence,
        &race_id,
        viewer.as_ref(),
        OffsetDateTime::now_utc(),
    )?;
    drop(persistence);

    Ok(Json(race))
}

async fn handle_update_race(
    AxumState(app_state): AxumState<AppState>,
    session: SessionAccount,
    Path(race_id): Path<String>,
    Json(patch): Json<RacePatch>,
) -> Result<Json<RaceResponse>, HttpError> {
    info!(account_id = %session.actor.id, race_id = %race_id, "Handling update_race request");

    let mut persistence = app_state.persistence.lock().await;
    let race: RaceResponse = trail_france_api::update_race(
        &mut persistence,
        &session.actor,
        &race_id,
        patch,
        OffsetDateTime::now_utc(),
    )?;
    drop(persistence);

    Ok(Json(race))
}

async fn handle_delete_race(
    AxumState(app_state): AxumState<AppState>,
    session: SessionAccount,
    Path(race_id): Path<String>,
) -> Result<Json<MessageResponse>, HttpError> {
    info!(account_id = %session.actor.id, race_id = %race_id, "Handling delete_race request");

    let mut persistence = app_state.persistence.lock().await;
    let response: MessageResponse =
        trail_france_api::delete_race(&mut persistence, &session.actor, &race_id)?;
    drop(persistence);

    Ok(Json(response))
}

async fn handle_submit_report(
    AxumState(app_state): AxumState<AppState>,
    Path(race_id): Path<String>,
    body: Option<Json<SubmitReportRequest>>,
) -> Result<Json<SubmitReportResponse>, HttpError> {
    let req: SubmitReportRequest = body.map(|Json(req)| req).unwrap_or_default();
    info!(race_id = %race_id, "Handling report_closed request");

    let mut persistence = app_state.persistence.lock().await;
    let response: SubmitReportResponse = trail_france_api::submit_report(
        &mut persistence,
        &app_state.config,
        app_state.notifier.as_ref(),
        &race_id,
        &req,
        OffsetDateTime::now_utc(),
    )?;
    drop(persistence);

    Ok(Json(response))
}

// ============================================================================
// Administration
// ============================================================================

async fn handle_list_pending_races(
    AxumState(app_state): AxumState<AppState>,
    session: SessionAccount,
) -> Result<Json<Vec<RaceResponse>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let races: Vec<RaceResponse> = trail_france_api::list_pending_races(
        &mut persistence,
        &session.actor,
        OffsetDateTime::now_utc(),
    )?;
    drop(persistence);

    Ok(Json(races))
}

async fn handle_moderate_race(
    AxumState(app_state): AxumState<AppState>,
    session: SessionAccount,
    Path(race_id): Path<String>,
    Json(req): Json<ModerateRaceRequest>,
) -> Result<Json<MessageResponse>, HttpError> {
    info!(
        account_id = %session.actor.id,
        race_id = %race_id,
        action = %req.action,
        "Handling moderate_race request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response: MessageResponse = trail_france_api::moderate_race(
        &mut persistence,
        app_state.notifier.as_ref(),
        &session.actor,
        &race_id,
        &req,
    )?;
    drop(persistence);

    Ok(Json(response))
}

async fn handle_list_reports(
    AxumState(app_state): AxumState<AppState>,
    session: SessionAccount,
) -> Result<Json<Vec<ReportGroup>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let groups: Vec<ReportGroup> =
        trail_france_api::list_pending_reports(&mut persistence, &session.actor)?;
    drop(persistence);

    Ok(Json(groups))
}

async fn handle_validate_reports(
    AxumState(app_state): AxumState<AppState>,
    session: SessionAccount,
    Path(race_id): Path<String>,
) -> Result<Json<ReviewReportsResponse>, HttpError> {
    info!(account_id = %session.actor.id, race_id = %race_id, "Handling validate_reports request");

    let mut persistence = app_state.persistence.lock().await;
    let response: ReviewReportsResponse = trail_france_api::validate_reports(
        &mut persistence,
        &session.actor,
        &race_id,
        OffsetDateTime::now_utc(),
    )?;
    drop(persistence);

    Ok(Json(response))
}

async fn handle_reject_reports(
    AxumState(app_state): AxumState<AppState>,
    session: SessionAccount,
    Path(race_id): Path<String>,
) -> Result<Json<ReviewReportsResponse>, HttpError> {
    info!(account_id = %session.actor.id, race_id = %race_id, "Handling reject_reports request");

    let mut persistence = app_state.persistence.lock().await;
    let response: ReviewReportsResponse = trail_france_api::reject_reports(
        &mut persistence,
        &session.actor,
        &race_id,
        OffsetDateTime::now_utc(),
    )?;
    drop(persistence);

    Ok(Json(response))
}

// ============================================================================
// Favorites
// ============================================================================

async fn handle_list_favorites(
    AxumState(app_state): AxumState<AppState>,
    session: SessionAccount,
) -> Result<Json<Vec<FavoriteEntry>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let favorites: Vec<FavoriteEntry> = trail_france_api::list_favorites(
        &mut persistence,
        &session.actor,
        OffsetDateTime::now_utc(),
    )?;
    drop(persistence);

    Ok(Json(favorites))
}

async fn handle_add_favorite(
    AxumState(app_state): AxumState<AppState>,
    session: SessionAccount,
    Path(race_id): Path<String>,
    Query(query): Query<AddFavoriteQuery>,
) -> Result<Json<MessageResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: MessageResponse = trail_france_api::add_favorite(
        &mut persistence,
        &session.actor,
        &race_id,
        query.notify,
        OffsetDateTime::now_utc(),
    )?;
    drop(persistence);

    Ok(Json(response))
}

async fn handle_remove_favorite(
    AxumState(app_state): AxumState<AppState>,
    session: SessionAccount,
    Path(race_id): Path<String>,
) -> Result<Json<MessageResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: MessageResponse =
        trail_france_api::remove_favorite(&mut persistence, &session.actor, &race_id)?;
    drop(persistence);

    Ok(Json(response))
}

async fn handle_set_favorite_notify(
    AxumState(app_state): AxumState<AppState>,
    session: SessionAccount,
    Path(race_id): Path<String>,
    Query(query): Query<NotifyQuery>,
) -> Result<Json<MessageResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: MessageResponse = trail_france_api::set_favorite_notify(
        &mut persistence,
        &session.actor,
        &race_id,
        query.notify,
    )?;
    drop(persistence);

    Ok(Json(response))
}

// ============================================================================
// Filter facets
// ============================================================================

async fn handle_list_regions(
    AxumState(app_state): AxumState<AppState>,
) -> Result<Json<Vec<String>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let regions: Vec<String> = trail_france_api::list_regions(&mut persistence)?;
    drop(persistence);

    Ok(Json(regions))
}

async fn handle_list_departments(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<DepartmentsQuery>,
) -> Result<Json<Vec<String>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let departments: Vec<String> =
        trail_france_api::list_departments(&mut persistence, query.region.as_deref())?;
    drop(persistence);

    Ok(Json(departments))
}

/// Builds the application router with all endpoints under `/api`.
fn build_router(app_state: AppState) -> Router {
    let api: Router<AppState> = Router::new()
        .route("/", get(handle_root))
        .route("/auth/register", post(handle_register))
        .route("/auth/login", post(handle_login))
        .route("/auth/logout", post(handle_logout))
        .route("/auth/me", get(handle_whoami))
        .route("/races", get(handle_list_races).post(handle_create_race))
        .route(
            "/races/{race_id}",
            get(handle_get_race)
                .put(handle_update_race)
                .delete(handle_delete_race),
        )
        .route("/races/{race_id}/report-closed", post(handle_submit_report))
        .route("/admin/pending", get(handle_list_pending_races))
        .route("/admin/moderate/{race_id}", post(handle_moderate_race))
        .route("/admin/reports", get(handle_list_reports))
        .route(
            "/admin/reports/{race_id}/validate",
            post(handle_validate_reports),
        )
        .route("/admin/reports/{race_id}/reject", post(handle_reject_reports))
        .route("/favorites", get(handle_list_favorites))
        .route(
            "/favorites/{race_id}",
            post(handle_add_favorite).delete(handle_remove_favorite),
        )
        .route("/favorites/{race_id}/notify", put(handle_set_favorite_notify))
        .route("/users/settings", put(handle_update_settings))
        .route("/filters/regions", get(handle_list_regions))
        .route("/filters/departments", get(handle_list_departments));

    Router::new().nest("/api", api).with_state(app_state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Trail France server");

    let policy: ReportingPolicy = ReportingPolicy::new(
        args.report_threshold,
        Duration::days(i64::from(args.report_lookback_days)),
    )?;
    let config: EngineConfig = EngineConfig::new(policy, args.admin_email.clone());
    if config.admin_recipient().is_none() {
        info!("No admin email configured, admin notifications are disabled");
    }
    info!(
        threshold = policy.threshold(),
        lookback_days = policy.lookback().whole_days(),
        "Report quorum configured"
    );

    let mut persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    if let (Some(email), Some(password)) =
        (&args.bootstrap_admin_email, &args.bootstrap_admin_password)
    {
        let created: Option<String> = trail_france_api::bootstrap_admin(
            &mut persistence,
            email,
            password,
            &args.bootstrap_admin_name,
            OffsetDateTime::now_utc(),
        )?;
        match created {
            Some(account_id) => info!(account_id = %account_id, "Created bootstrap admin"),
            None => info!("Admin account already exists, bootstrap skipped"),
        }
    }

    let (dispatcher, _worker) = NotificationDispatcher::spawn(
        DispatcherConfig {
            public_base_url: args.public_base_url.clone(),
            sender_email: args.sender_email.clone(),
        },
        Arc::new(LogTransport),
    );

    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        config: Arc::new(config),
        notifier: Arc::new(dispatcher),
    };

    let app: Router = build_router(app_state);

    let addr: std::net::SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests;
