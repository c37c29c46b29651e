//! HTTP API for the tennis tournament backend.
//!
//! # Modules
//!
//! - [`auth`]: Registration, login, token refresh and logout
//! - [`players`]: Player profiles
//! - [`tournaments`]: Tournaments and their registrations
//! - [`matches`]: Match scheduling and status transitions
//! - [`middleware`]: Bearer-token authentication for protected endpoints
//! - [`request_id`]: Request correlation, access logging and HTTP metrics
//! - [`error`]: Mapping library errors onto HTTP responses
//!
//! # Endpoints Overview
//!
//! ```text
//! GET    /health                                             - Database health (public)
//! POST   /api/v1/auth/register                               - Create account (public)
//! POST   /api/v1/auth/login                                  - Obtain tokens (public)
//! POST   /api/v1/auth/refresh                                - Rotate refresh token (public)
//! POST   /api/v1/auth/logout                                 - Invalidate refresh token (public)
//! GET    /api/v1/players/me                                  - Own profile
//! PUT    /api/v1/players/me                                  - Update own profile
//! GET    /api/v1/players                                     - Active players
//! GET    /api/v1/players/{id}                                - One active player
//! POST   /api/v1/tournaments                                 - Create tournament
//! GET    /api/v1/tournaments                                 - List public tournaments
//! GET    /api/v1/tournaments/my/organized                    - Caller's tournaments
//! GET    /api/v1/tournaments/registrations/my                - Caller's registrations
//! GET    /api/v1/tournaments/{id}                            - Tournament details
//! PUT    /api/v1/tournaments/{id}                            - Update (organizer)
//! DELETE /api/v1/tournaments/{id}                            - Cancel (organizer)
//! POST   /api/v1/tournaments/{id}/register                   - Register caller
//! GET    /api/v1/tournaments/{id}/registrations              - Registrations (organizer)
//! PUT    /api/v1/tournaments/{id}/registrations/{reg}        - Edit registration (organizer)
//! POST   /api/v1/tournaments/{id}/registrations/{reg}/confirm - Confirm (organizer)
//! POST   /api/v1/registrations/{reg}/cancel                  - Cancel registration
//! POST   /api/v1/matches                                     - Create match (organizer)
//! GET    /api/v1/matches                                     - List matches
//! GET    /api/v1/matches/live                                - In-progress matches
//! GET    /api/v1/matches/upcoming                            - Scheduled matches
//! GET    /api/v1/matches/my                                  - Caller's matches
//! GET    /api/v1/matches/{id}                                - Match details
//! PUT    /api/v1/matches/{id}                                - Update (organizer)
//! POST   /api/v1/matches/{id}/status                         - Start, complete or forfeit
//! GET    /api/v1/matches/{id}/sets                           - Recorded sets
//! GET    /api/v1/matches/tournaments/{tournament_id}         - Matches of a tournament
//! ```

pub mod auth;
pub mod error;
pub mod matches;
pub mod middleware;
pub mod players;
pub mod request_id;
pub mod tournaments;

use axum::{
    Router,
    extract::State,
    http::{HeaderName, HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Json},
    routing::{get, post, put},
};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use tennis_tournament::{
    AdmissionPolicy, MatchManager, PlayerManager, RegistrationManager, TournamentManager,
    auth::AuthManager,
    db::{Database, Page, PageError},
};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::SecurityConfig;

/// Application state shared across all HTTP handlers.
///
/// Cloned per request; every field is reference counted.
#[derive(Clone)]
pub struct AppState {
    pub auth_manager: Arc<AuthManager>,
    pub player_manager: Arc<PlayerManager>,
    pub tournament_manager: Arc<TournamentManager>,
    pub registration_manager: Arc<RegistrationManager>,
    pub match_manager: Arc<MatchManager>,
    pub database: Database,
}

impl AppState {
    /// Build every manager over one pool
    pub fn new(pool: PgPool, security: &SecurityConfig, admission: AdmissionPolicy) -> Self {
        let shared = Arc::new(pool.clone());

        let auth_manager = AuthManager::new(
            shared.clone(),
            security.password_pepper.clone(),
            security.jwt_secret.clone(),
        )
        .with_token_durations(
            chrono::Duration::minutes(security.access_token_minutes),
            chrono::Duration::days(security.refresh_token_days),
        );

        Self {
            auth_manager: Arc::new(auth_manager),
            player_manager: Arc::new(PlayerManager::new(shared.clone())),
            tournament_manager: Arc::new(
                TournamentManager::new(shared.clone()).with_admission_policy(admission),
            ),
            registration_manager: Arc::new(
                RegistrationManager::new(shared.clone()).with_admission_policy(admission),
            ),
            match_manager: Arc::new(MatchManager::new(shared)),
            database: Database::from_pool(pool),
        }
    }
}

/// `skip`/`limit` query parameters
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl PageQuery {
    pub fn page(&self) -> Result<Page, PageError> {
        Page::new(self.skip, self.limit)
    }
}

/// Create the complete API router.
///
/// # Example
///
/// ```rust,no_run
/// # use tt_server::api::{create_router, AppState};
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// # let state: AppState = unimplemented!();
/// let origins = vec!["http://localhost:3000".to_string()];
/// let app = create_router(state, &origins);
/// let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```
pub fn create_router(state: AppState, cors_origins: &[String]) -> Router {
    let v1_routes = create_v1_router(state.clone());

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", v1_routes)
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

/// Origins that fail to parse are dropped; `ServerConfig::validate` reports them
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static(request_id::REQUEST_ID_HEADER),
        ])
        .allow_credentials(true)
}

fn create_v1_router(state: AppState) -> Router<AppState> {
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh_token))
        .route("/auth/logout", post(auth::logout));

    let protected_routes = Router::new()
        // Players
        .route(
            "/players/me",
            get(players::get_me).put(players::update_me),
        )
        .route("/players", get(players::list_players))
        .route("/players/{player_id}", get(players::get_player))
        // Tournaments
        .route(
            "/tournaments",
            post(tournaments::create_tournament).get(tournaments::list_tournaments),
        )
        .route("/tournaments/my/organized", get(tournaments::my_organized))
        .route(
            "/tournaments/registrations/my",
            get(tournaments::my_registrations),
        )
        .route(
            "/tournaments/{tournament_id}",
            get(tournaments::get_tournament)
                .put(tournaments::update_tournament)
                .delete(tournaments::cancel_tournament),
        )
        .route(
            "/tournaments/{tournament_id}/register",
            post(tournaments::register),
        )
        .route(
            "/tournaments/{tournament_id}/registrations",
            get(tournaments::list_registrations),
        )
        .route(
            "/tournaments/{tournament_id}/registrations/{registration_id}",
            put(tournaments::update_registration),
        )
        .route(
            "/tournaments/{tournament_id}/registrations/{registration_id}/confirm",
            post(tournaments::confirm_registration),
        )
        .route(
            "/registrations/{registration_id}/cancel",
            post(tournaments::cancel_registration),
        )
        // Matches
        .route(
            "/matches",
            post(matches::create_match).get(matches::list_matches),
        )
        .route("/matches/live", get(matches::live_matches))
        .route("/matches/upcoming", get(matches::upcoming_matches))
        .route("/matches/my", get(matches::my_matches))
        .route(
            "/matches/tournaments/{tournament_id}",
            get(matches::tournament_matches),
        )
        .route(
            "/matches/{match_id}",
            get(matches::get_match).put(matches::update_match),
        )
        .route("/matches/{match_id}/status", post(matches::update_match_status))
        .route("/matches/{match_id}/sets", get(matches::list_sets))
        .layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth_middleware,
        ));

    Router::new().merge(public_routes).merge(protected_routes)
}

/// Health check for monitoring and load balancers.
///
/// `200 OK` when the database answers within the health-check timeout,
/// `503 Service Unavailable` otherwise.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_result = state.database.health_check().await;
    if let Err(err) = &db_result {
        tracing::warn!(error = %err, "Health check failed");
    }
    let healthy = db_result.is_ok();

    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "database": healthy,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
