use axum::{
    Router,
    extract::FromRef,
    http::HeaderName,
    middleware,
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod password;
pub mod repository;
pub mod token;

pub mod routes;
use routes::{movies, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::ApiError;
pub use password::{BcryptHasher, HasherState, PasswordHasher};
pub use repository::{PostgresRepository, Repository, RepositoryState};
pub use token::TokenService;

/// ApiDoc
///
/// OpenAPI document for every handler, served at `/openapi.json` and
/// browsable through Swagger UI at `/api-docs`.
#[derive(OpenApi)]
#[openapi(
    info(title = "Movie API", description = "Users and movies CRUD with token auth"),
    paths(
        handlers::list_users, handlers::register_user, handlers::login,
        handlers::list_movies, handlers::create_movie, handlers::update_movie,
        handlers::delete_movie
    ),
    components(
        schemas(
            models::Movie, models::UserProfile, models::RegisterUserRequest,
            models::LoginRequest, models::LoginResponse, models::CreateMovieRequest,
            models::UpdateMovieRequest, models::MessageResponse, error::ErrorBody,
        )
    ),
    modifiers(&AccessTokenScheme),
    tags(
        (name = "users", description = "Registration and login"),
        (name = "movies", description = "Supervisor-only movie catalogue")
    )
)]
pub struct ApiDoc;

/// Registers the `access_token` header as the API key scheme the movie routes require.
struct AccessTokenScheme;

impl Modify for AccessTokenScheme {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "access_token",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(
                    auth::ACCESS_TOKEN_HEADER,
                ))),
            );
        }
    }
}

/// AppState
///
/// Everything a request may touch, shared immutably across tasks. The only
/// cross-request resources are the store pool behind `repo` and the config.
#[derive(Clone)]
pub struct AppState {
    pub repo: RepositoryState,
    pub tokens: TokenService,
    pub hasher: HasherState,
    pub config: AppConfig,
}

impl AppState {
    /// Wires the token service and hasher from `config`.
    pub fn new(repo: RepositoryState, config: AppConfig) -> Self {
        Self {
            repo,
            tokens: TokenService::new(&config.jwt_secret, config.token_ttl),
            hasher: std::sync::Arc::new(BcryptHasher::new(config.bcrypt_cost)),
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for TokenService {
    fn from_ref(app_state: &AppState) -> TokenService {
        app_state.tokens.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Public routes are mounted bare. The movie group gets the two gate stages
/// as route layers: `authenticate` (outermost, runs first) then
/// `require_supervisor`.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let protected_movies = movies::movie_routes()
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_supervisor,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::authenticate,
        ));

    let base_router = Router::new()
        .merge(SwaggerUi::new("/api-docs").url("/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .nest("/movies", protected_movies)
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// Span per request carrying method, uri and the `x-request-id` set above.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
