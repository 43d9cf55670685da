use crate::{
    AppState,
    auth::Supervisor,
    error::{ApiError, ErrorBody},
    extract::{ApiPath, ApiQuery, JsonOrForm},
    models::{
        CreateMovieRequest, LoginRequest, LoginResponse, MessageResponse, Movie,
        RegisterUserRequest, UpdateMovieRequest, User, UserProfile,
    },
    repository::bounded,
    token::TokenClaims,
};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use serde::Deserialize;

/// Fixed page size of GET /movies.
pub const MOVIES_PER_PAGE: i64 = 10;

// --- Query Structs ---

/// MovieListParams
///
/// Query parameters of GET /movies. `page` is kept as raw text and parsed
/// leniently: anything missing, non-numeric or below 1 means the first page.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MovieListParams {
    /// 1-based page number.
    pub page: Option<String>,
}

/// page_window
///
/// Offset/limit pair for a requested page.
pub fn page_window(page: Option<&str>) -> (i64, i64) {
    let page = page
        .and_then(|p| p.trim().parse::<i64>().ok())
        .filter(|p| *p >= 1)
        .unwrap_or(1);
    let offset = (page - 1).saturating_mul(MOVIES_PER_PAGE);
    (offset, MOVIES_PER_PAGE)
}

// --- Users ---

/// list_users
///
/// [Public Route] Every registered user, without password hashes.
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    responses(
        (status = 200, description = "Users", body = [UserProfile]),
        (status = 500, description = "Store failure", body = ErrorBody)
    )
)]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserProfile>>, ApiError> {
    let users = bounded(state.config.store_timeout, state.repo.list_users()).await?;
    Ok(Json(users.into_iter().map(UserProfile::from).collect()))
}

/// register_user
///
/// [Public Route] Creates a user. The password is hashed through the
/// configured `PasswordHasher` before it reaches the store.
#[utoipa::path(
    post,
    path = "/users/register",
    tag = "users",
    request_body(content = RegisterUserRequest, content_type = "application/json"),
    responses(
        (status = 201, description = "Registered", body = MessageResponse),
        (status = 400, description = "Malformed body", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody)
    )
)]
pub async fn register_user(
    State(state): State<AppState>,
    JsonOrForm(payload): JsonOrForm<RegisterUserRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let password_hash = state.hasher.hash(&payload.password)?;

    let user = User {
        id: payload.id,
        email: payload.email,
        gender: payload.gender,
        password_hash,
        role: payload.role,
    };

    tracing::info!(email = %user.email, role = %user.role, "registering user");
    bounded(state.config.store_timeout, state.repo.create_user(user)).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Data berhasil disimpan")),
    ))
}

/// login
///
/// [Public Route] Exchanges email and password for an access token.
///
/// An unknown email and a wrong password are indistinguishable to the
/// client: both are `SignInError`.
#[utoipa::path(
    post,
    path = "/users/login",
    tag = "users",
    request_body(content = LoginRequest, content_type = "application/json"),
    responses(
        (status = 200, description = "Signed in", body = LoginResponse),
        (status = 401, description = "Invalid username or password", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    JsonOrForm(payload): JsonOrForm<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = bounded(
        state.config.store_timeout,
        state.repo.find_user_by_email(&payload.email),
    )
    .await?;

    // An unknown email still pays for one hash check, so timing does not
    // reveal which addresses are registered.
    let user = match user {
        Some(user) if state.hasher.verify(&payload.password, &user.password_hash) => user,
        Some(_) => return Err(ApiError::SignInError),
        None => {
            state.hasher.verify_decoy(&payload.password);
            return Err(ApiError::SignInError);
        }
    };

    let access_token = state.tokens.issue(TokenClaims {
        email: user.email.clone(),
    })?;

    tracing::info!(email = %user.email, "user signed in");
    Ok(Json(LoginResponse {
        access_token,
        result: user.into(),
    }))
}

// --- Movies (Supervisor only) ---

/// list_movies
///
/// [Supervisor Route] One page of movies, ten per page.
#[utoipa::path(
    get,
    path = "/movies",
    tag = "movies",
    params(MovieListParams),
    security(("access_token" = [])),
    responses(
        (status = 200, description = "Movies", body = [Movie]),
        (status = 400, description = "Malformed query string", body = ErrorBody),
        (status = 401, description = "Missing token or not a Supervisor", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody)
    )
)]
pub async fn list_movies(
    _supervisor: Supervisor,
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<MovieListParams>,
) -> Result<Json<Vec<Movie>>, ApiError> {
    let (offset, limit) = page_window(params.page.as_deref());
    let movies = bounded(state.config.store_timeout, state.repo.list_movies(offset, limit)).await?;
    Ok(Json(movies))
}

/// create_movie
///
/// [Supervisor Route] Stores a movie with a client-assigned id.
#[utoipa::path(
    post,
    path = "/movies",
    tag = "movies",
    request_body(content = CreateMovieRequest, content_type = "application/json"),
    security(("access_token" = [])),
    responses(
        (status = 201, description = "Stored", body = MessageResponse),
        (status = 400, description = "Malformed body", body = ErrorBody),
        (status = 401, description = "Missing token or not a Supervisor", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody)
    )
)]
pub async fn create_movie(
    supervisor: Supervisor,
    State(state): State<AppState>,
    JsonOrForm(payload): JsonOrForm<CreateMovieRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    tracing::info!(movie_id = payload.id, by = %supervisor.user().email, "creating movie");
    bounded(state.config.store_timeout, state.repo.create_movie(payload)).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Data berhasil disimpan")),
    ))
}

/// update_movie
///
/// [Supervisor Route] Replaces the genres of one movie.
#[utoipa::path(
    put,
    path = "/movies/{id}",
    tag = "movies",
    params(("id" = i32, Path, description = "Movie ID")),
    request_body(content = UpdateMovieRequest, content_type = "application/json"),
    security(("access_token" = [])),
    responses(
        (status = 200, description = "Updated", body = MessageResponse),
        (status = 400, description = "Malformed id or body", body = ErrorBody),
        (status = 401, description = "Missing token or not a Supervisor", body = ErrorBody),
        (status = 404, description = "Data not found", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody)
    )
)]
pub async fn update_movie(
    supervisor: Supervisor,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    JsonOrForm(payload): JsonOrForm<UpdateMovieRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let affected = bounded(
        state.config.store_timeout,
        state.repo.update_movie_genres(id, &payload.genres),
    )
    .await?;

    if affected == 0 {
        return Err(ApiError::NotFound);
    }

    tracing::info!(movie_id = id, by = %supervisor.user().email, "movie updated");
    Ok(Json(MessageResponse::new("Success")))
}

/// delete_movie
///
/// [Supervisor Route] Removes one movie.
#[utoipa::path(
    delete,
    path = "/movies/{id}",
    tag = "movies",
    params(("id" = i32, Path, description = "Movie ID")),
    security(("access_token" = [])),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 400, description = "Malformed id", body = ErrorBody),
        (status = 401, description = "Missing token or not a Supervisor", body = ErrorBody),
        (status = 404, description = "Data not found", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody)
    )
)]
pub async fn delete_movie(
    supervisor: Supervisor,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<MessageResponse>, ApiError> {
    let affected = bounded(state.config.store_timeout, state.repo.delete_movie(id)).await?;

    if affected == 0 {
        return Err(ApiError::NotFound);
    }

    tracing::info!(movie_id = id, by = %supervisor.user().email, "movie deleted");
    Ok(Json(MessageResponse::new("Success")))
}
