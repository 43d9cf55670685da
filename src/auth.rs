use axum::{
    extract::{FromRef, FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use std::time::Duration;

use crate::{
    config::AppConfig,
    error::ApiError,
    repository::{Repository, RepositoryState, bounded},
    token::{TokenClaims, TokenService},
};

/// Request header carrying the access token issued by POST /users/login.
pub const ACCESS_TOKEN_HEADER: &str = "access_token";

/// The only role allowed through the movies gate. Compared by exact equality.
pub const SUPERVISOR_ROLE: &str = "Supervisor";

/// AuthUser
///
/// The resolved identity of a request: a verified token whose email matched
/// exactly one stored user. This is the Request Context of the pipeline. It
/// has no public constructor path through HTTP other than the extractor
/// below, so holding one proves the Authenticate stage succeeded.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    pub role: String,
}

/// resolve_identity
///
/// Identity Resolver: token -> claims -> user row.
///
/// * `verify` yielding nothing (forged, malformed, expired) -> `Unauthenticated`.
/// * No row for the email -> `Unauthenticated`; an empty lookup is never
///   treated as a successful one.
/// * Store failure or timeout -> `InternalError`.
pub async fn resolve_identity(
    tokens: &TokenService,
    repo: &dyn Repository,
    store_timeout: Duration,
    token: &str,
) -> Result<AuthUser, ApiError> {
    let claims: TokenClaims = tokens.verify(token).ok_or(ApiError::Unauthenticated)?;

    let user = bounded(store_timeout, repo.find_user_by_email(&claims.email))
        .await?
        .ok_or_else(|| {
            tracing::warn!(email = %claims.email, "valid token for unknown user");
            ApiError::Unauthenticated
        })?;

    Ok(AuthUser {
        id: user.id,
        email: user.email,
        role: user.role,
    })
}

/// AuthUser Extractor Implementation
///
/// Reuses an identity already placed in the request extensions by the
/// `authenticate` middleware; otherwise reads the `access_token` header and
/// runs `resolve_identity`, caching the result for later extractors.
///
/// Rejection: the resolver's `ApiError`, rendered by the error mapper.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    TokenService: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let token = parts
            .headers
            .get(ACCESS_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .ok_or(ApiError::Unauthenticated)?;

        let repo = RepositoryState::from_ref(state);
        let tokens = TokenService::from_ref(state);
        let config = AppConfig::from_ref(state);

        let user = resolve_identity(&tokens, repo.as_ref(), config.store_timeout, token).await?;
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}

/// Supervisor
///
/// Proof that a request's identity holds the Supervisor role. Only
/// `authorize` builds one, and `authorize` needs an `AuthUser`, so the role
/// check cannot run ahead of authentication.
#[derive(Debug, Clone)]
pub struct Supervisor(AuthUser);

impl Supervisor {
    pub fn user(&self) -> &AuthUser {
        &self.0
    }
}

/// authorize
///
/// Role check: exact string equality, no hierarchy.
pub fn authorize(user: AuthUser) -> Result<Supervisor, ApiError> {
    if user.role == SUPERVISOR_ROLE {
        Ok(Supervisor(user))
    } else {
        tracing::debug!(email = %user.email, role = %user.role, "role check failed");
        Err(ApiError::Unauthorized)
    }
}

impl<S> FromRequestParts<S> for Supervisor
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    TokenService: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        authorize(user)
    }
}

/// authenticate
///
/// Authenticate stage. Extraction of `AuthUser` either succeeds, in which
/// case the identity is stored in the request extensions, or short-circuits
/// with the resolver's error before the next stage runs.
pub async fn authenticate(user: AuthUser, mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(user);
    next.run(request).await
}

/// require_supervisor
///
/// Authorize stage. Takes its role from `Supervisor`, which is derived from
/// the `AuthUser` cached by `authenticate`.
pub async fn require_supervisor(_supervisor: Supervisor, request: Request, next: Next) -> Response {
    next.run(request).await
}
