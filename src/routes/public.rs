use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints that need no token. Login is the only way to obtain one.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers.
        .route("/health", get(|| async { "ok" }))
        // GET /users
        .route("/users", get(handlers::list_users))
        // POST /users/register
        // Accepts JSON or urlencoded bodies; the password is hashed before storage.
        .route("/users/register", post(handlers::register_user))
        // POST /users/login
        // Returns `access_token`, to be sent back in the `access_token` header.
        .route("/users/login", post(handlers::login))
}
