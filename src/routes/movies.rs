use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, put},
};

/// Movies Router Module
///
/// Every route here is Supervisor-only. `create_router` layers the
/// `authenticate` and `require_supervisor` stages over this whole router,
/// and each handler additionally takes a `Supervisor` argument.
pub fn movie_routes() -> Router<AppState> {
    Router::new()
        // GET /movies?page=N   (10 per page)
        // POST /movies
        .route("/", get(handlers::list_movies).post(handlers::create_movie))
        // PUT /movies/{id}     (genres only)
        // DELETE /movies/{id}
        .route(
            "/{id}",
            put(handlers::update_movie).delete(handlers::delete_movie),
        )
}
