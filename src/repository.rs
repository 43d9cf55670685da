use crate::{
    error::ApiError,
    models::{CreateMovieRequest, Movie, User},
};
use async_trait::async_trait;
use sqlx::PgPool;
use std::{future::Future, sync::Arc, time::Duration};

/// Result type of every store call. Driver errors stay typed here and are
/// converted to `ApiError::InternalError` at the handler boundary.
pub type StoreResult<T> = Result<T, sqlx::Error>;

/// Repository Trait
///
/// The contract the HTTP layer has with the relational store. Every method
/// binds its inputs as query parameters; nothing is string-concatenated.
///
/// **Send + Sync + async_trait** let `Arc<dyn Repository>` cross Axum's task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    async fn list_users(&self) -> StoreResult<Vec<User>>;
    // Zero-or-one: `None` when no row matches the email exactly.
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn create_user(&self, user: User) -> StoreResult<()>;

    // --- Movies ---
    async fn list_movies(&self, offset: i64, limit: i64) -> StoreResult<Vec<Movie>>;
    async fn create_movie(&self, movie: CreateMovieRequest) -> StoreResult<()>;
    // Both return the number of affected rows so callers can detect a missing id.
    async fn update_movie_genres(&self, id: i32, genres: &[String]) -> StoreResult<u64>;
    async fn delete_movie(&self, id: i32) -> StoreResult<u64>;
}

/// RepositoryState
///
/// The shared handle to the persistence layer held in `AppState`.
pub type RepositoryState = Arc<dyn Repository>;

/// bounded
///
/// Runs one store call under `limit`. Elapsed time and driver errors both
/// come back as `ApiError::InternalError`.
pub async fn bounded<T, F>(limit: Duration, call: F) -> Result<T, ApiError>
where
    F: Future<Output = StoreResult<T>>,
{
    Ok(tokio::time::timeout(limit, call).await??)
}

/// PostgresRepository
///
/// `Repository` backed by a Postgres connection pool.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn list_users(&self) -> StoreResult<Vec<User>> {
        sqlx::query_as::<_, User>(
            "SELECT id, email, gender, password_hash, role FROM users ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        sqlx::query_as::<_, User>(
            "SELECT id, email, gender, password_hash, role FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }

    async fn create_user(&self, user: User) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO users (id, email, gender, password_hash, role) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(user.id)
        .bind(user.email)
        .bind(user.gender)
        .bind(user.password_hash)
        .bind(user.role)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_movies(&self, offset: i64, limit: i64) -> StoreResult<Vec<Movie>> {
        sqlx::query_as::<_, Movie>(
            "SELECT id, title, genres, year FROM movies ORDER BY id OFFSET $1 LIMIT $2",
        )
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    async fn create_movie(&self, movie: CreateMovieRequest) -> StoreResult<()> {
        sqlx::query("INSERT INTO movies (id, title, genres, year) VALUES ($1, $2, $3, $4)")
            .bind(movie.id)
            .bind(movie.title)
            .bind(movie.genres)
            .bind(movie.year)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update_movie_genres(&self, id: i32, genres: &[String]) -> StoreResult<u64> {
        let result = sqlx::query("UPDATE movies SET genres = $1 WHERE id = $2")
            .bind(genres)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_movie(&self, id: i32) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM movies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
