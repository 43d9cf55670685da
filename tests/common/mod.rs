#![allow(dead_code)]

use async_trait::async_trait;
use axum::{body::Body, http::Response};
use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use movie_api::{
    AppConfig, AppState, BcryptHasher, PasswordHasher,
    models::{CreateMovieRequest, Movie, User},
    repository::{Repository, StoreResult},
};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

// --- In-memory Repository ---

/// Stands in for Postgres. `mutations` counts every write that reached the
/// store, which is how tests observe whether a handler ran.
#[derive(Default)]
pub struct MockRepo {
    pub users: Mutex<Vec<User>>,
    pub movies: Mutex<Vec<Movie>>,
    pub mutations: AtomicUsize,
    pub fail: bool,
}

impl MockRepo {
    pub fn with_users(users: Vec<User>) -> Self {
        Self {
            users: Mutex::new(users),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn seed_movies(&self, count: i32) {
        let mut movies = self.movies.lock().unwrap();
        for id in 1..=count {
            movies.push(Movie {
                id,
                title: format!("Movie {id}"),
                genres: vec!["Drama".to_string()],
                year: 2000 + id,
            });
        }
    }

    pub fn mutation_count(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }

    fn check(&self) -> StoreResult<()> {
        if self.fail {
            Err(sqlx::Error::PoolTimedOut)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Repository for MockRepo {
    async fn list_users(&self) -> StoreResult<Vec<User>> {
        self.check()?;
        Ok(self.users.lock().unwrap().clone())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.check()?;
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn create_user(&self, user: User) -> StoreResult<()> {
        self.check()?;
        self.mutations.fetch_add(1, Ordering::SeqCst);
        self.users.lock().unwrap().push(user);
        Ok(())
    }

    async fn list_movies(&self, offset: i64, limit: i64) -> StoreResult<Vec<Movie>> {
        self.check()?;
        Ok(self
            .movies
            .lock()
            .unwrap()
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn create_movie(&self, movie: CreateMovieRequest) -> StoreResult<()> {
        self.check()?;
        self.mutations.fetch_add(1, Ordering::SeqCst);
        self.movies.lock().unwrap().push(Movie {
            id: movie.id,
            title: movie.title,
            genres: movie.genres,
            year: movie.year,
        });
        Ok(())
    }

    async fn update_movie_genres(&self, id: i32, genres: &[String]) -> StoreResult<u64> {
        self.check()?;
        self.mutations.fetch_add(1, Ordering::SeqCst);
        let mut movies = self.movies.lock().unwrap();
        match movies.iter_mut().find(|m| m.id == id) {
            Some(movie) => {
                movie.genres = genres.to_vec();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_movie(&self, id: i32) -> StoreResult<u64> {
        self.check()?;
        self.mutations.fetch_add(1, Ordering::SeqCst);
        let mut movies = self.movies.lock().unwrap();
        let before = movies.len();
        movies.retain(|m| m.id != id);
        Ok((before - movies.len()) as u64)
    }
}

// --- Fixtures ---

pub const TEST_JWT_SECRET: &str = "test-secret-value-1234567890";
pub const SUPERVISOR_EMAIL: &str = "boss@example.com";
pub const USER_EMAIL: &str = "user@example.com";
pub const PASSWORD: &str = "password123";

/// Lowest bcrypt cost so hashing stays fast under test.
pub fn hasher() -> BcryptHasher {
    BcryptHasher::new(4)
}

pub fn stored_user(id: &str, email: &str, role: &str) -> User {
    User {
        id: id.to_string(),
        email: email.to_string(),
        gender: "female".to_string(),
        password_hash: hasher().hash(PASSWORD).unwrap(),
        role: role.to_string(),
    }
}

/// A Supervisor and a plain "user" account, both with `PASSWORD`.
pub fn seeded_repo() -> MockRepo {
    MockRepo::with_users(vec![
        stored_user("1", USER_EMAIL, "user"),
        stored_user("2", SUPERVISOR_EMAIL, "Supervisor"),
    ])
}

pub fn test_config() -> AppConfig {
    AppConfig {
        jwt_secret: TEST_JWT_SECRET.to_string(),
        bcrypt_cost: 4,
        ..AppConfig::default()
    }
}

pub fn test_state(repo: Arc<MockRepo>) -> AppState {
    AppState::new(repo, test_config())
}

/// A token for `email` signed with `secret` whose `exp` is `exp_offset`
/// seconds from now (negative for already expired).
pub fn raw_token(email: &str, secret: &str, exp_offset: i64) -> String {
    let now = Utc::now().timestamp();
    let claims = serde_json::json!({
        "email": email,
        "iat": now,
        "exp": now + exp_offset,
    });
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
