use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;

// --- Database Rows ---

/// User
///
/// A row of the `users` table. Holds the bcrypt hash, so it is deliberately
/// not `Serialize`: anything leaving the API goes through `UserProfile`.
#[derive(Debug, Clone, FromRow, Default, PartialEq)]
pub struct User {
    pub id: String,
    // Unique; the lookup key for both login and token resolution.
    pub email: String,
    pub gender: String,
    pub password_hash: String,
    // Free-form; only the exact value "Supervisor" unlocks /movies.
    pub role: String,
}

/// Movie
///
/// A row of the `movies` table.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default, PartialEq)]
#[ts(export)]
pub struct Movie {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Toy Story (1995)")]
    pub title: String,
    /// Stored as a Postgres `TEXT[]`.
    #[schema(example = json!(["Adventure", "Animation", "Children"]))]
    pub genres: Vec<String>,
    #[schema(example = 1995)]
    pub year: i32,
}

// --- Request Payloads ---

/// RegisterUserRequest
///
/// Input for POST /users/register. Accepted as JSON or urlencoded form.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RegisterUserRequest {
    #[schema(example = "1")]
    pub id: String,
    #[schema(example = "user@example.com")]
    pub email: String,
    #[schema(example = "male")]
    pub gender: String,
    #[schema(example = "password123")]
    pub password: String,
    #[schema(example = "user")]
    pub role: String,
}

/// LoginRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginRequest {
    #[schema(example = "user@example.com")]
    pub email: String,
    #[schema(example = "password123")]
    pub password: String,
}

/// CreateMovieRequest
///
/// Input for POST /movies. The id is client-assigned.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateMovieRequest {
    pub id: i32,
    pub title: String,
    #[serde(deserialize_with = "genre_list")]
    #[schema(example = json!(["Adventure", "Animation"]))]
    pub genres: Vec<String>,
    pub year: i32,
}

/// UpdateMovieRequest
///
/// Input for PUT /movies/{id}. Only the genres can change.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateMovieRequest {
    #[serde(deserialize_with = "genre_list")]
    #[schema(example = json!(["Comedy", "Drama"]))]
    pub genres: Vec<String>,
}

/// genre_list
///
/// Accepts genres as a JSON array, or as one string with `|` separators
/// (the only shape an urlencoded form can carry). Blank entries are dropped.
fn genre_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Genres {
        List(Vec<String>),
        Joined(String),
    }

    let genres = match Genres::deserialize(deserializer)? {
        Genres::List(list) => list,
        Genres::Joined(joined) => joined.split('|').map(str::to_string).collect(),
    };

    Ok(genres
        .into_iter()
        .map(|genre| genre.trim().to_string())
        .filter(|genre| !genre.is_empty())
        .collect())
}

// --- Responses ---

/// UserProfile
///
/// Public view of a `User`: everything except the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub gender: String,
    pub role: String,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            gender: user.gender,
            role: user.role,
        }
    }
}

/// LoginResponse
///
/// Returned by a successful POST /users/login.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginResponse {
    /// Send back in the `access_token` header on protected routes.
    pub access_token: String,
    pub result: UserProfile,
}

/// MessageResponse
///
/// Plain acknowledgement body for mutations.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[ts(export)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
