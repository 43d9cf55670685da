use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

/// ApiError
///
/// The closed set of failure kinds any stage of a request can raise.
/// Handlers, extractors and middleware all return `Result<_, ApiError>` and
/// stop at the first failure; the `IntoResponse` impl below is the only place
/// an error body is written to the wire.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Login credentials did not match a stored user.
    #[error("sign-in failed")]
    SignInError,
    /// Missing, malformed, forged or expired token, or a token whose user no longer exists.
    #[error("unauthenticated")]
    Unauthenticated,
    /// Identity resolved but the role does not grant access.
    #[error("unauthorized")]
    Unauthorized,
    /// The referenced entity does not exist.
    #[error("not found")]
    NotFound,
    /// The request body could not be decoded. The detail is logged, never returned.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// A path segment or query string could not be decoded. Same treatment as `BadRequest`.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// Store, hashing or encoding failure. The detail is logged, never returned.
    #[error("internal error: {0}")]
    InternalError(String),
}

/// ErrorBody
///
/// The single wire shape for every error response: `{ "message": "..." }`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[ts(export)]
pub struct ErrorBody {
    pub message: String,
}

impl ApiError {
    /// Status code for this kind, per the mapping table.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::SignInError | ApiError::Unauthorized | ApiError::Unauthenticated => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) | ApiError::InvalidParameter(_) => StatusCode::BAD_REQUEST,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message. Carries no internal detail.
    pub fn message(&self) -> &'static str {
        match self {
            ApiError::SignInError => "Invalid username or password",
            ApiError::Unauthorized => "Dont have access",
            ApiError::Unauthenticated => "Invalid or expired token",
            ApiError::NotFound => "Data not found",
            ApiError::BadRequest(_) => "Invalid request body",
            ApiError::InvalidParameter(_) => "Invalid request parameters",
            ApiError::InternalError(_) => "internal server error",
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        ApiError::InternalError(detail.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::InternalError(detail) => tracing::error!(%detail, "request failed"),
            ApiError::BadRequest(detail) => tracing::debug!(%detail, "rejected request body"),
            ApiError::InvalidParameter(detail) => tracing::debug!(%detail, "rejected request parameters"),
            other => tracing::debug!(kind = %other, "request rejected"),
        }

        let body = ErrorBody {
            message: self.message().to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::InternalError(format!("store: {err}"))
    }
}

impl From<tokio::time::error::Elapsed> for ApiError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        ApiError::InternalError("store call timed out".to_string())
    }
}
