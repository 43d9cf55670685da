use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::ApiError;

/// TokenClaims
///
/// The identity claims placed in every access token issued at login.
/// Only the email is carried; the password is never embedded in a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub email: String,
}

/// Stamped
///
/// Wire payload: the caller's claims flattened next to the registered
/// `iat`/`exp` timestamps (seconds since the epoch).
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Stamped<C> {
    #[serde(flatten)]
    claims: C,
    iat: i64,
    exp: i64,
}

/// TokenService
///
/// Issues and verifies HS256 tokens with a secret injected at construction.
/// Cloning is cheap enough to hand one copy to every request via `FromRef`.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        // Expiry is exact: a token is dead the second after `exp`.
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    /// issue
    ///
    /// Signs `claims` with `iat = now` and `exp = now + ttl`.
    /// Encoding serializable claims with a symmetric key does not fail in
    /// practice; if it ever does it surfaces as `InternalError`.
    pub fn issue<C>(&self, claims: C) -> Result<String, ApiError>
    where
        C: Serialize,
    {
        let iat = Utc::now().timestamp();
        let payload = Stamped {
            claims,
            iat,
            exp: iat + self.ttl.as_secs() as i64,
        };

        encode(&Header::new(Algorithm::HS256), &payload, &self.encoding)
            .map_err(|e| ApiError::internal(format!("token encoding: {e}")))
    }

    /// verify
    ///
    /// Returns the original claims for a well-formed, correctly signed and
    /// unexpired token, and `None` for anything else. Callers treat `None` as
    /// unauthenticated; the cause is only visible in debug logs.
    pub fn verify<C>(&self, token: &str) -> Option<C>
    where
        C: DeserializeOwned,
    {
        match decode::<Stamped<C>>(token, &self.decoding, &self.validation) {
            Ok(data) => Some(data.claims.claims),
            Err(e) => {
                tracing::debug!(reason = ?e.kind(), "token rejected");
                None
            }
        }
    }
}
