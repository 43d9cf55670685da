use std::sync::Arc;

use crate::error::ApiError;

/// PasswordHasher
///
/// Credential storage contract. Handlers never compare raw passwords; they
/// hash on registration and verify on login through this trait.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, plain: &str) -> Result<String, ApiError>;

    /// False for a wrong password and for a hash that cannot be parsed.
    fn verify(&self, plain: &str, hash: &str) -> bool;

    /// Does the work of one `verify` against a throwaway hash and discards
    /// the result. Used when there is no stored hash to check against.
    fn verify_decoy(&self, plain: &str);
}

pub type HasherState = Arc<dyn PasswordHasher>;

/// BcryptHasher
///
/// Holds a decoy hash made at the same cost as real ones, so checking it
/// takes as long as checking a stored password.
#[derive(Debug, Clone)]
pub struct BcryptHasher {
    cost: u32,
    decoy: String,
}

impl BcryptHasher {
    pub fn new(cost: u32) -> Self {
        let decoy = bcrypt::hash("decoy-password", cost).unwrap_or_else(|e| {
            tracing::warn!("cannot build decoy hash at cost {}: {}", cost, e);
            String::new()
        });
        Self { cost, decoy }
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl PasswordHasher for BcryptHasher {
    fn hash(&self, plain: &str) -> Result<String, ApiError> {
        bcrypt::hash(plain, self.cost).map_err(|e| ApiError::internal(format!("bcrypt: {e}")))
    }

    fn verify(&self, plain: &str, hash: &str) -> bool {
        bcrypt::verify(plain, hash).unwrap_or_else(|e| {
            tracing::warn!("stored password hash is unreadable: {}", e);
            false
        })
    }

    fn verify_decoy(&self, plain: &str) {
        let _ = bcrypt::verify(plain, &self.decoy);
    }
}
