//! Authentication error types.

use tenantry_core::error::TenantryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for TenantryError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => TenantryError::unauthorized("invalid credentials"),
            // The cause stays in logs; callers only learn the token was rejected.
            AuthError::TokenInvalid(_) => {
                TenantryError::unauthorized("could not validate credentials")
            }
            AuthError::Crypto(msg) => TenantryError::Crypto(msg),
        }
    }
}
