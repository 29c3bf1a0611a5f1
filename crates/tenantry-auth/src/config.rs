//! Authentication configuration.

use std::fmt;

/// The only signing algorithm accepted for access tokens.
pub const JWT_ALGORITHM: &str = "HS256";

/// Configuration for credential hashing and token issuance.
///
/// Built once at startup and handed to the services that need it.
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC secret used to sign and verify access tokens.
    pub jwt_secret: String,
    /// Access token lifetime in seconds (default: 3600 = 60 minutes).
    pub access_token_lifetime_secs: u64,
    /// Optional pepper prepended to passwords before Argon2id hashing.
    pub pepper: Option<String>,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>, access_token_ttl_minutes: u64) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            access_token_lifetime_secs: access_token_ttl_minutes.saturating_mul(60),
            ..Self::default()
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            access_token_lifetime_secs: 3600,
            pepper: None,
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("access_token_lifetime_secs", &self.access_token_lifetime_secs)
            .field("pepper", &self.pepper.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}
