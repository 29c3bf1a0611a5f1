//! HS256 access token issuance and validation.
//!
//! Tokens are not persisted: validity is decided purely by signature
//! and expiry. Every validation failure collapses into
//! [`TokenValidation::Invalid`].

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;

/// Value of `token_type` in login responses.
pub const TOKEN_TYPE: &str = "bearer";

/// JWT claims embedded in every access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject — admin ID (UUID string).
    pub sub: String,
    /// Organization the admin is bound to (UUID string).
    pub org_id: String,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
}

/// Identity asserted by a valid token. The identifiers are kept as
/// presented; lookups parse them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessIdentity {
    pub admin_id: String,
    pub org_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenValidation {
    Valid(AccessIdentity),
    Invalid,
}

/// Issue a signed HS256 token binding `admin_id` to `org_id` for `ttl`.
pub fn issue_access_token(
    admin_id: Uuid,
    org_id: Uuid,
    ttl: Duration,
    config: &AuthConfig,
) -> Result<String, AuthError> {
    if config.jwt_secret.is_empty() {
        return Err(AuthError::Crypto("JWT signing key is not configured".into()));
    }

    let now = Utc::now();
    let expires_at = now
        .checked_add_signed(ttl)
        .ok_or_else(|| AuthError::Crypto("token lifetime out of range".into()))?;
    let claims = AccessTokenClaims {
        sub: admin_id.to_string(),
        org_id: org_id.to_string(),
        iat: now.timestamp(),
        exp: expires_at.timestamp(),
    };

    let key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
    jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &key)
        .map_err(|e| AuthError::Crypto(format!("JWT encode: {e}")))
}

/// Decode and verify an HS256 access token.
///
/// Fails on a bad signature, an elapsed `exp` (no leeway), a missing
/// or empty `sub`/`org_id`, or any other malformation.
pub fn decode_access_token(
    token: &str,
    config: &AuthConfig,
) -> Result<AccessTokenClaims, AuthError> {
    if config.jwt_secret.is_empty() {
        return Err(AuthError::TokenInvalid("no verification key".into()));
    }

    let key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_required_spec_claims(&["sub", "exp"]);

    let claims = jsonwebtoken::decode::<AccessTokenClaims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| AuthError::TokenInvalid(e.to_string()))?;

    if claims.sub.is_empty() || claims.org_id.is_empty() {
        return Err(AuthError::TokenInvalid("empty identity claim".into()));
    }
    Ok(claims)
}

/// Validate a token and return the identity it asserts.
///
/// Never fails: any problem yields [`TokenValidation::Invalid`].
pub fn validate_access_token(token: &str, config: &AuthConfig) -> TokenValidation {
    match decode_access_token(token, config) {
        Ok(claims) => TokenValidation::Valid(AccessIdentity {
            admin_id: claims.sub,
            org_id: claims.org_id,
        }),
        Err(e) => {
            debug!(error = %e, "Rejected access token");
            TokenValidation::Invalid
        }
    }
}

/// Extract the token from an `Authorization` header value of the form
/// `Bearer <token>`. The scheme is matched case-insensitively.
pub fn extract_bearer(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}
