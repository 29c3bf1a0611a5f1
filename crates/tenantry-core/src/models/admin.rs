//! Admin domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Admin {
    pub id: Uuid,
    /// Lower-cased, globally unique.
    pub email: String,
    pub password_hash: String,
    /// Owning organization. `None` only between the two phases of
    /// organization creation.
    pub org_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// A provisional admin record: created before its organization exists
/// and completed by binding it to one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAdmin {
    pub email: String,
    /// Argon2id PHC string, never the raw password.
    pub password_hash: String,
}

/// Normalize an email for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Minimal structural email check: one `@` with non-empty local part
/// and a dotted domain.
pub fn is_plausible_email(email: &str) -> bool {
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && domain.contains('.')
                && !email.chars().any(char::is_whitespace)
        }
        _ => false,
    }
}
