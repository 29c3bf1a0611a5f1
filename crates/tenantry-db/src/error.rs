//! Database-specific error types and conversions.

use tenantry_core::error::TenantryError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Unique constraint violated on {entity}")]
    Conflict { entity: String },

    #[error("Query timed out after {millis} ms")]
    Timeout { millis: u64 },

    #[error("Invalid collection name: {0}")]
    InvalidCollectionName(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

impl DbError {
    /// Classify an error reported by a statement: unique index
    /// violations become [`DbError::Conflict`].
    pub(crate) fn from_statement(err: surrealdb::Error, entity: &str) -> Self {
        let message = err.to_string();
        if message.contains("already contains") || message.contains("already exists") {
            DbError::Conflict {
                entity: entity.to_string(),
            }
        } else {
            DbError::Surreal(err)
        }
    }
}

impl From<DbError> for TenantryError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => TenantryError::NotFound { entity, key: id },
            DbError::Conflict { entity } => TenantryError::Conflict { entity },
            DbError::Timeout { millis } => TenantryError::Timeout { millis },
            DbError::InvalidCollectionName(name) => {
                TenantryError::validation(format!("invalid collection name: {name}"))
            }
            other => TenantryError::Database(other.to_string()),
        }
    }
}
