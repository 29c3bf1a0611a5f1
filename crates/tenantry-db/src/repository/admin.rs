//! SurrealDB implementation of [`AdminRepository`].
//!
//! Emails are lower-cased before storage and lookup; the schema also
//! normalizes them so that the unique index is case-insensitive.

use std::time::Duration;

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tenantry_core::error::TenantryResult;
use tenantry_core::id::ParsedId;
use tenantry_core::models::admin::{Admin, CreateAdmin, normalize_email};
use tenantry_core::repository::AdminRepository;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbError;
use crate::timeout::{DEFAULT_QUERY_TIMEOUT, bounded};

const ENTITY: &str = "admin";

#[derive(Debug, SurrealValue)]
struct AdminRow {
    email: String,
    password_hash: String,
    org_id: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct AdminRowWithId {
    record_id: String,
    email: String,
    password_hash: String,
    org_id: Option<String>,
    created_at: DateTime<Utc>,
}

impl AdminRow {
    fn into_admin(self, id: Uuid) -> Result<Admin, DbError> {
        let org_id = self
            .org_id
            .map(|raw| {
                Uuid::parse_str(&raw)
                    .map_err(|e| DbError::Corrupt(format!("invalid organization UUID: {e}")))
            })
            .transpose()?;
        Ok(Admin {
            id,
            email: self.email,
            password_hash: self.password_hash,
            org_id,
            created_at: self.created_at,
        })
    }
}

impl AdminRowWithId {
    fn try_into_admin(self) -> Result<Admin, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Corrupt(format!("invalid UUID: {e}")))?;
        AdminRow {
            email: self.email,
            password_hash: self.password_hash,
            org_id: self.org_id,
            created_at: self.created_at,
        }
        .into_admin(id)
    }
}

/// SurrealDB implementation of the admin half of the tenant registry.
#[derive(Clone)]
pub struct SurrealAdminRepository<C: Connection> {
    db: Surreal<C>,
    timeout: Duration,
}

impl<C: Connection> SurrealAdminRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self::with_timeout(db, DEFAULT_QUERY_TIMEOUT)
    }

    pub fn with_timeout(db: Surreal<C>, timeout: Duration) -> Self {
        Self { db, timeout }
    }
}

impl<C: Connection> AdminRepository for SurrealAdminRepository<C> {
    async fn create(&self, input: CreateAdmin) -> TenantryResult<Admin> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let email = normalize_email(&input.email);

        let row = bounded(self.timeout, async {
            let result = self
                .db
                .query(
                    "CREATE type::record('admin', $id) SET \
                     email = $email, password_hash = $password_hash, \
                     org_id = NONE",
                )
                .bind(("id", id_str.clone()))
                .bind(("email", email))
                .bind(("password_hash", input.password_hash))
                .await?;

            let mut result = result
                .check()
                .map_err(|e| DbError::from_statement(e, ENTITY))?;

            let rows: Vec<AdminRow> = result.take(0)?;
            rows.into_iter().next().ok_or_else(|| DbError::NotFound {
                entity: ENTITY.into(),
                id: id_str.clone(),
            })
        })
        .await?;

        Ok(row.into_admin(id)?)
    }

    async fn find_by_email(&self, email: &str) -> TenantryResult<Option<Admin>> {
        let email = normalize_email(email);
        debug!(%email, "Looking up admin by email");

        let rows = bounded(self.timeout, async {
            let mut result = self
                .db
                .query("SELECT meta::id(id) AS record_id, * FROM admin WHERE email = $email")
                .bind(("email", email))
                .await?;
            let rows: Vec<AdminRowWithId> = result.take(0)?;
            Ok::<_, DbError>(rows)
        })
        .await?;

        Ok(rows
            .into_iter()
            .next()
            .map(AdminRowWithId::try_into_admin)
            .transpose()?)
    }

    async fn find_by_id(&self, id: ParsedId) -> TenantryResult<Option<Admin>> {
        let Some(id) = id.valid() else {
            return Ok(None);
        };

        let rows = bounded(self.timeout, async {
            let mut result = self
                .db
                .query("SELECT * FROM type::record('admin', $id)")
                .bind(("id", id.to_string()))
                .await?;
            let rows: Vec<AdminRow> = result.take(0)?;
            Ok::<_, DbError>(rows)
        })
        .await?;

        Ok(rows
            .into_iter()
            .next()
            .map(|row| row.into_admin(id))
            .transpose()?)
    }

    async fn bind_to_org(&self, admin_id: Uuid, org_id: Uuid) -> TenantryResult<Admin> {
        let id_str = admin_id.to_string();

        let row = bounded(self.timeout, async {
            let result = self
                .db
                .query("UPDATE type::record('admin', $id) SET org_id = $org_id")
                .bind(("id", id_str.clone()))
                .bind(("org_id", org_id.to_string()))
                .await?;

            let mut result = result
                .check()
                .map_err(|e| DbError::from_statement(e, ENTITY))?;

            let rows: Vec<AdminRow> = result.take(0)?;
            rows.into_iter().next().ok_or_else(|| DbError::NotFound {
                entity: ENTITY.into(),
                id: id_str.clone(),
            })
        })
        .await?;

        Ok(row.into_admin(admin_id)?)
    }

    async fn delete(&self, id: Uuid) -> TenantryResult<()> {
        bounded(self.timeout, async {
            self.db
                .query("DELETE type::record('admin', $id)")
                .bind(("id", id.to_string()))
                .await?
                .check()?;
            Ok::<_, DbError>(())
        })
        .await?;

        Ok(())
    }

    async fn delete_by_org(&self, org_id: Uuid) -> TenantryResult<()> {
        bounded(self.timeout, async {
            self.db
                .query("DELETE admin WHERE org_id = $org_id")
                .bind(("org_id", org_id.to_string()))
                .await?
                .check()?;
            Ok::<_, DbError>(())
        })
        .await?;

        Ok(())
    }
}
