//! SurrealDB implementation of [`OrganizationRepository`].

use std::time::Duration;

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tenantry_core::error::TenantryResult;
use tenantry_core::id::ParsedId;
use tenantry_core::models::organization::{CreateOrganization, Organization};
use tenantry_core::repository::OrganizationRepository;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbError;
use crate::timeout::{DEFAULT_QUERY_TIMEOUT, bounded};

const ENTITY: &str = "organization";

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct OrganizationRow {
    name: String,
    collection_name: String,
    admin_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct OrganizationRowWithId {
    record_id: String,
    name: String,
    collection_name: String,
    admin_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrganizationRow {
    fn into_organization(self, id: Uuid) -> Result<Organization, DbError> {
        let admin_id = Uuid::parse_str(&self.admin_id)
            .map_err(|e| DbError::Corrupt(format!("invalid admin UUID: {e}")))?;
        Ok(Organization {
            id,
            name: self.name,
            collection_name: self.collection_name,
            admin_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl OrganizationRowWithId {
    fn try_into_organization(self) -> Result<Organization, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Corrupt(format!("invalid UUID: {e}")))?;
        OrganizationRow {
            name: self.name,
            collection_name: self.collection_name,
            admin_id: self.admin_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_organization(id)
    }
}

/// SurrealDB implementation of the organization half of the tenant
/// registry.
#[derive(Clone)]
pub struct SurrealOrganizationRepository<C: Connection> {
    db: Surreal<C>,
    timeout: Duration,
}

impl<C: Connection> SurrealOrganizationRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self::with_timeout(db, DEFAULT_QUERY_TIMEOUT)
    }

    pub fn with_timeout(db: Surreal<C>, timeout: Duration) -> Self {
        Self { db, timeout }
    }

    async fn find_one_where(
        &self,
        clause: &'static str,
        value: String,
    ) -> Result<Option<Organization>, DbError> {
        let query = format!("SELECT meta::id(id) AS record_id, * FROM organization WHERE {clause}");
        let rows: Vec<OrganizationRowWithId> = bounded(self.timeout, async {
            let mut result = self.db.query(&query).bind(("value", value)).await?;
            let rows: Vec<OrganizationRowWithId> = result.take(0)?;
            Ok::<_, DbError>(rows)
        })
        .await?;

        rows.into_iter()
            .next()
            .map(OrganizationRowWithId::try_into_organization)
            .transpose()
    }
}

impl<C: Connection> OrganizationRepository for SurrealOrganizationRepository<C> {
    async fn create(&self, input: CreateOrganization) -> TenantryResult<Organization> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let row = bounded(self.timeout, async {
            let result = self
                .db
                .query(
                    "CREATE type::record('organization', $id) SET \
                     name = $name, collection_name = $collection_name, \
                     admin_id = $admin_id",
                )
                .bind(("id", id_str.clone()))
                .bind(("name", input.name))
                .bind(("collection_name", input.collection_name))
                .bind(("admin_id", input.admin_id.to_string()))
                .await?;

            let mut result = result
                .check()
                .map_err(|e| DbError::from_statement(e, ENTITY))?;

            let rows: Vec<OrganizationRow> = result.take(0)?;
            rows.into_iter().next().ok_or_else(|| DbError::NotFound {
                entity: ENTITY.into(),
                id: id_str.clone(),
            })
        })
        .await?;

        Ok(row.into_organization(id)?)
    }

    async fn find_by_name(&self, name: &str) -> TenantryResult<Option<Organization>> {
        debug!(name, "Looking up organization by name");
        Ok(self.find_one_where("name = $value", name.to_string()).await?)
    }

    async fn find_by_id(&self, id: ParsedId) -> TenantryResult<Option<Organization>> {
        let Some(id) = id.valid() else {
            return Ok(None);
        };

        let rows = bounded(self.timeout, async {
            let mut result = self
                .db
                .query("SELECT * FROM type::record('organization', $id)")
                .bind(("id", id.to_string()))
                .await?;
            let rows: Vec<OrganizationRow> = result.take(0)?;
            Ok::<_, DbError>(rows)
        })
        .await?;

        Ok(rows
            .into_iter()
            .next()
            .map(|row| row.into_organization(id))
            .transpose()?)
    }

    async fn find_by_collection(
        &self,
        collection_name: &str,
    ) -> TenantryResult<Option<Organization>> {
        Ok(self
            .find_one_where("collection_name = $value", collection_name.to_string())
            .await?)
    }

    async fn update_name(
        &self,
        id: Uuid,
        new_name: &str,
        new_collection: &str,
    ) -> TenantryResult<Organization> {
        let id_str = id.to_string();

        let row = bounded(self.timeout, async {
            let result = self
                .db
                .query(
                    "UPDATE type::record('organization', $id) SET \
                     name = $name, collection_name = $collection_name, \
                     updated_at = time::now()",
                )
                .bind(("id", id_str.clone()))
                .bind(("name", new_name.to_string()))
                .bind(("collection_name", new_collection.to_string()))
                .await?;

            let mut result = result
                .check()
                .map_err(|e| DbError::from_statement(e, ENTITY))?;

            let rows: Vec<OrganizationRow> = result.take(0)?;
            rows.into_iter().next().ok_or_else(|| DbError::NotFound {
                entity: ENTITY.into(),
                id: id_str.clone(),
            })
        })
        .await?;

        Ok(row.into_organization(id)?)
    }

    async fn delete(&self, id: Uuid) -> TenantryResult<()> {
        bounded(self.timeout, async {
            self.db
                .query("DELETE type::record('organization', $id)")
                .bind(("id", id.to_string()))
                .await?
                .check()?;
            Ok::<_, DbError>(())
        })
        .await?;

        Ok(())
    }
}
