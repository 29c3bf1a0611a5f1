//! SurrealDB implementation of [`TenantCollectionStore`].
//!
//! Each tenant collection is a SCHEMALESS table in the metadata
//! database. Table names cannot be bound as query parameters, so every
//! name is checked with [`is_valid_collection_name`] before it is
//! spliced into a statement.

use std::time::Duration;

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tenantry_core::error::TenantryResult;
use tenantry_core::repository::TenantCollectionStore;
use tenantry_core::slug::is_valid_collection_name;
use tracing::{info, warn};

use crate::error::DbError;
use crate::timeout::{DEFAULT_QUERY_TIMEOUT, bounded};

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

fn table_ident(name: &str) -> Result<String, DbError> {
    if is_valid_collection_name(name) {
        Ok(format!("`{name}`"))
    } else {
        Err(DbError::InvalidCollectionName(name.to_string()))
    }
}

/// Tenant data migrator backed by SurrealDB tables.
#[derive(Clone)]
pub struct SurrealTenantCollectionStore<C: Connection> {
    db: Surreal<C>,
    timeout: Duration,
}

impl<C: Connection> SurrealTenantCollectionStore<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self::with_timeout(db, DEFAULT_QUERY_TIMEOUT)
    }

    pub fn with_timeout(db: Surreal<C>, timeout: Duration) -> Self {
        Self { db, timeout }
    }

    async fn execute(&self, statements: String) -> Result<(), DbError> {
        bounded(self.timeout, async {
            self.db.query(&statements).await?.check()?;
            Ok::<_, DbError>(())
        })
        .await
    }

    /// Whether any organization in the registry owns `name`.
    async fn is_registered(&self, name: &str) -> Result<bool, DbError> {
        let owned = bounded(self.timeout, async {
            let mut result = self
                .db
                .query(
                    "RETURN array::len((SELECT VALUE id FROM organization \
                     WHERE collection_name = $name)) > 0",
                )
                .bind(("name", name.to_string()))
                .await?;
            let owned: Option<bool> = result.take(0)?;
            Ok::<_, DbError>(owned)
        })
        .await?;
        Ok(owned.unwrap_or(false))
    }
}

impl<C: Connection> TenantCollectionStore for SurrealTenantCollectionStore<C> {
    async fn create_empty(&self, name: &str) -> TenantryResult<()> {
        let table = table_ident(name)?;
        self.execute(format!(
            "REMOVE TABLE IF EXISTS {table}; DEFINE TABLE {table} SCHEMALESS;"
        ))
        .await?;

        info!(collection = name, "Provisioned tenant collection");
        Ok(())
    }

    async fn copy_all(&self, from: &str, to: &str) -> TenantryResult<u64> {
        let source = table_ident(from)?;
        let target = table_ident(to)?;
        if from == to {
            return self.count(from).await;
        }

        if !self.exists(from).await? {
            warn!(from, to, "Source collection missing, provisioning empty target");
        }
        let expected = self.count(from).await?;

        // The target is replaced only if no organization is registered
        // against it; the check and the replacement commit together.
        let mut statements = format!(
            "BEGIN TRANSACTION; \
             IF array::len((SELECT VALUE id FROM organization WHERE collection_name = $target)) > 0 {{ \
                 THROW \"tenant collection is registered to an organization\" \
             }}; \
             REMOVE TABLE IF EXISTS {target}; DEFINE TABLE {target} SCHEMALESS;"
        );
        if expected > 0 {
            // Omitting `id` makes the target assign fresh record ids.
            statements.push_str(&format!(
                " INSERT INTO {target} (SELECT * OMIT id FROM {source});"
            ));
        }
        statements.push_str(" COMMIT TRANSACTION;");

        let replaced = bounded(self.timeout, async {
            self.db
                .query(&statements)
                .bind(("target", to.to_string()))
                .await?
                .check()?;
            Ok::<_, DbError>(())
        })
        .await;
        if let Err(e) = replaced {
            if self.is_registered(to).await? {
                warn!(from, to, "Refusing to overwrite a registered tenant collection");
                return Err(DbError::Conflict {
                    entity: "tenant collection".into(),
                }
                .into());
            }
            return Err(e.into());
        }

        let copied = self.count(to).await?;
        if copied != expected {
            return Err(DbError::Migration(format!(
                "copied {copied} of {expected} records from {from} to {to}"
            ))
            .into());
        }

        info!(from, to, records = copied, "Copied tenant collection");
        Ok(copied)
    }

    async fn rename_with_data(&self, from: &str, to: &str) -> TenantryResult<u64> {
        let copied = self.copy_all(from, to).await?;
        if from != to {
            self.drop_collection(from).await?;
        }
        Ok(copied)
    }

    async fn drop_collection(&self, name: &str) -> TenantryResult<()> {
        let table = table_ident(name)?;
        self.execute(format!("REMOVE TABLE IF EXISTS {table};")).await?;

        info!(collection = name, "Dropped tenant collection");
        Ok(())
    }

    async fn exists(&self, name: &str) -> TenantryResult<bool> {
        table_ident(name)?;

        let found = bounded(self.timeout, async {
            let mut result = self
                .db
                .query("RETURN object::keys((INFO FOR DB).tables) CONTAINS $name")
                .bind(("name", name.to_string()))
                .await?;
            let found: Option<bool> = result.take(0)?;
            Ok::<_, DbError>(found)
        })
        .await?;

        Ok(found.unwrap_or(false))
    }

    async fn count(&self, name: &str) -> TenantryResult<u64> {
        let table = table_ident(name)?;
        if !self.exists(name).await? {
            return Ok(0);
        }

        let query = format!("SELECT count() AS total FROM {table} GROUP ALL");
        let rows = bounded(self.timeout, async {
            let mut result = self.db.query(&query).await?;
            let rows: Vec<CountRow> = result.take(0)?;
            Ok::<_, DbError>(rows)
        })
        .await?;

        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }
}
