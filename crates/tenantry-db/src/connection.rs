//! SurrealDB connection management.

use std::time::Duration;

use surrealdb::Surreal;
use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use tracing::info;

use crate::error::DbError;
use crate::repository::{
    SurrealAdminRepository, SurrealOrganizationRepository, SurrealTenantCollectionStore,
};
use crate::timeout::{DEFAULT_QUERY_TIMEOUT, bounded};

/// Configuration for connecting to SurrealDB.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// WebSocket URL (e.g., `127.0.0.1:8000`).
    pub url: String,
    /// SurrealDB namespace.
    pub namespace: String,
    /// Metadata database; tenant collections live alongside it.
    pub database: String,
    /// Root username for authentication.
    pub username: String,
    /// Root password for authentication.
    pub password: String,
    /// Bound applied to every store call.
    pub query_timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".into(),
            namespace: "tenantry".into(),
            database: "org_master_db".into(),
            username: "root".into(),
            password: "root".into(),
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }
}

/// A connected SurrealDB client plus the call bound every repository
/// built from it inherits.
#[derive(Clone)]
pub struct DbManager {
    db: Surreal<Client>,
    query_timeout: Duration,
}

impl DbManager {
    /// Connect to SurrealDB using the provided configuration.
    ///
    /// The whole handshake (connect, root sign-in, namespace and
    /// database selection) is bounded by `config.query_timeout`.
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        info!(
            url = %config.url,
            namespace = %config.namespace,
            database = %config.database,
            timeout_ms = config.query_timeout.as_millis() as u64,
            "Connecting to SurrealDB"
        );

        let db = bounded(config.query_timeout, async {
            let db = Surreal::new::<Ws>(&config.url).await?;
            db.signin(Root {
                username: config.username.clone(),
                password: config.password.clone(),
            })
            .await?;
            db.use_ns(&config.namespace)
                .use_db(&config.database)
                .await?;
            Ok::<_, DbError>(db)
        })
        .await?;

        info!("Successfully connected to SurrealDB");

        Ok(Self {
            db,
            query_timeout: config.query_timeout,
        })
    }

    /// Returns a reference to the underlying SurrealDB client.
    pub fn client(&self) -> &Surreal<Client> {
        &self.db
    }

    pub fn query_timeout(&self) -> Duration {
        self.query_timeout
    }

    /// Tenant registry over this connection.
    pub fn organizations(&self) -> SurrealOrganizationRepository<Client> {
        SurrealOrganizationRepository::with_timeout(self.db.clone(), self.query_timeout)
    }

    pub fn admins(&self) -> SurrealAdminRepository<Client> {
        SurrealAdminRepository::with_timeout(self.db.clone(), self.query_timeout)
    }

    /// Tenant collection store over this connection.
    pub fn collections(&self) -> SurrealTenantCollectionStore<Client> {
        SurrealTenantCollectionStore::with_timeout(self.db.clone(), self.query_timeout)
    }
}
