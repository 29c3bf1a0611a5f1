//! Tenantry Server — application entry point.
//!
//! Loads configuration, connects to SurrealDB, applies migrations and
//! builds the organization lifecycle service. The HTTP layer that
//! drives the service is deployed separately.

mod config;

use tenantry_auth::OrganizationService;
use tenantry_db::{DbManager, run_migrations};
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

const DEFAULT_LOG_DIRECTIVES: &str = "tenantry=info";

/// `RUST_LOG` directives when set, otherwise [`DEFAULT_LOG_DIRECTIVES`].
fn log_filter(rust_log: Option<&str>) -> anyhow::Result<EnvFilter> {
    let directives = rust_log
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(DEFAULT_LOG_DIRECTIVES);
    Ok(EnvFilter::try_new(directives)?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(rust_log.as_deref())?)
        .json()
        .init();

    tracing::info!("Starting tenantry server...");

    let config = AppConfig::from_env()?;
    tracing::info!(auth = ?config.auth, "Configuration loaded");

    let manager = DbManager::connect(&config.db).await?;
    run_migrations(manager.client()).await?;

    let _organizations = OrganizationService::new(
        manager.organizations(),
        manager.admins(),
        manager.collections(),
        config.auth,
    );

    tracing::info!("Organization service ready");

    tokio::signal::ctrl_c().await?;

    tracing::info!("tenantry server stopped.");
    Ok(())
}
