//! Process configuration loaded once from the environment.

use std::time::Duration;

use anyhow::{Context, bail};
use tenantry_auth::AuthConfig;
use tenantry_auth::config::JWT_ALGORITHM;
use tenantry_db::DbConfig;

/// Aggregated configuration for every component.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db: DbConfig,
    pub auth: AuthConfig,
}

impl AppConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = DbConfig::default();
        let or_default = |key: &str, default: String| get(key).unwrap_or(default);

        let algorithm = or_default("JWT_ALGORITHM", JWT_ALGORITHM.into());
        if algorithm != JWT_ALGORITHM {
            bail!("unsupported JWT_ALGORITHM {algorithm:?}, only {JWT_ALGORITHM} is accepted");
        }

        let jwt_secret = get("JWT_SECRET_KEY")
            .filter(|s| !s.is_empty())
            .context("JWT_SECRET_KEY must be set")?;

        let ttl_minutes: u64 = or_default("ACCESS_TOKEN_EXPIRE_MINUTES", "60".into())
            .parse()
            .context("ACCESS_TOKEN_EXPIRE_MINUTES must be a whole number")?;

        let timeout_secs: u64 = match get("TENANTRY_STORE_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse()
                .context("TENANTRY_STORE_TIMEOUT_SECS must be a whole number")?,
            None => defaults.query_timeout.as_secs(),
        };

        let mut auth = AuthConfig::new(jwt_secret, ttl_minutes);
        auth.pepper = get("TENANTRY_PASSWORD_PEPPER").filter(|s| !s.is_empty());

        Ok(Self {
            db: DbConfig {
                url: or_default("TENANTRY_DB_URL", defaults.url),
                namespace: or_default("TENANTRY_DB_NAMESPACE", defaults.namespace),
                database: or_default("MASTER_DB_NAME", defaults.database),
                username: or_default("TENANTRY_DB_USER", defaults.username),
                password: or_default("TENANTRY_DB_PASS", defaults.password),
                query_timeout: Duration::from_secs(timeout_secs),
            },
            auth,
        })
    }
}
