//! Tenantry Database — SurrealDB connection management, schema
//! migrations, the tenant registry and the tenant collection store.
//!
//! This crate provides:
//! - Connection management ([`DbManager`], [`DbConfig`])
//! - Schema initialization and migrations ([`run_migrations`])
//! - Repository implementations of the `tenantry-core` traits
//!   ([`repository`])
//! - Error types ([`DbError`])

mod connection;
mod error;
mod schema;
mod timeout;

pub mod repository;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use schema::run_migrations;
pub use timeout::DEFAULT_QUERY_TIMEOUT;
