//! Tenantry Core — domain models, error taxonomy, identifier parsing
//! and the repository traits implemented by the storage layer.

pub mod error;
pub mod id;
pub mod models;
pub mod repository;
pub mod slug;
