//! Domain models for tenantry.

pub mod admin;
pub mod organization;
