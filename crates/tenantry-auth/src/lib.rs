//! Tenantry Auth — admin password hashing, JWT issuance/validation and
//! the organization lifecycle service built on top of them.

pub mod config;
pub mod error;
pub mod password;
pub mod service;
pub mod token;

pub use config::AuthConfig;
pub use error::AuthError;
pub use service::{
    CreateOrganizationInput, LoginOutput, OrganizationService, UpdateOrganizationInput,
};
pub use token::{AccessIdentity, AccessTokenClaims, TokenValidation};
