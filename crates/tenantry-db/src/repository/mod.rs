//! SurrealDB repository implementations.

mod admin;
mod organization;
mod tenant_collection;

pub use admin::SurrealAdminRepository;
pub use organization::SurrealOrganizationRepository;
pub use tenant_collection::SurrealTenantCollectionStore;
