//! Repository trait definitions for data access abstraction.
//!
//! All operations are async. Identifier lookups take a [`ParsedId`]
//! and resolve [`ParsedId::Malformed`] to `Ok(None)`.

use uuid::Uuid;

use crate::error::TenantryResult;
use crate::id::ParsedId;
use crate::models::{
    admin::{Admin, CreateAdmin},
    organization::{CreateOrganization, Organization},
};

// ---------------------------------------------------------------------------
// Tenant registry (metadata)
// ---------------------------------------------------------------------------

pub trait OrganizationRepository: Send + Sync {
    /// Insert a new organization. A duplicate name or collection name
    /// fails with `Conflict`, enforced by the store.
    fn create(
        &self,
        input: CreateOrganization,
    ) -> impl Future<Output = TenantryResult<Organization>> + Send;
    fn find_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = TenantryResult<Option<Organization>>> + Send;
    fn find_by_id(
        &self,
        id: ParsedId,
    ) -> impl Future<Output = TenantryResult<Option<Organization>>> + Send;
    fn find_by_collection(
        &self,
        collection_name: &str,
    ) -> impl Future<Output = TenantryResult<Option<Organization>>> + Send;
    /// Set name and collection name together.
    fn update_name(
        &self,
        id: Uuid,
        new_name: &str,
        new_collection: &str,
    ) -> impl Future<Output = TenantryResult<Organization>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = TenantryResult<()>> + Send;
}

pub trait AdminRepository: Send + Sync {
    /// Insert a provisional admin with no organization. A duplicate
    /// email fails with `Conflict`.
    fn create(&self, input: CreateAdmin) -> impl Future<Output = TenantryResult<Admin>> + Send;
    /// Case-insensitive lookup.
    fn find_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = TenantryResult<Option<Admin>>> + Send;
    fn find_by_id(
        &self,
        id: ParsedId,
    ) -> impl Future<Output = TenantryResult<Option<Admin>>> + Send;
    /// Back-fill the owning organization of a provisional admin.
    fn bind_to_org(
        &self,
        admin_id: Uuid,
        org_id: Uuid,
    ) -> impl Future<Output = TenantryResult<Admin>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = TenantryResult<()>> + Send;
    /// Delete every admin bound to an organization.
    fn delete_by_org(&self, org_id: Uuid) -> impl Future<Output = TenantryResult<()>> + Send;
}

// ---------------------------------------------------------------------------
// Tenant data (physical collections)
// ---------------------------------------------------------------------------

pub trait TenantCollectionStore: Send + Sync {
    /// Provision an empty collection, discarding any leftover container
    /// of the same name.
    fn create_empty(&self, name: &str) -> impl Future<Output = TenantryResult<()>> + Send;
    /// Copy every record from `from` into a freshly provisioned `to`,
    /// letting the store assign new identifiers. `from` is untouched.
    /// Fails with `Conflict`, leaving `to` as it was, if an organization
    /// is registered against `to`. Returns the number of records copied.
    fn copy_all(&self, from: &str, to: &str) -> impl Future<Output = TenantryResult<u64>> + Send;
    /// Copy then drop the source. The source is never dropped unless
    /// the copy completed.
    fn rename_with_data(
        &self,
        from: &str,
        to: &str,
    ) -> impl Future<Output = TenantryResult<u64>> + Send;
    /// Idempotent: dropping a missing collection succeeds.
    fn drop_collection(&self, name: &str) -> impl Future<Output = TenantryResult<()>> + Send;
    fn exists(&self, name: &str) -> impl Future<Output = TenantryResult<bool>> + Send;
    fn count(&self, name: &str) -> impl Future<Output = TenantryResult<u64>> + Send;
}
