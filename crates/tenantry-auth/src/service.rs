//! Organization lifecycle service — create, read, rename, delete and
//! admin login.
//!
//! Every call re-reads registry state; nothing is cached between
//! requests. Name uniqueness is ultimately enforced by the store, so a
//! lost race surfaces as `Conflict` from the registry write.

use chrono::Duration;
use tenantry_core::error::{TenantryError, TenantryResult};
use tenantry_core::id::ParsedId;
use tenantry_core::models::admin::{Admin, CreateAdmin, is_plausible_email, normalize_email};
use tenantry_core::models::organization::{
    CreateOrganization, ORPHANED_ADMIN_EMAIL, OrgView, Organization,
};
use tenantry_core::repository::{AdminRepository, OrganizationRepository, TenantCollectionStore};
use tenantry_core::slug;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::token::{self, TOKEN_TYPE, TokenValidation};

/// Input for organization creation.
#[derive(Debug)]
pub struct CreateOrganizationInput {
    pub organization_name: String,
    pub email: String,
    pub password: String,
}

/// Input for organization rename. `email` and `password` must be the
/// registered admin's credentials.
#[derive(Debug)]
pub struct UpdateOrganizationInput {
    pub organization_name: String,
    pub new_organization_name: String,
    pub email: String,
    pub password: String,
}

/// Successful login result.
#[derive(Debug)]
pub struct LoginOutput {
    /// Signed JWT access token.
    pub access_token: String,
    /// Always `bearer`.
    pub token_type: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
}

/// Organization lifecycle service.
///
/// Generic over repository implementations so that the lifecycle layer
/// has no dependency on the database crate.
pub struct OrganizationService<O, A, T>
where
    O: OrganizationRepository,
    A: AdminRepository,
    T: TenantCollectionStore,
{
    org_repo: O,
    admin_repo: A,
    collections: T,
    config: AuthConfig,
}

impl<O, A, T> OrganizationService<O, A, T>
where
    O: OrganizationRepository,
    A: AdminRepository,
    T: TenantCollectionStore,
{
    pub fn new(org_repo: O, admin_repo: A, collections: T, config: AuthConfig) -> Self {
        Self {
            org_repo,
            admin_repo,
            collections,
            config,
        }
    }

    /// Register an organization, its admin and an empty tenant
    /// collection.
    ///
    /// The admin is created first without an organization, the
    /// organization is created referencing it, and the admin is then
    /// bound back. Any failure after the admin exists undoes the
    /// records written so far.
    pub async fn create_organization(
        &self,
        input: CreateOrganizationInput,
    ) -> TenantryResult<OrgView> {
        let collection_name = validate_org_name(&input.organization_name)?;
        validate_credentials(&input.email, &input.password)?;

        if self
            .org_repo
            .find_by_name(&input.organization_name)
            .await?
            .is_some()
        {
            return Err(TenantryError::conflict("organization"));
        }
        self.ensure_collection_free(&collection_name).await?;

        let password_hash = password::hash_password(&input.password, self.config.pepper.as_deref())?;
        let admin = self
            .admin_repo
            .create(CreateAdmin {
                email: normalize_email(&input.email),
                password_hash,
            })
            .await?;

        let org = match self
            .org_repo
            .create(CreateOrganization {
                name: input.organization_name,
                collection_name,
                admin_id: admin.id,
            })
            .await
        {
            Ok(org) => org,
            Err(e) => {
                self.rollback_create(None, admin.id).await;
                return Err(e);
            }
        };

        if let Err(e) = self.admin_repo.bind_to_org(admin.id, org.id).await {
            self.rollback_create(Some(org.id), admin.id).await;
            return Err(e);
        }

        if let Err(e) = self.collections.create_empty(&org.collection_name).await {
            self.rollback_create(Some(org.id), admin.id).await;
            return Err(e);
        }

        info!(
            org_id = %org.id,
            name = %org.name,
            collection = %org.collection_name,
            "Organization created"
        );
        Ok(OrgView::new(&org, admin.email))
    }

    /// Look up an organization by name.
    pub async fn get_organization(&self, name: &str) -> TenantryResult<OrgView> {
        let org = self.require_org(name).await?;
        let admin_email = match self
            .admin_repo
            .find_by_id(ParsedId::Valid(org.admin_id))
            .await?
        {
            Some(admin) => admin.email,
            None => {
                warn!(org_id = %org.id, admin_id = %org.admin_id, "Organization admin is missing");
                ORPHANED_ADMIN_EMAIL.to_string()
            }
        };
        Ok(OrgView::new(&org, admin_email))
    }

    /// Rename an organization, moving its tenant data to the collection
    /// derived from the new name.
    ///
    /// Data is copied before the registry is updated and the old
    /// collection is dropped only after the registry points at the new
    /// one. If the registry update reports an error, the registry is
    /// re-read: an update that landed anyway completes the rename,
    /// otherwise the copy is discarded unless another organization has
    /// claimed it. Renaming to the current name re-checks credentials
    /// and changes nothing.
    pub async fn update_organization(
        &self,
        input: UpdateOrganizationInput,
    ) -> TenantryResult<OrgView> {
        let org = self.require_org(&input.organization_name).await?;
        let admin = self
            .verify_org_admin(&org, &input.email, &input.password)
            .await?;

        if input.new_organization_name == input.organization_name {
            return Ok(OrgView::new(&org, admin.email));
        }

        let new_collection = validate_org_name(&input.new_organization_name)?;
        if self
            .org_repo
            .find_by_name(&input.new_organization_name)
            .await?
            .is_some()
        {
            return Err(TenantryError::conflict("organization"));
        }

        if new_collection == org.collection_name {
            let renamed = self
                .org_repo
                .update_name(org.id, &input.new_organization_name, &new_collection)
                .await?;
            info!(org_id = %org.id, from = %org.name, to = %renamed.name, "Organization renamed");
            return Ok(OrgView::new(&renamed, admin.email));
        }

        self.ensure_collection_free(&new_collection).await?;

        let copied = match self
            .collections
            .copy_all(&org.collection_name, &new_collection)
            .await
        {
            Ok(copied) => copied,
            Err(e) => {
                self.discard_copy(&org, &new_collection).await;
                return Err(e);
            }
        };

        let renamed = match self
            .org_repo
            .update_name(org.id, &input.new_organization_name, &new_collection)
            .await
        {
            Ok(renamed) => renamed,
            Err(e) => match self.settle_failed_rename(&org, &new_collection).await {
                Some(renamed) => renamed,
                None => return Err(e),
            },
        };

        if let Err(e) = self.collections.drop_collection(&org.collection_name).await {
            warn!(
                collection = %org.collection_name,
                error = %e,
                "Rename committed but old collection could not be dropped"
            );
        }

        info!(
            org_id = %org.id,
            from = %org.name,
            to = %renamed.name,
            records = copied,
            "Organization renamed"
        );
        Ok(OrgView::new(&renamed, admin.email))
    }

    /// Delete an organization on behalf of the admin identified by
    /// `token`, which must be bound to that same organization.
    pub async fn delete_organization(&self, name: &str, token: &str) -> TenantryResult<()> {
        let (_, org) = self.authenticate(token).await?;

        if org.name != name {
            return Err(TenantryError::forbidden("cannot delete another organization"));
        }

        self.collections
            .drop_collection(&org.collection_name)
            .await?;
        self.admin_repo.delete_by_org(org.id).await?;
        self.org_repo.delete(org.id).await?;

        info!(org_id = %org.id, name = %org.name, "Organization deleted");
        Ok(())
    }

    /// Authenticate an admin by email and password and issue a token
    /// bound to their organization.
    pub async fn login(&self, email: &str, password: &str) -> TenantryResult<LoginOutput> {
        let admin = self
            .admin_repo
            .find_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !password::verify_password(password, &admin.password_hash, self.config.pepper.as_deref())
        {
            return Err(AuthError::InvalidCredentials.into());
        }

        let org_id = admin.org_id.ok_or_else(|| {
            warn!(admin_id = %admin.id, "Admin has no organization");
            TenantryError::invalid_state("admin not associated with any organization")
        })?;

        let ttl = i64::try_from(self.config.access_token_lifetime_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .ok_or_else(|| TenantryError::Internal("token lifetime out of range".into()))?;
        let access_token = token::issue_access_token(admin.id, org_id, ttl, &self.config)?;

        Ok(LoginOutput {
            access_token,
            token_type: TOKEN_TYPE.to_string(),
            expires_in: self.config.access_token_lifetime_secs,
        })
    }

    /// Resolve a bearer token to the admin and organization it is bound
    /// to. Invalid tokens, and tokens whose admin or organization no
    /// longer exist, fail with `Unauthorized`.
    pub async fn authenticate(&self, token: &str) -> TenantryResult<(Admin, Organization)> {
        let identity = match token::validate_access_token(token, &self.config) {
            TokenValidation::Valid(identity) => identity,
            TokenValidation::Invalid => {
                return Err(AuthError::TokenInvalid("rejected".into()).into());
            }
        };

        let admin = self
            .admin_repo
            .find_by_id(ParsedId::parse(&identity.admin_id))
            .await?;
        let org = self
            .org_repo
            .find_by_id(ParsedId::parse(&identity.org_id))
            .await?;

        match (admin, org) {
            (Some(admin), Some(org)) if admin.org_id == Some(org.id) => Ok((admin, org)),
            _ => Err(AuthError::TokenInvalid("identity no longer resolves".into()).into()),
        }
    }

    // -------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------

    async fn require_org(&self, name: &str) -> TenantryResult<Organization> {
        self.org_repo
            .find_by_name(name)
            .await?
            .ok_or_else(|| TenantryError::not_found("organization", name))
    }

    async fn ensure_collection_free(&self, collection_name: &str) -> TenantryResult<()> {
        match self.org_repo.find_by_collection(collection_name).await? {
            Some(_) => Err(TenantryError::conflict("organization collection")),
            None => Ok(()),
        }
    }

    /// Check that `email` and `password` belong to the organization's
    /// registered admin.
    async fn verify_org_admin(
        &self,
        org: &Organization,
        email: &str,
        password: &str,
    ) -> TenantryResult<Admin> {
        let admin = self
            .admin_repo
            .find_by_id(ParsedId::Valid(org.admin_id))
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let email_matches = admin.email == normalize_email(email);
        let password_matches =
            password::verify_password(password, &admin.password_hash, self.config.pepper.as_deref());
        if !email_matches || !password_matches {
            return Err(AuthError::InvalidCredentials.into());
        }
        Ok(admin)
    }

    /// Decide the outcome of a rename whose registry update returned an
    /// error. The write may still have been applied (e.g. a timed-out
    /// call that committed), so the registry is the source of truth.
    async fn settle_failed_rename(
        &self,
        org: &Organization,
        new_collection: &str,
    ) -> Option<Organization> {
        match self.org_repo.find_by_id(ParsedId::Valid(org.id)).await {
            Ok(Some(current)) if current.collection_name == new_collection => {
                warn!(
                    org_id = %org.id,
                    collection = new_collection,
                    "Registry update reported failure but was applied"
                );
                Some(current)
            }
            Ok(_) => {
                self.discard_copy(org, new_collection).await;
                None
            }
            Err(e) => {
                warn!(
                    org_id = %org.id,
                    collection = new_collection,
                    error = %e,
                    "Registry state unknown after failed rename, keeping both collections"
                );
                None
            }
        }
    }

    /// Drop a copy made for an aborted rename, unless the registry
    /// assigns that collection to some organization.
    async fn discard_copy(&self, org: &Organization, collection: &str) {
        match self.org_repo.find_by_collection(collection).await {
            Ok(None) => {
                if let Err(e) = self.collections.drop_collection(collection).await {
                    warn!(
                        org_id = %org.id,
                        collection,
                        error = %e,
                        "Failed to drop copy after aborted rename"
                    );
                }
            }
            Ok(Some(owner)) => {
                warn!(
                    org_id = %org.id,
                    owner_id = %owner.id,
                    collection,
                    "Rename target claimed by another organization, leaving it in place"
                );
            }
            Err(e) => {
                warn!(
                    org_id = %org.id,
                    collection,
                    error = %e,
                    "Could not confirm ownership of rename target, leaving it in place"
                );
            }
        }
    }

    async fn rollback_create(&self, org_id: Option<Uuid>, admin_id: Uuid) {
        warn!(?org_id, %admin_id, "Rolling back partial organization create");
        if let Some(org_id) = org_id {
            if let Err(e) = self.org_repo.delete(org_id).await {
                warn!(%org_id, error = %e, "Failed to remove organization during rollback");
            }
        }
        if let Err(e) = self.admin_repo.delete(admin_id).await {
            warn!(%admin_id, error = %e, "Failed to remove admin during rollback");
        }
    }
}

/// Validate an organization name and derive its collection name.
fn validate_org_name(name: &str) -> TenantryResult<String> {
    if name.trim().is_empty() {
        return Err(TenantryError::validation("organization name must not be empty"));
    }
    slug::collection_name(name).ok_or_else(|| {
        TenantryError::validation("organization name must contain a letter or digit")
    })
}

fn validate_credentials(email: &str, password: &str) -> TenantryResult<()> {
    if !is_plausible_email(email.trim()) {
        return Err(TenantryError::validation("invalid email address"));
    }
    if password.is_empty() {
        return Err(TenantryError::validation("password must not be empty"));
    }
    Ok(())
}
