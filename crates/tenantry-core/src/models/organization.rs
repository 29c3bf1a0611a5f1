//! Organization domain model.
//!
//! Every organization owns exactly one tenant collection, whose name is
//! derived from the organization name, and exactly one admin.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Email reported for an organization whose admin record is missing.
pub const ORPHANED_ADMIN_EMAIL: &str = "unknown@example.com";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Organization {
    pub id: Uuid,
    /// Human-readable, globally unique name.
    pub name: String,
    /// Tenant collection holding this organization's data (`org_<slug>`).
    pub collection_name: String,
    pub admin_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to register a new organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrganization {
    pub name: String,
    pub collection_name: String,
    pub admin_id: Uuid,
}

/// Read model returned by the lifecycle operations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrgView {
    pub id: Uuid,
    pub organization_name: String,
    pub collection_name: String,
    pub admin_email: String,
}

impl OrgView {
    pub fn new(org: &Organization, admin_email: impl Into<String>) -> Self {
        Self {
            id: org.id,
            organization_name: org.name.clone(),
            collection_name: org.collection_name.clone(),
            admin_email: admin_email.into(),
        }
    }
}
