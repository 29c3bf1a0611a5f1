//! Integration tests for the organization lifecycle service.

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use tenantry_auth::config::AuthConfig;
use tenantry_auth::service::{
    CreateOrganizationInput, OrganizationService, UpdateOrganizationInput,
};
use tenantry_auth::token::{self, TokenValidation};
use tenantry_core::error::TenantryError;
use tenantry_core::models::admin::CreateAdmin;
use tenantry_core::models::organization::{ORPHANED_ADMIN_EMAIL, OrgView};
use tenantry_core::repository::{AdminRepository, TenantCollectionStore};
use tenantry_db::repository::{
    SurrealAdminRepository, SurrealOrganizationRepository, SurrealTenantCollectionStore,
};

const PASSWORD: &str = "correct horse battery staple";

type Service = OrganizationService<
    SurrealOrganizationRepository<Db>,
    SurrealAdminRepository<Db>,
    SurrealTenantCollectionStore<Db>,
>;

fn test_config() -> AuthConfig {
    AuthConfig::new("integration-test-secret", 60)
}

/// Spin up in-memory DB, run migrations and build the service.
async fn setup() -> (Service, Surreal<Db>) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    tenantry_db::run_migrations(&db).await.unwrap();

    let service = OrganizationService::new(
        SurrealOrganizationRepository::new(db.clone()),
        SurrealAdminRepository::new(db.clone()),
        SurrealTenantCollectionStore::new(db.clone()),
        test_config(),
    );
    (service, db)
}

async fn create(service: &Service, name: &str, email: &str) -> OrgView {
    service
        .create_organization(CreateOrganizationInput {
            organization_name: name.into(),
            email: email.into(),
            password: PASSWORD.into(),
        })
        .await
        .unwrap()
}

fn rename(name: &str, new_name: &str, email: &str, password: &str) -> UpdateOrganizationInput {
    UpdateOrganizationInput {
        organization_name: name.into(),
        new_organization_name: new_name.into(),
        email: email.into(),
        password: password.into(),
    }
}

async fn seed(db: &Surreal<Db>, collection: &str, n: i64) {
    for i in 0..n {
        db.query(format!("CREATE `{collection}` SET n = $n"))
            .bind(("n", i))
            .await
            .unwrap()
            .check()
            .unwrap();
    }
}

async fn numbers(db: &Surreal<Db>, collection: &str) -> Vec<i64> {
    let mut result = db
        .query(format!("SELECT VALUE n FROM `{collection}` ORDER BY n"))
        .await
        .unwrap();
    result.take(0).unwrap()
}

async fn record_ids(db: &Surreal<Db>, collection: &str) -> Vec<String> {
    let mut result = db
        .query(format!(
            "SELECT VALUE meta::id(id) FROM `{collection}` ORDER BY n"
        ))
        .await
        .unwrap();
    result.take(0).unwrap()
}

async fn admin_emails(db: &Surreal<Db>) -> Vec<String> {
    let mut result = db.query("SELECT VALUE email FROM admin").await.unwrap();
    result.take(0).unwrap()
}

fn collections(db: &Surreal<Db>) -> SurrealTenantCollectionStore<Db> {
    SurrealTenantCollectionStore::new(db.clone())
}

// -----------------------------------------------------------------------
// Create / get
// -----------------------------------------------------------------------

#[tokio::test]
async fn create_then_get_organization() {
    let (service, db) = setup().await;

    let created = create(&service, "Acme Corp", "Admin@Acme.io").await;
    assert_eq!(created.organization_name, "Acme Corp");
    assert_eq!(created.collection_name, "org_acme_corp");
    assert_eq!(created.admin_email, "admin@acme.io");

    let fetched = service.get_organization("Acme Corp").await.unwrap();
    assert_eq!(fetched, created);

    assert!(collections(&db).exists("org_acme_corp").await.unwrap());
    assert_eq!(collections(&db).count("org_acme_corp").await.unwrap(), 0);
}

#[tokio::test]
async fn creating_same_name_twice_conflicts() {
    let (service, db) = setup().await;
    create(&service, "Acme", "first@acme.io").await;

    let err = service
        .create_organization(CreateOrganizationInput {
            organization_name: "Acme".into(),
            email: "second@acme.io".into(),
            password: PASSWORD.into(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, TenantryError::Conflict { .. }), "got {err:?}");
    assert_eq!(admin_emails(&db).await, vec!["first@acme.io".to_string()]);
    assert!(collections(&db).exists("org_acme").await.unwrap());
}

#[tokio::test]
async fn colliding_collection_name_conflicts() {
    let (service, db) = setup().await;
    create(&service, "Acme Corp", "first@acme.io").await;

    let err = service
        .create_organization(CreateOrganizationInput {
            organization_name: "acme-corp".into(),
            email: "second@acme.io".into(),
            password: PASSWORD.into(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, TenantryError::Conflict { .. }), "got {err:?}");
    assert_eq!(admin_emails(&db).await.len(), 1);
}

#[tokio::test]
async fn reused_admin_email_conflicts_without_side_effects() {
    let (service, db) = setup().await;
    create(&service, "First", "shared@acme.io").await;

    let err = service
        .create_organization(CreateOrganizationInput {
            organization_name: "Second".into(),
            email: "SHARED@acme.io".into(),
            password: PASSWORD.into(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, TenantryError::Conflict { .. }), "got {err:?}");
    assert!(matches!(
        service.get_organization("Second").await,
        Err(TenantryError::NotFound { .. })
    ));
    assert!(!collections(&db).exists("org_second").await.unwrap());
}

#[tokio::test]
async fn invalid_input_is_rejected() {
    let (service, _db) = setup().await;

    for (name, email, password) in [
        ("", "a@acme.io", PASSWORD),
        ("???", "a@acme.io", PASSWORD),
        ("Acme", "not-an-email", PASSWORD),
        ("Acme", "a@acme.io", ""),
    ] {
        let err = service
            .create_organization(CreateOrganizationInput {
                organization_name: name.into(),
                email: email.into(),
                password: password.into(),
            })
            .await
            .unwrap_err();
        assert!(
            matches!(err, TenantryError::Validation { .. }),
            "{name:?}/{email:?}: got {err:?}"
        );
    }
}

#[tokio::test]
async fn get_unknown_organization_is_not_found() {
    let (service, _db) = setup().await;
    let err = service.get_organization("ghost").await.unwrap_err();
    assert!(matches!(err, TenantryError::NotFound { .. }));
}

#[tokio::test]
async fn get_with_missing_admin_uses_placeholder_email() {
    let (service, db) = setup().await;
    create(&service, "Orphan", "gone@acme.io").await;
    db.query("DELETE admin").await.unwrap().check().unwrap();

    let view = service.get_organization("Orphan").await.unwrap();
    assert_eq!(view.admin_email, ORPHANED_ADMIN_EMAIL);
}

// -----------------------------------------------------------------------
// Login
// -----------------------------------------------------------------------

#[tokio::test]
async fn login_yields_token_bound_to_created_org() {
    let (service, _db) = setup().await;
    let created = create(&service, "Acme", "admin@acme.io").await;

    let login = service.login("ADMIN@acme.io", PASSWORD).await.unwrap();
    assert_eq!(login.token_type, "bearer");
    assert_eq!(login.expires_in, 3600);

    match token::validate_access_token(&login.access_token, &test_config()) {
        TokenValidation::Valid(identity) => {
            assert_eq!(identity.org_id, created.id.to_string());
        }
        TokenValidation::Invalid => panic!("issued token should validate"),
    }

    let (admin, org) = service.authenticate(&login.access_token).await.unwrap();
    assert_eq!(org.id, created.id);
    assert_eq!(admin.email, "admin@acme.io");
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() {
    let (service, _db) = setup().await;
    create(&service, "Acme", "admin@acme.io").await;

    let err = service.login("admin@acme.io", "wrong").await.unwrap_err();
    assert!(matches!(err, TenantryError::Unauthorized { .. }));
}

#[tokio::test]
async fn login_with_unknown_email_is_unauthorized() {
    let (service, _db) = setup().await;
    let err = service.login("nobody@acme.io", PASSWORD).await.unwrap_err();
    assert!(matches!(err, TenantryError::Unauthorized { .. }));
}

#[tokio::test]
async fn login_for_admin_without_org_is_invalid_state() {
    let (service, db) = setup().await;
    SurrealAdminRepository::new(db.clone())
        .create(CreateAdmin {
            email: "loose@acme.io".into(),
            password_hash: tenantry_auth::password::hash_password(PASSWORD, None).unwrap(),
        })
        .await
        .unwrap();

    let err = service.login("loose@acme.io", PASSWORD).await.unwrap_err();
    assert!(matches!(err, TenantryError::InvalidState { .. }), "got {err:?}");
}

// -----------------------------------------------------------------------
// Update
// -----------------------------------------------------------------------

#[tokio::test]
async fn rename_moves_tenant_data() {
    let (service, db) = setup().await;
    let created = create(&service, "A", "admin@a.io").await;
    seed(&db, &created.collection_name, 6).await;

    let renamed = service
        .update_organization(rename("A", "B", "admin@a.io", PASSWORD))
        .await
        .unwrap();

    assert_eq!(renamed.id, created.id);
    assert_eq!(renamed.organization_name, "B");
    assert_eq!(renamed.collection_name, "org_b");
    assert_eq!(numbers(&db, "org_b").await, vec![0, 1, 2, 3, 4, 5]);
    assert!(!collections(&db).exists("org_a").await.unwrap());

    assert!(matches!(
        service.get_organization("A").await,
        Err(TenantryError::NotFound { .. })
    ));
    assert_eq!(service.get_organization("B").await.unwrap(), renamed);
}

#[tokio::test]
async fn noop_rename_leaves_collection_untouched() {
    let (service, db) = setup().await;
    let created = create(&service, "Same", "admin@same.io").await;
    seed(&db, &created.collection_name, 3).await;
    let ids_before = record_ids(&db, "org_same").await;

    let view = service
        .update_organization(rename("Same", "Same", "admin@same.io", PASSWORD))
        .await
        .unwrap();

    assert_eq!(view, created);
    assert_eq!(record_ids(&db, "org_same").await, ids_before);
}

#[tokio::test]
async fn noop_rename_still_checks_credentials() {
    let (service, _db) = setup().await;
    create(&service, "Same", "admin@same.io").await;

    let err = service
        .update_organization(rename("Same", "Same", "admin@same.io", "nope"))
        .await
        .unwrap_err();
    assert!(matches!(err, TenantryError::Unauthorized { .. }));
}

#[tokio::test]
async fn rename_with_same_slug_keeps_collection() {
    let (service, db) = setup().await;
    create(&service, "Acme Corp", "admin@acme.io").await;
    seed(&db, "org_acme_corp", 2).await;
    let ids_before = record_ids(&db, "org_acme_corp").await;

    let view = service
        .update_organization(rename("Acme Corp", "ACME corp", "admin@acme.io", PASSWORD))
        .await
        .unwrap();

    assert_eq!(view.organization_name, "ACME corp");
    assert_eq!(view.collection_name, "org_acme_corp");
    assert_eq!(record_ids(&db, "org_acme_corp").await, ids_before);
}

#[tokio::test]
async fn rename_requires_matching_admin() {
    let (service, db) = setup().await;
    create(&service, "Acme", "admin@acme.io").await;
    create(&service, "Other", "other@acme.io").await;
    seed(&db, "org_acme", 2).await;

    for input in [
        rename("Acme", "Renamed", "admin@acme.io", "wrong"),
        rename("Acme", "Renamed", "other@acme.io", PASSWORD),
    ] {
        let err = service.update_organization(input).await.unwrap_err();
        assert!(matches!(err, TenantryError::Unauthorized { .. }), "got {err:?}");
    }

    assert_eq!(numbers(&db, "org_acme").await, vec![0, 1]);
    assert!(!collections(&db).exists("org_renamed").await.unwrap());
}

#[tokio::test]
async fn rename_unknown_org_is_not_found() {
    let (service, _db) = setup().await;
    let err = service
        .update_organization(rename("Ghost", "Spirit", "a@b.io", PASSWORD))
        .await
        .unwrap_err();
    assert!(matches!(err, TenantryError::NotFound { .. }));
}

#[tokio::test]
async fn rename_into_taken_name_conflicts() {
    let (service, db) = setup().await;
    create(&service, "Acme", "admin@acme.io").await;
    create(&service, "Taken", "admin@taken.io").await;
    seed(&db, "org_acme", 2).await;

    let err = service
        .update_organization(rename("Acme", "Taken", "admin@acme.io", PASSWORD))
        .await
        .unwrap_err();

    assert!(matches!(err, TenantryError::Conflict { .. }));
    assert_eq!(numbers(&db, "org_acme").await, vec![0, 1]);
    assert_eq!(service.get_organization("Acme").await.unwrap().collection_name, "org_acme");
}

#[tokio::test]
async fn rename_into_taken_collection_conflicts() {
    let (service, db) = setup().await;
    create(&service, "Acme", "admin@acme.io").await;
    create(&service, "Big Co", "admin@big.io").await;

    let err = service
        .update_organization(rename("Acme", "big-co", "admin@acme.io", PASSWORD))
        .await
        .unwrap_err();

    assert!(matches!(err, TenantryError::Conflict { .. }));
    assert!(collections(&db).exists("org_acme").await.unwrap());
}

#[tokio::test]
async fn login_still_works_after_rename() {
    let (service, _db) = setup().await;
    let created = create(&service, "Before", "admin@before.io").await;
    service
        .update_organization(rename("Before", "After", "admin@before.io", PASSWORD))
        .await
        .unwrap();

    let login = service.login("admin@before.io", PASSWORD).await.unwrap();
    let (_, org) = service.authenticate(&login.access_token).await.unwrap();
    assert_eq!(org.id, created.id);
    assert_eq!(org.name, "After");
}

// -----------------------------------------------------------------------
// Delete
// -----------------------------------------------------------------------

#[tokio::test]
async fn delete_with_other_orgs_token_is_forbidden() {
    let (service, db) = setup().await;
    create(&service, "Alpha", "admin@alpha.io").await;
    let beta = create(&service, "Beta", "admin@beta.io").await;
    seed(&db, "org_beta", 3).await;

    let alpha_token = service
        .login("admin@alpha.io", PASSWORD)
        .await
        .unwrap()
        .access_token;

    let err = service
        .delete_organization("Beta", &alpha_token)
        .await
        .unwrap_err();
    assert!(matches!(err, TenantryError::Forbidden { .. }), "got {err:?}");

    assert_eq!(service.get_organization("Beta").await.unwrap(), beta);
    assert_eq!(numbers(&db, "org_beta").await, vec![0, 1, 2]);
    assert!(service.login("admin@beta.io", PASSWORD).await.is_ok());
}

#[tokio::test]
async fn delete_removes_org_admin_and_collection() {
    let (service, db) = setup().await;
    let created = create(&service, "Doomed", "admin@doomed.io").await;
    create(&service, "Survivor", "admin@survivor.io").await;
    seed(&db, "org_doomed", 4).await;

    let token = service
        .login("admin@doomed.io", PASSWORD)
        .await
        .unwrap()
        .access_token;
    service.delete_organization("Doomed", &token).await.unwrap();

    assert!(matches!(
        service.get_organization("Doomed").await,
        Err(TenantryError::NotFound { .. })
    ));
    assert!(!collections(&db).exists("org_doomed").await.unwrap());

    let mut result = db
        .query("SELECT VALUE email FROM admin WHERE org_id = $org_id")
        .bind(("org_id", created.id.to_string()))
        .await
        .unwrap();
    let remaining: Vec<String> = result.take(0).unwrap();
    assert!(remaining.is_empty());

    assert_eq!(admin_emails(&db).await, vec!["admin@survivor.io".to_string()]);
    assert!(service.get_organization("Survivor").await.is_ok());

    let err = service.login("admin@doomed.io", PASSWORD).await.unwrap_err();
    assert!(matches!(err, TenantryError::Unauthorized { .. }));
}

#[tokio::test]
async fn token_for_deleted_org_is_unauthorized() {
    let (service, _db) = setup().await;
    create(&service, "Once", "admin@once.io").await;
    let token = service
        .login("admin@once.io", PASSWORD)
        .await
        .unwrap()
        .access_token;
    service.delete_organization("Once", &token).await.unwrap();

    let err = service.delete_organization("Once", &token).await.unwrap_err();
    assert!(matches!(err, TenantryError::Unauthorized { .. }));
}

#[tokio::test]
async fn delete_with_invalid_token_is_unauthorized() {
    let (service, _db) = setup().await;
    create(&service, "Acme", "admin@acme.io").await;

    for bad in ["", "garbage", "a.b.c"] {
        let err = service.delete_organization("Acme", bad).await.unwrap_err();
        assert!(matches!(err, TenantryError::Unauthorized { .. }), "got {err:?}");
    }

    let foreign = token::issue_access_token(
        uuid::Uuid::new_v4(),
        uuid::Uuid::new_v4(),
        chrono::Duration::minutes(5),
        &AuthConfig::new("some-other-secret", 60),
    )
    .unwrap();
    let err = service
        .delete_organization("Acme", &foreign)
        .await
        .unwrap_err();
    assert!(matches!(err, TenantryError::Unauthorized { .. }));

    assert!(service.get_organization("Acme").await.is_ok());
}
