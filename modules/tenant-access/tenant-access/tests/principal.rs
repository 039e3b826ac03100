#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Principal resolution from signed session tokens.

mod support;

use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::json;
use support::{module, token};
use tenancy_security::PrincipalId;
use tenant_access::infra::storage::entity::principal;
use tenant_access_sdk::{TenantAccessError, TenantAccessClient};

#[tokio::test]
async fn first_login_creates_the_principal() {
    let module = module().await;
    let credential = token(
        "u1",
        &json!({
            "email": "ada@example.com",
            "given_name": "Ada",
            "family_name": "Lovelace",
        }),
    );

    let principal = module
        .client()
        .resolve_principal(Some(&format!("Bearer {credential}")))
        .await
        .unwrap();

    assert_eq!(principal.id, "u1");
    assert_eq!(principal.email.as_deref(), Some("ada@example.com"));
    assert_eq!(principal.first_name.as_deref(), Some("Ada"));
    assert_eq!(principal.last_name.as_deref(), Some("Lovelace"));
}

#[tokio::test]
async fn later_logins_refresh_present_claims_only() {
    let module = module().await;
    let client = module.client();
    client
        .resolve_principal(Some(&token(
            "u1",
            &json!({ "email": "ada@example.com", "given_name": "Ada" }),
        )))
        .await
        .unwrap();

    let refreshed = client
        .resolve_principal(Some(&token(
            "u1",
            &json!({ "user": { "id": "ignored", "picture": "https://img.example/ada.png" },
                     "email": "ada@new.example" }),
        )))
        .await
        .unwrap();

    assert_eq!(refreshed.email.as_deref(), Some("ada@new.example"));
    assert_eq!(refreshed.first_name.as_deref(), Some("Ada"));
    assert_eq!(
        refreshed.picture.as_deref(),
        Some("https://img.example/ada.png")
    );

    let stored = module
        .service()
        .principal(&PrincipalId::new("u1"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored, refreshed);

    let rows = principal::Entity::find()
        .count(module.db().conn())
        .await
        .unwrap();
    assert_eq!(rows, 1);
}

#[tokio::test]
async fn concurrent_first_logins_create_one_principal() {
    let module = module().await;
    let client = module.client();
    let a = token("u1", &json!({ "email": "a@example.com" }));
    let b = token("u1", &json!({ "email": "b@example.com" }));

    let (first, second) = tokio::join!(
        client.resolve_principal(Some(&a)),
        client.resolve_principal(Some(&b)),
    );

    assert_eq!(first.unwrap().id, second.unwrap().id);
    let rows = principal::Entity::find()
        .count(module.db().conn())
        .await
        .unwrap();
    assert_eq!(rows, 1);
}

#[tokio::test]
async fn bad_credentials_are_unauthenticated() {
    let module = module().await;
    let client = module.client();

    for credential in [None, Some(""), Some("not-a-jwt")] {
        let err = client.resolve_principal(credential).await.unwrap_err();
        assert!(matches!(err, TenantAccessError::Unauthenticated), "{err}");
    }

    let rows = principal::Entity::find()
        .count(module.db().conn())
        .await
        .unwrap();
    assert_eq!(rows, 0);
}
