#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Membership index and access decisions against `SQLite`.

mod support;

use support::{module, provision, raw_membership};
use tenant_access::domain::DomainError;
use tenant_access_sdk::{AccessDecision, DenyReason, OrganizationId, PrincipalId, Role, Scope};

#[tokio::test]
async fn link_is_idempotent_and_keeps_the_first_role() {
    let module = module().await;
    provision(&module, "u1", "Acme Corp").await;
    let service = module.service();
    let u2 = PrincipalId::new("u2");
    let org = OrganizationId::new("org-acme-corp");

    let first = service.link(&u2, &org, Role::User).await.unwrap();
    let again = service.link(&u2, &org, Role::User).await.unwrap();
    let upgraded = service.link(&u2, &org, Role::SuperAdmin).await.unwrap();

    assert_eq!(first.role, Role::User);
    assert_eq!(again, first);
    assert_eq!(upgraded.role, Role::User);
    assert_eq!(service.memberships_of(&u2).await.unwrap().len(), 1);
}

#[tokio::test]
async fn concurrent_links_produce_one_membership() {
    let module = module().await;
    provision(&module, "u1", "Acme Corp").await;
    let service = module.service();
    let u2 = PrincipalId::new("u2");
    let org = OrganizationId::new("org-acme-corp");

    let (a, b) = tokio::join!(
        service.link(&u2, &org, Role::Manager),
        service.link(&u2, &org, Role::User),
    );

    assert_eq!(a.unwrap().role, b.unwrap().role);
    assert_eq!(service.memberships_of(&u2).await.unwrap().len(), 1);
}

#[tokio::test]
async fn decisions_track_link_role_change_and_unlink() {
    let module = module().await;
    provision(&module, "u1", "Acme Corp").await;
    let service = module.service();
    let u2 = PrincipalId::new("u2");
    let org = OrganizationId::new("org-acme-corp");
    let scope = Scope::establishment("org-acme-corp", "etb-acme-corp");

    assert_eq!(
        service.decide(Some(&u2), &scope).await.unwrap(),
        AccessDecision::Denied(DenyReason::NoOrganizationAccess)
    );

    service.link(&u2, &org, Role::User).await.unwrap();
    assert_eq!(
        service.decide(Some(&u2), &scope).await.unwrap().role(),
        Some(Role::User)
    );

    let changed = service.set_role(&u2, &org, Role::Manager).await.unwrap();
    assert_eq!(changed.role, Role::Manager);
    assert_eq!(
        service.decide(Some(&u2), &scope).await.unwrap().role(),
        Some(Role::Manager)
    );

    assert!(service.unlink(&u2, &org).await.unwrap());
    assert!(!service.unlink(&u2, &org).await.unwrap());
    assert_eq!(
        service.decide(Some(&u2), &scope).await.unwrap().deny_reason(),
        Some(DenyReason::NoOrganizationAccess)
    );
}

#[tokio::test]
async fn set_role_without_membership_is_not_found() {
    let module = module().await;
    provision(&module, "u1", "Acme Corp").await;

    let err = module
        .service()
        .set_role(
            &PrincipalId::new("u2"),
            &OrganizationId::new("org-acme-corp"),
            Role::Manager,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::NotFound(_)));
}

#[tokio::test]
async fn unauthenticated_caller_is_denied() {
    let module = module().await;
    provision(&module, "u1", "Acme Corp").await;

    let decision = module
        .service()
        .decide(None, &Scope::organization("org-acme-corp"))
        .await
        .unwrap();

    assert_eq!(decision, AccessDecision::Denied(DenyReason::NotAuthenticated));
}

#[tokio::test]
async fn unreadable_stored_role_denies_with_no_role() {
    let module = module().await;
    provision(&module, "u1", "Acme Corp").await;
    raw_membership(&module, "u2", "org-acme-corp", "OWNER").await;
    let u2 = PrincipalId::new("u2");

    let decision = module
        .service()
        .decide(Some(&u2), &Scope::organization("org-acme-corp"))
        .await
        .unwrap();
    assert_eq!(decision, AccessDecision::Denied(DenyReason::NoRole));

    // The broken row is not offered in the bootstrap read model either.
    let access = module
        .service()
        .organizations_and_establishments_of(&u2)
        .await
        .unwrap();
    assert!(access.is_empty());
}

#[tokio::test]
async fn memberships_keep_insertion_order() {
    let module = module().await;
    provision(&module, "u1", "Zeta").await;
    provision(&module, "u1", "Alpha").await;
    provision(&module, "u2", "Beta").await;
    let u1 = PrincipalId::new("u1");
    module
        .service()
        .link(&u1, &OrganizationId::new("org-beta"), Role::User)
        .await
        .unwrap();

    let memberships = module.service().memberships_of(&u1).await.unwrap();
    let orgs: Vec<&str> = memberships
        .iter()
        .map(|m| m.organization_id.as_str())
        .collect();
    assert_eq!(orgs, vec!["org-zeta", "org-alpha", "org-beta"]);

    let access = module
        .service()
        .organizations_and_establishments_of(&u1)
        .await
        .unwrap();
    let roles: Vec<(&str, Role)> = access
        .iter()
        .map(|a| (a.organization.id.as_str(), a.role))
        .collect();
    assert_eq!(
        roles,
        vec![
            ("org-zeta", Role::SuperAdmin),
            ("org-alpha", Role::SuperAdmin),
            ("org-beta", Role::User),
        ]
    );
    assert!(access.iter().all(|a| a.establishments.len() == 1));
}

#[tokio::test]
async fn establishments_of_lists_the_organization_only() {
    let module = module().await;
    provision(&module, "u1", "Acme Corp").await;
    provision(&module, "u2", "Globex").await;

    let establishments = module
        .service()
        .establishments_of(&OrganizationId::new("org-globex"))
        .await
        .unwrap();

    assert_eq!(establishments.len(), 1);
    assert_eq!(establishments[0].id, "etb-globex");
    assert!(establishments[0].is_default);
}
