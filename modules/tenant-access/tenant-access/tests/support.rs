#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Shared helpers for tenant-access integration tests.
//!
//! Every test gets its own in-memory `SQLite` database with the module's
//! migrations applied.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use sea_orm::ActiveModelTrait;
use sea_orm::ActiveValue::{NotSet, Set};
use serde_json::json;
use tenant_access::TenantAccessConfig;
use tenant_access::TenantAccessModule;
use tenant_access::domain::IdGenerator;
use tenant_access::infra::jwt::JwtIdentityVerifier;
use tenant_access::infra::storage::entity::{deposit, establishment, membership};
use tenant_access_sdk::{NewTenant, PrincipalId, ProvisionedTenant};

pub const SECRET: &str = "integration-secret";

#[must_use]
pub fn config() -> TenantAccessConfig {
    let mut config = TenantAccessConfig::default();
    config.identity.secret = SECRET.to_owned();
    config
}

pub async fn module() -> TenantAccessModule {
    TenantAccessModule::init(&config()).await.unwrap()
}

/// Module whose random suffixes always come out as `fixed`.
pub async fn module_with_fixed_ids() -> TenantAccessModule {
    let config = config();
    let verifier = JwtIdentityVerifier::hs256(SECRET.as_bytes(), None, 0);
    TenantAccessModule::init_with(&config, Arc::new(verifier), Arc::new(FixedIds))
        .await
        .unwrap()
}

pub struct FixedIds;

impl IdGenerator for FixedIds {
    fn generate(&self) -> String {
        "fixed".to_owned()
    }
}

/// Session token for `sub` carrying `claims` on top, valid for an hour.
#[must_use]
pub fn token(sub: &str, claims: &serde_json::Value) -> String {
    let mut body = json!({ "sub": sub, "exp": Utc::now().timestamp() + 3600 });
    if let (Some(body), Some(extra)) = (body.as_object_mut(), claims.as_object()) {
        for (k, v) in extra {
            body.insert(k.clone(), v.clone());
        }
    }
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &body,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

pub async fn provision(
    module: &TenantAccessModule,
    principal: &str,
    name: &str,
) -> ProvisionedTenant {
    module
        .service()
        .provision(&PrincipalId::new(principal), NewTenant::new(name, "USD"))
        .await
        .unwrap()
}

/// Add a non-default establishment to an existing organization.
pub async fn add_establishment(module: &TenantAccessModule, organization_id: &str, id: &str) {
    establishment::ActiveModel {
        id: Set(id.to_owned()),
        organization_id: Set(organization_id.to_owned()),
        reference: Set(id.to_uppercase()),
        designation: Set(format!("Branch {id}")),
        currency_id: Set("USD".to_owned()),
        slogan: Set(None),
        logo: Set(None),
        domain: Set("BUSINESS".to_owned()),
        is_default: Set(false),
        is_hidden: Set(false),
        created_at: Set(Utc::now()),
    }
    .insert(module.db().conn())
    .await
    .unwrap();
}

pub async fn add_deposit(
    module: &TenantAccessModule,
    organization_id: &str,
    establishment_id: &str,
    id: &str,
) {
    deposit::ActiveModel {
        id: Set(id.to_owned()),
        organization_id: Set(organization_id.to_owned()),
        establishment_id: Set(establishment_id.to_owned()),
        reference: Set(id.to_uppercase()),
        designation: Set(format!("Deposit {id}")),
        deposit_type: Set("STORE".to_owned()),
        is_default: Set(false),
        created_at: Set(Utc::now()),
    }
    .insert(module.db().conn())
    .await
    .unwrap();
}

/// Write a membership row bypassing the index, e.g. with an unknown role.
pub async fn raw_membership(
    module: &TenantAccessModule,
    principal: &str,
    organization_id: &str,
    role: &str,
) {
    membership::ActiveModel {
        id: NotSet,
        principal_id: Set(principal.to_owned()),
        organization_id: Set(organization_id.to_owned()),
        role: Set(role.to_owned()),
        created_at: Set(Utc::now()),
    }
    .insert(module.db().conn())
    .await
    .unwrap();
}
