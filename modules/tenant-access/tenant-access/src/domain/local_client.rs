//! In-process client for the tenant-access module.

use std::sync::Arc;

use async_trait::async_trait;
use tenancy_security::{AccessDecision, PrincipalId, Scope};
use tenant_access_sdk::{
    NewTenant, OrganizationAccess, Principal, ProvisionedTenant, TenantAccessClient,
    TenantAccessError,
};

use super::{DomainError, Service};

pub struct TenantAccessLocalClient {
    svc: Arc<Service>,
}

impl TenantAccessLocalClient {
    #[must_use]
    pub fn new(svc: Arc<Service>) -> Self {
        Self { svc }
    }
}

fn log_and_convert(op: &str, e: DomainError) -> TenantAccessError {
    match &e {
        DomainError::Unauthenticated
        | DomainError::AccessDenied { .. }
        | DomainError::Validation { .. }
        | DomainError::NotFound(_) => {
            tracing::debug!(operation = op, error = %e, "tenant-access call rejected");
        }
        _ => tracing::error!(operation = op, error = ?e, "tenant-access call failed"),
    }
    e.into()
}

#[async_trait]
impl TenantAccessClient for TenantAccessLocalClient {
    async fn resolve_principal(
        &self,
        credential: Option<&str>,
    ) -> Result<Principal, TenantAccessError> {
        self.svc
            .resolve_principal(credential)
            .await
            .map_err(|e| log_and_convert("resolve_principal", e))
    }

    async fn decide(
        &self,
        principal: Option<&PrincipalId>,
        scope: &Scope,
    ) -> Result<AccessDecision, TenantAccessError> {
        self.svc
            .decide(principal, scope)
            .await
            .map_err(|e| log_and_convert("decide", e))
    }

    async fn organizations_and_establishments_of(
        &self,
        principal: &PrincipalId,
    ) -> Result<Vec<OrganizationAccess>, TenantAccessError> {
        self.svc
            .organizations_and_establishments_of(principal)
            .await
            .map_err(|e| log_and_convert("organizations_and_establishments_of", e))
    }

    async fn provision(
        &self,
        principal: &PrincipalId,
        request: NewTenant,
    ) -> Result<ProvisionedTenant, TenantAccessError> {
        self.svc
            .provision(principal, request)
            .await
            .map_err(|e| log_and_convert("provision", e))
    }
}
