//! Module facade over the resolver, index, decision engine and provisioning.

use std::sync::Arc;

use tenancy_db::SecureConn;
use tenancy_security::{AccessDecision, OrganizationId, PrincipalId, Role, Scope};
use tenant_access_sdk::{
    Establishment, IdentityVerifier, Membership, NewTenant, OrganizationAccess, Principal,
    ProvisionedTenant,
};

use super::decision::AccessDecisionEngine;
use super::error::DomainError;
use super::gateway::ScopeGateway;
use super::ids::IdGenerator;
use super::membership::MembershipIndex;
use super::principal::PrincipalResolver;
use super::provisioning::ProvisioningWorkflow;
use super::repo::{MembershipRepository, PrincipalRepository, TenantRepository};
use crate::config::ProvisioningConfig;

/// Storage and collaborators the service is wired from.
pub struct ServiceDeps {
    pub verifier: Arc<dyn IdentityVerifier>,
    pub principals: Arc<dyn PrincipalRepository>,
    pub memberships: Arc<dyn MembershipRepository>,
    pub tenants: Arc<dyn TenantRepository>,
    pub ids: Arc<dyn IdGenerator>,
    pub db: SecureConn,
}

pub struct Service {
    resolver: PrincipalResolver,
    index: Arc<MembershipIndex>,
    engine: Arc<AccessDecisionEngine>,
    gateway: ScopeGateway,
    provisioning: ProvisioningWorkflow,
    tenants: Arc<dyn TenantRepository>,
}

impl Service {
    #[must_use]
    pub fn new(deps: ServiceDeps, naming: ProvisioningConfig) -> Self {
        let index = Arc::new(MembershipIndex::new(
            deps.memberships,
            Arc::clone(&deps.tenants),
        ));
        let engine = Arc::new(AccessDecisionEngine::new(Arc::clone(&index)));
        let gateway = ScopeGateway::new(Arc::clone(&engine), Arc::clone(&index), deps.db);
        let provisioning =
            ProvisioningWorkflow::new(Arc::clone(&deps.tenants), deps.ids, naming);

        Self {
            resolver: PrincipalResolver::new(deps.verifier, deps.principals),
            index,
            engine,
            gateway,
            provisioning,
            tenants: deps.tenants,
        }
    }

    /// # Errors
    /// See [`PrincipalResolver::resolve`].
    pub async fn resolve_principal(
        &self,
        credential: Option<&str>,
    ) -> Result<Principal, DomainError> {
        self.resolver.resolve(credential).await
    }

    /// # Errors
    /// Returns `DomainError::Database` on storage failure.
    pub async fn principal(&self, id: &PrincipalId) -> Result<Option<Principal>, DomainError> {
        self.resolver.find(id).await
    }

    /// # Errors
    /// Storage failures only; denials are `Ok`.
    pub async fn decide(
        &self,
        principal: Option<&PrincipalId>,
        scope: &Scope,
    ) -> Result<AccessDecision, DomainError> {
        self.engine.decide(principal, scope).await
    }

    /// Login/bootstrap read model, in membership order.
    ///
    /// Memberships whose organization row is missing are skipped.
    ///
    /// # Errors
    /// Returns `DomainError::Database` on storage failure.
    pub async fn organizations_and_establishments_of(
        &self,
        principal: &PrincipalId,
    ) -> Result<Vec<OrganizationAccess>, DomainError> {
        let memberships = self.index.memberships_of(principal).await?;
        if memberships.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<OrganizationId> = memberships
            .iter()
            .map(|m| m.organization_id.clone())
            .collect();
        let mut organizations = self.tenants.organizations(&ids).await?;

        let mut out = Vec::with_capacity(memberships.len());
        for membership in memberships {
            let Some(pos) = organizations
                .iter()
                .position(|o| o.id == membership.organization_id)
            else {
                tracing::warn!(
                    organization_id = %membership.organization_id,
                    "membership points at a missing organization"
                );
                continue;
            };
            let organization = organizations.swap_remove(pos);
            let establishments = self.index.establishments_of(&organization.id).await?;
            out.push(OrganizationAccess {
                organization,
                role: membership.role,
                establishments,
            });
        }
        Ok(out)
    }

    /// # Errors
    /// See [`ProvisioningWorkflow::provision`].
    pub async fn provision(
        &self,
        principal: &PrincipalId,
        request: NewTenant,
    ) -> Result<ProvisionedTenant, DomainError> {
        self.provisioning.provision(principal, request).await
    }

    /// # Errors
    /// Returns `DomainError::Database` on storage failure.
    pub async fn memberships_of(
        &self,
        principal: &PrincipalId,
    ) -> Result<Vec<Membership>, DomainError> {
        self.index.memberships_of(principal).await
    }

    /// # Errors
    /// Returns `DomainError::Database` on storage failure.
    pub async fn link(
        &self,
        principal: &PrincipalId,
        organization: &OrganizationId,
        role: Role,
    ) -> Result<Membership, DomainError> {
        self.index.link(principal, organization, role).await
    }

    /// # Errors
    /// Returns `DomainError::Database` on storage failure.
    pub async fn unlink(
        &self,
        principal: &PrincipalId,
        organization: &OrganizationId,
    ) -> Result<bool, DomainError> {
        self.index.unlink(principal, organization).await
    }

    /// # Errors
    /// `NotFound` when there is no membership to update.
    pub async fn set_role(
        &self,
        principal: &PrincipalId,
        organization: &OrganizationId,
        role: Role,
    ) -> Result<Membership, DomainError> {
        self.index.set_role(principal, organization, role).await
    }

    /// # Errors
    /// Returns `DomainError::Database` on storage failure.
    pub async fn establishments_of(
        &self,
        organization: &OrganizationId,
    ) -> Result<Vec<Establishment>, DomainError> {
        self.index.establishments_of(organization).await
    }

    #[must_use]
    pub fn gateway(&self) -> &ScopeGateway {
        &self.gateway
    }
}
