use async_trait::async_trait;
use tenancy_security::{EstablishmentId, OrganizationId, PrincipalId, Role};
use tenant_access_sdk::{
    Establishment, Membership, Organization, Principal, ProvisionedTenant, VerifiedIdentity,
};

use super::error::DomainError;
use super::provisioning::TenantBlueprint;

#[async_trait]
pub trait PrincipalRepository: Send + Sync {
    /// Insert or refresh the principal keyed by the verified subject.
    async fn upsert(&self, identity: &VerifiedIdentity) -> Result<Principal, DomainError>;

    async fn find(&self, id: &PrincipalId) -> Result<Option<Principal>, DomainError>;
}

#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// Memberships in insertion order.
    async fn memberships_of(&self, principal: &PrincipalId)
    -> Result<Vec<Membership>, DomainError>;

    async fn organizations_of(
        &self,
        principal: &PrincipalId,
    ) -> Result<Vec<OrganizationId>, DomainError>;

    /// `None` when there is no link or its stored role is unreadable.
    async fn role_of(
        &self,
        principal: &PrincipalId,
        organization: &OrganizationId,
    ) -> Result<Option<Role>, DomainError>;

    /// Create the link unless one exists; the surviving row is returned.
    async fn link(
        &self,
        principal: &PrincipalId,
        organization: &OrganizationId,
        role: Role,
    ) -> Result<Membership, DomainError>;

    async fn unlink(
        &self,
        principal: &PrincipalId,
        organization: &OrganizationId,
    ) -> Result<bool, DomainError>;

    async fn set_role(
        &self,
        principal: &PrincipalId,
        organization: &OrganizationId,
        role: Role,
    ) -> Result<Option<Membership>, DomainError>;
}

#[async_trait]
pub trait TenantRepository: Send + Sync {
    async fn organizations(
        &self,
        ids: &[OrganizationId],
    ) -> Result<Vec<Organization>, DomainError>;

    /// Establishments of one organization in insertion order.
    async fn establishments_of(
        &self,
        organization: &OrganizationId,
    ) -> Result<Vec<Establishment>, DomainError>;

    /// Organization owning `establishment`, `None` when it does not exist.
    async fn establishment_owner(
        &self,
        establishment: &EstablishmentId,
    ) -> Result<Option<OrganizationId>, DomainError>;

    /// Write the whole tenant in one transaction.
    async fn provision(&self, blueprint: TenantBlueprint)
    -> Result<ProvisionedTenant, DomainError>;
}
