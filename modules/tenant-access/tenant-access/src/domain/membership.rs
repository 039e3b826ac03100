//! Scope membership index: who belongs to which organization, with which role.

use std::sync::Arc;

use tenancy_security::{EstablishmentId, OrganizationId, PrincipalId, Role};
use tenant_access_sdk::{Establishment, Membership};

use super::error::DomainError;
use super::repo::{MembershipRepository, TenantRepository};

pub struct MembershipIndex {
    memberships: Arc<dyn MembershipRepository>,
    tenants: Arc<dyn TenantRepository>,
}

impl MembershipIndex {
    #[must_use]
    pub fn new(
        memberships: Arc<dyn MembershipRepository>,
        tenants: Arc<dyn TenantRepository>,
    ) -> Self {
        Self {
            memberships,
            tenants,
        }
    }

    /// # Errors
    /// Returns `DomainError::Database` on storage failure.
    pub async fn memberships_of(
        &self,
        principal: &PrincipalId,
    ) -> Result<Vec<Membership>, DomainError> {
        self.memberships.memberships_of(principal).await
    }

    /// # Errors
    /// Returns `DomainError::Database` on storage failure.
    pub async fn role_of(
        &self,
        principal: &PrincipalId,
        organization: &OrganizationId,
    ) -> Result<Option<Role>, DomainError> {
        self.memberships.role_of(principal, organization).await
    }

    /// The authorization allow-list of `principal`.
    ///
    /// # Errors
    /// Returns `DomainError::Database` on storage failure.
    pub async fn organizations_of(
        &self,
        principal: &PrincipalId,
    ) -> Result<Vec<OrganizationId>, DomainError> {
        self.memberships.organizations_of(principal).await
    }

    /// Idempotent: an existing link is returned unchanged, role included.
    ///
    /// # Errors
    /// Returns `DomainError::Database` on storage failure.
    #[tracing::instrument(
        skip(self, principal, organization),
        fields(principal_id = %principal, organization_id = %organization)
    )]
    pub async fn link(
        &self,
        principal: &PrincipalId,
        organization: &OrganizationId,
        role: Role,
    ) -> Result<Membership, DomainError> {
        let membership = self.memberships.link(principal, organization, role).await?;
        if membership.role != role {
            tracing::debug!(
                existing_role = %membership.role,
                "membership already present, role left unchanged"
            );
        }
        Ok(membership)
    }

    /// # Errors
    /// Returns `DomainError::Database` on storage failure.
    #[tracing::instrument(
        skip(self, principal, organization),
        fields(principal_id = %principal, organization_id = %organization)
    )]
    pub async fn unlink(
        &self,
        principal: &PrincipalId,
        organization: &OrganizationId,
    ) -> Result<bool, DomainError> {
        let removed = self.memberships.unlink(principal, organization).await?;
        if removed {
            tracing::info!("membership removed");
        }
        Ok(removed)
    }

    /// # Errors
    /// `NotFound` when the principal has no membership in `organization`.
    #[tracing::instrument(
        skip(self, principal, organization),
        fields(principal_id = %principal, organization_id = %organization)
    )]
    pub async fn set_role(
        &self,
        principal: &PrincipalId,
        organization: &OrganizationId,
        role: Role,
    ) -> Result<Membership, DomainError> {
        self.memberships
            .set_role(principal, organization, role)
            .await?
            .ok_or_else(|| {
                DomainError::NotFound(format!(
                    "membership of {principal} in {organization}"
                ))
            })
    }

    /// # Errors
    /// Returns `DomainError::Database` on storage failure.
    pub async fn establishments_of(
        &self,
        organization: &OrganizationId,
    ) -> Result<Vec<Establishment>, DomainError> {
        self.tenants.establishments_of(organization).await
    }

    /// # Errors
    /// Returns `DomainError::Database` on storage failure.
    pub async fn establishment_owner(
        &self,
        establishment: &EstablishmentId,
    ) -> Result<Option<OrganizationId>, DomainError> {
        self.tenants.establishment_owner(establishment).await
    }
}
