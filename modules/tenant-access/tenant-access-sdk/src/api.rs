//! Public API trait of the tenant-access module.

use async_trait::async_trait;

use crate::error::TenantAccessError;
use crate::models::{NewTenant, OrganizationAccess, Principal, ProvisionedTenant};
use tenancy_security::{AccessDecision, PrincipalId, Scope};

/// Entry points used by the CRUD/UI layer.
///
/// The guarded query/mutation wrappers take closures and are provided by the
/// module's gateway type directly; they are not part of this object-safe
/// trait.
#[async_trait]
pub trait TenantAccessClient: Send + Sync {
    /// Turn a session credential into a principal, creating it on first sight.
    ///
    /// # Errors
    ///
    /// - `Unauthenticated` if the credential is missing, invalid or expired
    async fn resolve_principal(
        &self,
        credential: Option<&str>,
    ) -> Result<Principal, TenantAccessError>;

    /// Evaluate the access rule for `scope`.
    ///
    /// A denial is a normal `Ok` result; errors are infrastructure failures.
    async fn decide(
        &self,
        principal: Option<&PrincipalId>,
        scope: &Scope,
    ) -> Result<AccessDecision, TenantAccessError>;

    /// Organizations the principal belongs to, each with its establishments.
    ///
    /// An empty result means the principal has no tenant yet and the caller
    /// should offer provisioning.
    async fn organizations_and_establishments_of(
        &self,
        principal: &PrincipalId,
    ) -> Result<Vec<OrganizationAccess>, TenantAccessError>;

    /// Create an organization, its default establishment and the owning
    /// membership in one transaction.
    ///
    /// # Errors
    ///
    /// - `Validation` for a blank display name or currency
    /// - `ProvisioningConflict` if a concurrent call took the same id
    async fn provision(
        &self,
        principal: &PrincipalId,
        request: NewTenant,
    ) -> Result<ProvisionedTenant, TenantAccessError>;
}
