//! Access decision engine.
//!
//! Reads the principal's memberships and applies
//! [`AccessDecision::evaluate`]. Nothing is cached: every call sees the
//! membership state of that moment.

use std::sync::Arc;

use tenancy_security::{AccessDecision, MembershipSnapshot, PrincipalId, Scope};

use super::error::DomainError;
use super::membership::MembershipIndex;

pub struct AccessDecisionEngine {
    index: Arc<MembershipIndex>,
}

impl AccessDecisionEngine {
    #[must_use]
    pub fn new(index: Arc<MembershipIndex>) -> Self {
        Self { index }
    }

    /// Decide whether `principal` may operate on `scope`.
    ///
    /// Denials are returned as `Ok(AccessDecision::Denied(..))` and logged
    /// with the principal and organization for audit.
    ///
    /// # Errors
    /// Returns `DomainError::Database` if memberships cannot be read.
    pub async fn decide(
        &self,
        principal: Option<&PrincipalId>,
        scope: &Scope,
    ) -> Result<AccessDecision, DomainError> {
        let snapshot = match principal {
            Some(principal_id) => self.snapshot(principal_id, scope).await?,
            None => MembershipSnapshot::default(),
        };

        let decision = AccessDecision::evaluate(principal, scope, &snapshot);
        match &decision {
            AccessDecision::Denied(reason) => {
                tracing::warn!(
                    principal_id = principal.map(PrincipalId::as_str),
                    organization_id = %scope.organization_id,
                    reason = %reason,
                    "access denied"
                );
            }
            AccessDecision::Allowed(granted) => {
                tracing::trace!(
                    principal_id = %granted.principal_id(),
                    organization_id = %granted.organization_id(),
                    role = %granted.role(),
                    "access allowed"
                );
            }
        }
        Ok(decision)
    }

    async fn snapshot(
        &self,
        principal: &PrincipalId,
        scope: &Scope,
    ) -> Result<MembershipSnapshot, DomainError> {
        let organizations = self.index.organizations_of(principal).await?;
        if !organizations.contains(&scope.organization_id) {
            return Ok(MembershipSnapshot {
                organizations,
                ..MembershipSnapshot::default()
            });
        }
        let roles = self
            .index
            .role_of(principal, &scope.organization_id)
            .await?
            .map(|role| vec![(scope.organization_id.clone(), role)])
            .unwrap_or_default();
        let establishment_owner = match &scope.establishment_id {
            Some(establishment) => self.index.establishment_owner(establishment).await?,
            None => None,
        };
        Ok(MembershipSnapshot {
            organizations,
            roles,
            establishment_owner,
        })
    }
}
