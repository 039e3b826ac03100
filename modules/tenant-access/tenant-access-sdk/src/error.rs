//! Error types for the tenant-access module.

use thiserror::Error;

use tenancy_security::{DenyReason, OrganizationId, PrincipalId};

#[derive(Debug, Error)]
pub enum TenantAccessError {
    /// No valid principal could be resolved from the credential.
    #[error("unauthenticated")]
    Unauthenticated,

    #[error("access to organization {organization_id} denied: {reason}")]
    AccessDenied {
        principal_id: Option<PrincipalId>,
        organization_id: OrganizationId,
        reason: DenyReason,
    },

    /// A concurrent write took the same id or reference. Safe to retry.
    #[error("provisioning conflict: {0}")]
    ProvisioningConflict(String),

    #[error("validation error on `{field}`: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl TenantAccessError {
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ProvisioningConflict(_))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn only_conflicts_are_retryable() {
        assert!(TenantAccessError::ProvisioningConflict("org-a".to_owned()).is_retryable());
        assert!(!TenantAccessError::Unauthenticated.is_retryable());
        assert!(!TenantAccessError::Internal("db".to_owned()).is_retryable());
    }

    #[test]
    fn access_denied_message_carries_reason() {
        let err = TenantAccessError::AccessDenied {
            principal_id: Some(PrincipalId::new("u1")),
            organization_id: OrganizationId::new("org-other"),
            reason: DenyReason::NoOrganizationAccess,
        };
        assert_eq!(
            err.to_string(),
            "access to organization org-other denied: no access to organization"
        );
    }
}
