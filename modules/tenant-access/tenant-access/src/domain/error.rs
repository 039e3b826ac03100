use sea_orm::DbErr;
use tenancy_db::{InfraError, ScopeError, is_unique_violation};
use tenancy_security::{DenyReason, OrganizationId, PrincipalId};
use tenant_access_sdk::TenantAccessError;

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("unauthenticated")]
    Unauthenticated,

    #[error("access to organization {organization_id} denied: {reason}")]
    AccessDenied {
        principal_id: Option<PrincipalId>,
        organization_id: OrganizationId,
        reason: DenyReason,
    },

    /// A unique index rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("validation error on field '{field}': {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("not found: {0}")]
    NotFound(String),

    /// A write named an owner outside the granted scope.
    #[error("scope violation: {0}")]
    ScopeViolation(&'static str),

    #[error("database error: {0}")]
    Database(String),
}

impl DomainError {
    #[must_use]
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn from_infra(err: InfraError) -> Self {
        if err.is_unique_violation() {
            Self::Conflict(err.into_message())
        } else {
            Self::Database(err.into_message())
        }
    }
}

impl From<DbErr> for DomainError {
    fn from(err: DbErr) -> Self {
        if is_unique_violation(&err) {
            Self::Conflict(err.to_string())
        } else {
            Self::Database(err.to_string())
        }
    }
}

impl From<ScopeError> for DomainError {
    fn from(err: ScopeError) -> Self {
        match err {
            ScopeError::Db(db) => db.into(),
            ScopeError::Invalid(msg) | ScopeError::Denied(msg) => Self::ScopeViolation(msg),
        }
    }
}

impl From<DomainError> for TenantAccessError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Unauthenticated => Self::Unauthenticated,
            DomainError::AccessDenied {
                principal_id,
                organization_id,
                reason,
            } => Self::AccessDenied {
                principal_id,
                organization_id,
                reason,
            },
            DomainError::Conflict(msg) => Self::ProvisioningConflict(msg),
            DomainError::Validation { field, message } => Self::Validation { field, message },
            DomainError::NotFound(what) => Self::NotFound(what),
            DomainError::ScopeViolation(msg) => Self::Internal(format!("scope violation: {msg}")),
            DomainError::Database(msg) => Self::Internal(msg),
        }
    }
}
