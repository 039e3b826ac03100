//! Principal resolver: verified credential in, persisted principal out.

use std::sync::Arc;

use tenancy_security::PrincipalId;
use tenant_access_sdk::{IdentityVerifier, Principal};

use super::error::DomainError;
use super::repo::PrincipalRepository;

const BEARER_PREFIX: &str = "Bearer ";

pub struct PrincipalResolver {
    verifier: Arc<dyn IdentityVerifier>,
    principals: Arc<dyn PrincipalRepository>,
}

impl PrincipalResolver {
    #[must_use]
    pub fn new(
        verifier: Arc<dyn IdentityVerifier>,
        principals: Arc<dyn PrincipalRepository>,
    ) -> Self {
        Self {
            verifier,
            principals,
        }
    }

    /// Verify `credential` and upsert the principal for its subject.
    ///
    /// Accepts the raw token or an `Authorization` header value.
    ///
    /// # Errors
    /// `Unauthenticated` for a missing, invalid or expired credential;
    /// `Database` if the upsert fails.
    pub async fn resolve(&self, credential: Option<&str>) -> Result<Principal, DomainError> {
        let token = credential
            .map(str::trim)
            .map(|c| c.strip_prefix(BEARER_PREFIX).unwrap_or(c).trim())
            .filter(|c| !c.is_empty())
            .ok_or(DomainError::Unauthenticated)?;

        let identity = self.verifier.verify(token).await.map_err(|e| {
            tracing::debug!(error = %e, "credential rejected");
            DomainError::Unauthenticated
        })?;
        if identity.subject.trim().is_empty() {
            tracing::debug!("credential carries no subject");
            return Err(DomainError::Unauthenticated);
        }

        let principal = self.principals.upsert(&identity).await?;
        tracing::debug!(principal_id = %principal.id, "principal resolved");
        Ok(principal)
    }

    /// Stored principal, without touching `last_login_at`.
    ///
    /// # Errors
    /// Returns `DomainError::Database` on storage failure.
    pub async fn find(&self, id: &PrincipalId) -> Result<Option<Principal>, DomainError> {
        self.principals.find(id).await
    }
}
