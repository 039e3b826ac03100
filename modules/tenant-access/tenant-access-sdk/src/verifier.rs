//! Identity verification collaborator.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::VerifiedIdentity;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("invalid credential: {0}")]
    InvalidCredential(String),

    #[error("credential expired")]
    Expired,
}

/// Checks a raw session credential (signature, expiry) and extracts the
/// subject and profile claims.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, credential: &str) -> Result<VerifiedIdentity, IdentityError>;
}
