//! Tenant Access SDK
//!
//! Public contract of the `tenant-access` module:
//!
//! - [`TenantAccessClient`] - API trait for consumers
//! - [`IdentityVerifier`] - collaborator that checks raw credentials
//! - [`Principal`], [`Organization`], [`Establishment`], [`Membership`] - models
//! - [`TenantAccessError`] - error type
//!
//! ## Usage
//!
//! ```ignore
//! use tenant_access_sdk::{NewTenant, Scope, TenantAccessClient};
//!
//! let principal = client.resolve_principal(Some(token)).await?;
//!
//! let orgs = client.organizations_and_establishments_of(&principal.id).await?;
//! if orgs.is_empty() {
//!     client
//!         .provision(&principal.id, NewTenant::new("Acme Corp", "USD"))
//!         .await?;
//! }
//!
//! let decision = client
//!     .decide(Some(&principal.id), &Scope::organization("org-acme-corp"))
//!     .await?;
//! ```

pub mod api;
pub mod error;
pub mod models;
pub mod verifier;

pub use api::TenantAccessClient;
pub use error::TenantAccessError;
pub use models::{
    Establishment, Membership, NewTenant, Organization, OrganizationAccess, Principal,
    ProfileClaims, ProvisionedTenant, VerifiedIdentity,
};
pub use verifier::{IdentityError, IdentityVerifier};

pub use tenancy_security::{
    AccessDecision, DenyReason, EstablishmentId, GrantedScope, OrganizationId, PrincipalId, Role,
    Scope,
};
