#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Value types shared by every layer that touches tenant-owned data.
//!
//! The central rule lives in [`AccessDecision::evaluate`]: a requested
//! [`Scope`] is turned into a [`GrantedScope`] only when the principal holds a
//! membership with a role in the requested organization. Data access APIs take
//! a `GrantedScope` (or an [`AccessScope`] derived from one), so a scope that
//! was never checked cannot reach a query.

pub mod access_scope;
pub mod decision;
pub mod ids;
pub mod owned;
pub mod role;

pub use access_scope::AccessScope;
pub use decision::{AccessDecision, DenyReason, GrantedScope, MembershipSnapshot, Scope};
pub use ids::{EstablishmentId, OrganizationId, PrincipalId};
pub use owned::{OrganizationOwned, retain_owned_by};
pub use role::{Role, UnknownRole};
