//! Tenant Access Module
//!
//! Multi-tenant access control core:
//!
//! - principal resolution from session credentials
//! - the membership index (principal, organization, role)
//! - per-request access decisions
//! - a gateway that forces the decided scope onto every tenant read/write
//! - first-login tenant provisioning
//!
//! [`TenantAccessModule`] wires everything from a [`TenantAccessConfig`] and
//! exposes the [`TenantAccessClient`](tenant_access_sdk::TenantAccessClient)
//! for in-process consumers.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod domain;
pub mod infra;
pub mod module;

pub use config::{ConfigError, TenantAccessConfig};
pub use module::TenantAccessModule;
