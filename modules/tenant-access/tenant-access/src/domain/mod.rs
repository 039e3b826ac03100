//! Domain layer for tenant access.

pub mod decision;
pub mod error;
pub mod gateway;
pub mod ids;
pub mod local_client;
pub mod membership;
pub mod principal;
pub mod provisioning;
pub mod repo;
pub mod service;
pub mod slug;

#[cfg(test)]
mod decision_test;

pub use decision::AccessDecisionEngine;
pub use error::DomainError;
pub use gateway::{BoxedTxFuture, ScopeGateway};
pub use ids::{IdGenerator, NanoIdGenerator};
pub use local_client::TenantAccessLocalClient;
pub use membership::MembershipIndex;
pub use principal::PrincipalResolver;
pub use provisioning::{DefaultResource, ProvisioningWorkflow, TenantBlueprint};
pub use service::{Service, ServiceDeps};
