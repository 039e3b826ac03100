//! Storage layer: `SeaORM` entities, migrations and repository
//! implementations.
//!
//! Tenant-owned tables (`organizations`, `establishments`, `deposits`,
//! `units`) are read through `tenancy_db` scoped selects and written with
//! `secure_insert`. `principals` and `memberships` carry no tenant data of
//! their own and use the raw connection.

pub mod catalog;
pub mod entity;
pub mod mapper;
pub mod memberships_sea_repo;
pub mod migrations;
pub mod principals_sea_repo;
pub mod tenants_sea_repo;

#[cfg(test)]
mod mapper_test;

pub use memberships_sea_repo::SeaOrmMembershipRepository;
pub use principals_sea_repo::SeaOrmPrincipalRepository;
pub use tenants_sea_repo::SeaOrmTenantRepository;
