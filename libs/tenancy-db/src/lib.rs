#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Scoped `SeaORM` access for tenant-owned entities.
//!
//! Queries go through [`SecureSelect`] (writes through [`SecureUpdateMany`]
//! and [`SecureDeleteMany`]), which cannot execute until an
//! [`AccessScope`] has been applied. The scope is turned into one of the
//! [`QueryShape`] variants, picking the most specific index the entity
//! declares:
//!
//! ```rust,ignore
//! use tenancy_db::{SecureEntityExt, AccessScope};
//!
//! let scope = AccessScope::from(&granted);
//! let deposits = deposit::Entity::find()
//!     .secure()
//!     .scope_with(&scope)
//!     .all(db.conn())
//!     .await?;
//! ```

mod connect;
mod entity_traits;
mod error;
mod secure_conn;
mod select;
mod shape;
mod write;

pub use connect::{ConnectOpts, connect};
pub use entity_traits::ScopableEntity;
pub use error::{InfraError, ScopeError, TxError, is_unique_violation};
pub use secure_conn::{SecureConn, secure_insert, validate_organization_in_scope};
pub use select::{Scoped, SecureEntityExt, SecureSelect, Unscoped};
pub use shape::{QueryShape, build_scope_condition};
pub use write::{SecureDeleteExt, SecureDeleteMany, SecureUpdateExt, SecureUpdateMany};

pub use tenancy_security::AccessScope;
