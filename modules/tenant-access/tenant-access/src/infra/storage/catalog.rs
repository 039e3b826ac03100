//! Scoped readers over tenant-owned catalog rows.
//!
//! Meant to be called from inside the gateway's guarded query or mutation;
//! each takes the [`GrantedScope`] the gateway hands out, so the filter
//! always matches the access decision. `conn` is either the pool or the
//! open transaction.

use sea_orm::{ColumnTrait, ConnectionTrait, Order};
use tenancy_db::{AccessScope, ScopableEntity, SecureEntityExt};
use tenancy_security::{GrantedScope, OrganizationOwned};

use super::entity::{deposit, establishment, unit};
use crate::domain::error::DomainError;

async fn scoped_rows<E, C>(
    conn: &C,
    granted: &GrantedScope,
    order: E::Column,
) -> Result<Vec<E::Model>, DomainError>
where
    E: ScopableEntity,
    E::Column: ColumnTrait + Copy,
    E::Model: OrganizationOwned,
    C: ConnectionTrait + Send + Sync,
{
    let scope = AccessScope::from(granted);
    Ok(E::find()
        .secure()
        .scope_with(&scope)
        .order_by(order, Order::Asc)
        .all(conn)
        .await?)
}

/// Establishments visible under `granted`: the named one, or all of the
/// organization when no establishment was requested.
///
/// # Errors
/// Returns `DomainError::Database` on storage failure.
pub async fn establishments_in_scope<C>(
    conn: &C,
    granted: &GrantedScope,
) -> Result<Vec<establishment::Model>, DomainError>
where
    C: ConnectionTrait + Send + Sync,
{
    scoped_rows::<establishment::Entity, _>(conn, granted, establishment::Column::CreatedAt).await
}

/// # Errors
/// Returns `DomainError::Database` on storage failure.
pub async fn deposits_in_scope<C>(
    conn: &C,
    granted: &GrantedScope,
) -> Result<Vec<deposit::Model>, DomainError>
where
    C: ConnectionTrait + Send + Sync,
{
    scoped_rows::<deposit::Entity, _>(conn, granted, deposit::Column::Reference).await
}

/// # Errors
/// Returns `DomainError::Database` on storage failure.
pub async fn units_in_scope<C>(
    conn: &C,
    granted: &GrantedScope,
) -> Result<Vec<unit::Model>, DomainError>
where
    C: ConnectionTrait + Send + Sync,
{
    scoped_rows::<unit::Entity, _>(conn, granted, unit::Column::Reference).await
}
