//! Scoped bulk writes.
//!
//! `UpdateMany` and `DeleteMany` get the same typestate treatment as selects:
//! they cannot run before `.scope_with()` has added the owner filter.

use std::marker::PhantomData;

use sea_orm::sea_query::{Expr, IntoIden, SimpleExpr};
use sea_orm::{ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter};

use crate::entity_traits::ScopableEntity;
use crate::error::ScopeError;
use crate::select::{Scoped, Unscoped};
use crate::shape::{QueryShape, build_scope_condition};
use tenancy_security::AccessScope;

/// Owner filter for a write. Rows cannot be filtered in memory before an
/// `UPDATE` or `DELETE`, so an unfiltered shape matches nothing.
fn write_condition<E>(scope: &AccessScope) -> (QueryShape, Condition)
where
    E: ScopableEntity,
    E::Column: ColumnTrait + Copy,
{
    let shape = QueryShape::for_entity::<E>(scope);
    if shape.needs_in_memory_filter() {
        return (shape, Condition::all().add(Expr::value(false)));
    }
    (shape, build_scope_condition::<E>(shape, scope))
}

/// A `SeaORM` `UpdateMany` that refuses to run until it has been scoped.
///
/// ```rust,ignore
/// let result = deposit::Entity::update_many()
///     .secure()
///     .scope_with(&AccessScope::from(&granted))
///     .col_expr(deposit::Column::Designation, Expr::value("Main"))
///     .exec(tx)
///     .await?;
/// ```
#[must_use]
#[derive(Clone, Debug)]
pub struct SecureUpdateMany<E: EntityTrait, S> {
    inner: sea_orm::UpdateMany<E>,
    _state: PhantomData<S>,
}

pub trait SecureUpdateExt<E: EntityTrait>: Sized {
    fn secure(self) -> SecureUpdateMany<E, Unscoped>;
}

impl<E> SecureUpdateExt<E> for sea_orm::UpdateMany<E>
where
    E: EntityTrait,
{
    fn secure(self) -> SecureUpdateMany<E, Unscoped> {
        SecureUpdateMany {
            inner: self,
            _state: PhantomData,
        }
    }
}

impl<E> SecureUpdateMany<E, Unscoped>
where
    E: ScopableEntity,
    E::Column: ColumnTrait + Copy,
{
    pub fn scope_with(self, scope: &AccessScope) -> SecureUpdateMany<E, Scoped> {
        let (shape, cond) = write_condition::<E>(scope);
        tracing::trace!(
            entity = std::any::type_name::<E>(),
            ?shape,
            "scoping update"
        );
        SecureUpdateMany {
            inner: self.inner.filter(cond),
            _state: PhantomData,
        }
    }
}

impl<E> SecureUpdateMany<E, Scoped>
where
    E: EntityTrait,
{
    pub fn col_expr<T>(mut self, col: T, expr: impl Into<SimpleExpr>) -> Self
    where
        T: IntoIden,
    {
        self.inner = self.inner.col_expr(col, expr.into());
        self
    }

    /// Narrow the update further; the scope condition stays.
    pub fn filter(mut self, filter: Condition) -> Self {
        self.inner = QueryFilter::filter(self.inner, filter);
        self
    }

    /// # Errors
    /// Returns `ScopeError::Db` if the database update fails.
    pub async fn exec<C>(self, conn: &C) -> Result<sea_orm::UpdateResult, ScopeError>
    where
        C: ConnectionTrait + Send + Sync,
    {
        Ok(self.inner.exec(conn).await?)
    }
}

/// A `SeaORM` `DeleteMany` that refuses to run until it has been scoped.
#[must_use]
#[derive(Clone, Debug)]
pub struct SecureDeleteMany<E: EntityTrait, S> {
    inner: sea_orm::DeleteMany<E>,
    _state: PhantomData<S>,
}

pub trait SecureDeleteExt<E: EntityTrait>: Sized {
    fn secure(self) -> SecureDeleteMany<E, Unscoped>;
}

impl<E> SecureDeleteExt<E> for sea_orm::DeleteMany<E>
where
    E: EntityTrait,
{
    fn secure(self) -> SecureDeleteMany<E, Unscoped> {
        SecureDeleteMany {
            inner: self,
            _state: PhantomData,
        }
    }
}

impl<E> SecureDeleteMany<E, Unscoped>
where
    E: ScopableEntity,
    E::Column: ColumnTrait + Copy,
{
    pub fn scope_with(self, scope: &AccessScope) -> SecureDeleteMany<E, Scoped> {
        let (shape, cond) = write_condition::<E>(scope);
        tracing::trace!(
            entity = std::any::type_name::<E>(),
            ?shape,
            "scoping delete"
        );
        SecureDeleteMany {
            inner: self.inner.filter(cond),
            _state: PhantomData,
        }
    }
}

impl<E> SecureDeleteMany<E, Scoped>
where
    E: EntityTrait,
{
    pub fn filter(mut self, filter: Condition) -> Self {
        self.inner = QueryFilter::filter(self.inner, filter);
        self
    }

    /// # Errors
    /// Returns `ScopeError::Db` if the database delete fails.
    pub async fn exec<C>(self, conn: &C) -> Result<sea_orm::DeleteResult, ScopeError>
    where
        C: ConnectionTrait + Send + Sync,
    {
        Ok(self.inner.exec(conn).await?)
    }
}
