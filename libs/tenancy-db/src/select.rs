use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use std::marker::PhantomData;

use crate::entity_traits::ScopableEntity;
use crate::error::ScopeError;
use crate::shape::{QueryShape, build_scope_condition};
use tenancy_security::{AccessScope, OrganizationOwned, retain_owned_by};

/// Typestate marker: no scope applied yet, cannot execute.
#[derive(Debug, Clone, Copy)]
pub struct Unscoped;

/// Typestate marker: scope applied, may execute.
#[derive(Debug, Clone, Copy)]
pub struct Scoped;

/// A `SeaORM` `Select` that refuses to run until it has been scoped.
#[must_use]
#[derive(Clone, Debug)]
pub struct SecureSelect<E: EntityTrait, S> {
    pub(crate) inner: sea_orm::Select<E>,
    pub(crate) shape: QueryShape,
    pub(crate) scope: AccessScope,
    /// Row limit held back until after the in-memory filter.
    pub(crate) deferred_limit: Option<u64>,
    pub(crate) _state: PhantomData<S>,
}

pub trait SecureEntityExt<E: EntityTrait>: Sized {
    /// Wrap the select; `.scope_with()` must follow before execution.
    fn secure(self) -> SecureSelect<E, Unscoped>;
}

impl<E> SecureEntityExt<E> for sea_orm::Select<E>
where
    E: EntityTrait,
{
    fn secure(self) -> SecureSelect<E, Unscoped> {
        SecureSelect {
            inner: self,
            shape: QueryShape::Unfiltered,
            scope: AccessScope::default(),
            deferred_limit: None,
            _state: PhantomData,
        }
    }
}

impl<E> SecureSelect<E, Unscoped>
where
    E: ScopableEntity,
    E::Column: ColumnTrait + Copy,
{
    /// Narrow the query to `scope` using the most specific shape available.
    pub fn scope_with(self, scope: &AccessScope) -> SecureSelect<E, Scoped> {
        let shape = QueryShape::for_entity::<E>(scope);
        let cond = build_scope_condition::<E>(shape, scope);
        tracing::trace!(
            entity = std::any::type_name::<E>(),
            ?shape,
            "applying access scope"
        );
        SecureSelect {
            inner: self.inner.filter(cond),
            shape,
            scope: scope.clone(),
            deferred_limit: None,
            _state: PhantomData,
        }
    }
}

impl<E> SecureSelect<E, Scoped>
where
    E: EntityTrait,
    E::Model: OrganizationOwned,
{
    /// # Errors
    /// Returns `ScopeError::Db` if the database query fails.
    pub async fn all<C>(self, conn: &C) -> Result<Vec<E::Model>, ScopeError>
    where
        C: ConnectionTrait + Send + Sync,
    {
        let rows = self.inner.all(conn).await?;
        if self.shape.needs_in_memory_filter() {
            let mut rows = retain_owned_by(rows, &self.scope);
            if let Some(limit) = self.deferred_limit {
                rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
            }
            return Ok(rows);
        }
        Ok(rows)
    }

    /// # Errors
    /// Returns `ScopeError::Db` if the database query fails.
    pub async fn one<C>(self, conn: &C) -> Result<Option<E::Model>, ScopeError>
    where
        C: ConnectionTrait + Send + Sync,
    {
        if self.shape.needs_in_memory_filter() {
            return Ok(self.all(conn).await?.into_iter().next());
        }
        Ok(self.inner.one(conn).await?)
    }

    /// # Errors
    /// Returns `ScopeError::Db` if the database query fails.
    pub async fn count<C>(self, conn: &C) -> Result<u64, ScopeError>
    where
        C: ConnectionTrait + Send + Sync,
        E::Model: sea_orm::FromQueryResult + Send + Sync,
    {
        if self.shape.needs_in_memory_filter() {
            let rows = self.all(conn).await?;
            return Ok(u64::try_from(rows.len()).unwrap_or(u64::MAX));
        }
        Ok(self.inner.count(conn).await?)
    }
}

impl<E> SecureSelect<E, Scoped>
where
    E: EntityTrait,
{
    #[must_use]
    pub fn shape(&self) -> QueryShape {
        self.shape
    }

    /// Add a filter on top of the scope condition.
    pub fn filter(mut self, filter: sea_orm::Condition) -> Self {
        self.inner = QueryFilter::filter(self.inner, filter);
        self
    }

    pub fn order_by<C>(mut self, col: C, order: sea_orm::Order) -> Self
    where
        C: sea_orm::IntoSimpleExpr,
    {
        self.inner = QueryOrder::order_by(self.inner, col, order);
        self
    }

    /// Cap the number of rows. On an unfiltered shape the cap applies after
    /// the in-memory filter, so a page is never short because of foreign rows.
    pub fn limit(mut self, limit: u64) -> Self {
        if self.shape.needs_in_memory_filter() {
            self.deferred_limit = Some(limit);
        } else {
            self.inner = QuerySelect::limit(self.inner, limit);
        }
        self
    }

    /// The built `SeaORM` select, scope condition included.
    #[must_use]
    pub fn into_inner(self) -> sea_orm::Select<E> {
        self.inner
    }
}
