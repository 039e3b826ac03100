//! Connection wrapper handing out scoped queries and typed transactions.

use std::{future::Future, pin::Pin};

use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, EntityTrait, IntoActiveModel, TransactionTrait, Value,
};

use crate::entity_traits::ScopableEntity;
use crate::error::{InfraError, ScopeError, TxError};
use crate::select::{Scoped, SecureEntityExt, SecureSelect};
use crate::write::{SecureDeleteExt, SecureDeleteMany, SecureUpdateExt, SecureUpdateMany};
use tenancy_security::AccessScope;

/// Database handle for module services.
///
/// Reads go through [`find`](Self::find), writes of tenant-owned rows through
/// [`insert`](Self::insert) or [`secure_insert`] inside a transaction.
#[derive(Clone, Debug)]
pub struct SecureConn {
    conn: DatabaseConnection,
}

impl SecureConn {
    #[must_use]
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Raw connection for statements that carry no tenant data (principals,
    /// memberships) and for executing already scoped queries.
    #[must_use]
    pub fn conn(&self) -> &DatabaseConnection {
        &self.conn
    }

    #[must_use]
    pub fn db_engine(&self) -> &'static str {
        use sea_orm::DatabaseBackend;

        match self.conn.get_database_backend() {
            DatabaseBackend::Postgres => "postgres",
            DatabaseBackend::MySql => "mysql",
            DatabaseBackend::Sqlite => "sqlite",
        }
    }

    #[allow(clippy::unused_self)]
    pub fn find<E>(&self, scope: &AccessScope) -> SecureSelect<E, Scoped>
    where
        E: ScopableEntity,
        E::Column: ColumnTrait + Copy,
    {
        E::find().secure().scope_with(scope)
    }

    /// Scoped `UPDATE` touching only rows owned inside `scope`.
    #[allow(clippy::unused_self)]
    pub fn update_many<E>(&self, scope: &AccessScope) -> SecureUpdateMany<E, Scoped>
    where
        E: ScopableEntity,
        E::Column: ColumnTrait + Copy,
    {
        E::update_many().secure().scope_with(scope)
    }

    #[allow(clippy::unused_self)]
    pub fn delete_many<E>(&self, scope: &AccessScope) -> SecureDeleteMany<E, Scoped>
    where
        E: ScopableEntity,
        E::Column: ColumnTrait + Copy,
    {
        E::delete_many().secure().scope_with(scope)
    }

    /// Insert a tenant-owned row outside of a transaction.
    ///
    /// # Errors
    /// See [`secure_insert`].
    pub async fn insert<E>(
        &self,
        scope: &AccessScope,
        am: E::ActiveModel,
    ) -> Result<E::Model, ScopeError>
    where
        E: ScopableEntity,
        E::Column: ColumnTrait + Copy,
        E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
        E::Model: IntoActiveModel<E::ActiveModel>,
    {
        secure_insert::<E, _>(scope, am, &self.conn).await
    }

    /// Run `f` inside one transaction. The transaction commits when `f`
    /// returns `Ok` and rolls back otherwise.
    ///
    /// # Errors
    /// `TxError::Domain` carries the callback error, `TxError::Infra` a
    /// begin/commit failure.
    pub async fn in_transaction<T, E, F>(&self, f: F) -> Result<T, TxError<E>>
    where
        T: Send + 'static,
        E: std::fmt::Debug + std::fmt::Display + Send + 'static,
        F: for<'c> FnOnce(
                &'c DatabaseTransaction,
            ) -> Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'c>>
            + Send,
    {
        self.conn
            .transaction::<_, T, TxError<E>>(|txn| {
                let fut = f(txn);
                Box::pin(async move { fut.await.map_err(TxError::Domain) })
            })
            .await
            .map_err(|e| match e {
                sea_orm::TransactionError::Transaction(tx_err) => tx_err,
                sea_orm::TransactionError::Connection(db_err) => {
                    TxError::Infra(InfraError::from(db_err))
                }
            })
    }

    /// [`in_transaction`](Self::in_transaction) with infrastructure errors
    /// folded into the callback's error type.
    ///
    /// # Errors
    /// The callback error, or `map_infra` applied to a begin/commit failure.
    pub async fn in_transaction_mapped<T, E, F, M>(&self, map_infra: M, f: F) -> Result<T, E>
    where
        T: Send + 'static,
        E: std::fmt::Debug + std::fmt::Display + Send + 'static,
        M: FnOnce(InfraError) -> E + Send,
        F: for<'c> FnOnce(
                &'c DatabaseTransaction,
            ) -> Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'c>>
            + Send,
    {
        self.in_transaction(f)
            .await
            .map_err(|tx_err| tx_err.into_domain(map_infra))
    }
}

/// Check that `organization_id` is one of the scope's organizations.
///
/// # Errors
/// Returns `ScopeError::Denied` when it is not.
pub fn validate_organization_in_scope(
    organization_id: &str,
    scope: &AccessScope,
) -> Result<(), ScopeError> {
    if scope.organization_ids().iter().any(|o| o == organization_id) {
        Ok(())
    } else {
        Err(ScopeError::Denied(
            "organization_id not present in access scope",
        ))
    }
}

/// Insert a tenant-owned row after checking its owner columns against `scope`.
///
/// # Errors
/// - `ScopeError::Invalid` if the organization column is not set.
/// - `ScopeError::Denied` if the owner lies outside the scope.
/// - `ScopeError::Db` if the insert fails.
pub async fn secure_insert<E, C>(
    scope: &AccessScope,
    am: E::ActiveModel,
    conn: &C,
) -> Result<E::Model, ScopeError>
where
    E: ScopableEntity,
    E::Column: ColumnTrait + Copy,
    E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
    E::Model: IntoActiveModel<E::ActiveModel>,
    C: ConnectionTrait,
{
    if let Some(org_col) = E::organization_col() {
        let organization = string_value(am.get(org_col).into_value())
            .ok_or(ScopeError::Invalid("organization_id must be set on insert"))?;
        validate_organization_in_scope(&organization, scope)?;
    }
    if scope.has_establishments()
        && let Some(etb_col) = E::establishment_col()
        && let Some(establishment) = string_value(am.get(etb_col).into_value())
        && !scope.establishment_ids().iter().any(|e| e == establishment.as_str())
    {
        return Err(ScopeError::Denied(
            "establishment_id not present in access scope",
        ));
    }
    Ok(am.insert(conn).await?)
}

fn string_value(value: Option<Value>) -> Option<String> {
    match value {
        Some(Value::String(Some(s))) => Some(*s),
        _ => None,
    }
}
