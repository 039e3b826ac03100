//! Scope-filtered data gateway.
//!
//! Every read or write of tenant-owned rows goes through here. The access
//! decision is taken first; the operation only ever sees a
//! [`GrantedScope`], never the raw client-supplied [`Scope`].

use std::{future::Future, pin::Pin, sync::Arc};

use sea_orm::DatabaseTransaction;
use tenancy_db::SecureConn;
use tenancy_security::{
    AccessDecision, AccessScope, GrantedScope, OrganizationOwned, PrincipalId, Scope,
    retain_owned_by,
};

use super::decision::AccessDecisionEngine;
use super::error::DomainError;
use super::membership::MembershipIndex;

/// Future returned by a guarded mutation; borrows the open transaction.
pub type BoxedTxFuture<'c, T> = Pin<Box<dyn Future<Output = Result<T, DomainError>> + Send + 'c>>;

#[derive(Clone)]
pub struct ScopeGateway {
    engine: Arc<AccessDecisionEngine>,
    index: Arc<MembershipIndex>,
    db: SecureConn,
}

impl ScopeGateway {
    #[must_use]
    pub fn new(
        engine: Arc<AccessDecisionEngine>,
        index: Arc<MembershipIndex>,
        db: SecureConn,
    ) -> Self {
        Self { engine, index, db }
    }

    /// Run `op` in one transaction if `principal` may write to `scope`.
    ///
    /// `op` is not invoked on denial. An `Err` from `op` rolls back all of
    /// its writes.
    ///
    /// # Errors
    /// `AccessDenied` with the deny reason; otherwise whatever `op` or the
    /// transaction returns.
    pub async fn guarded_mutation<T, F>(
        &self,
        principal: Option<&PrincipalId>,
        scope: &Scope,
        op: F,
    ) -> Result<T, DomainError>
    where
        T: Send + 'static,
        F: for<'c> FnOnce(&'c DatabaseTransaction, GrantedScope) -> BoxedTxFuture<'c, T>
            + Send,
    {
        let granted = match self.engine.decide(principal, scope).await? {
            AccessDecision::Allowed(granted) => granted,
            AccessDecision::Denied(reason) => {
                return Err(DomainError::AccessDenied {
                    principal_id: principal.cloned(),
                    organization_id: scope.organization_id.clone(),
                    reason,
                });
            }
        };

        self.db
            .in_transaction_mapped(DomainError::from_infra, move |tx| op(tx, granted))
            .await
    }

    /// Run `op` if `principal` may read `scope`, else return `T::default()`.
    ///
    /// # Errors
    /// Storage failures while deciding, or the error returned by `op`.
    /// A denial is never an error here.
    pub async fn guarded_query<T, F, Fut>(
        &self,
        principal: Option<&PrincipalId>,
        scope: &Scope,
        op: F,
    ) -> Result<T, DomainError>
    where
        T: Default,
        F: FnOnce(SecureConn, GrantedScope) -> Fut,
        Fut: Future<Output = Result<T, DomainError>>,
    {
        match self.engine.decide(principal, scope).await? {
            AccessDecision::Allowed(granted) => op(self.db.clone(), granted).await,
            AccessDecision::Denied(_) => Ok(T::default()),
        }
    }

    /// Keep only the items owned by one of the principal's organizations.
    ///
    /// For already materialized results that could not be scoped in the
    /// query itself.
    ///
    /// # Errors
    /// Returns `DomainError::Database` if memberships cannot be read.
    pub async fn filter_by_membership<T>(
        &self,
        principal: Option<&PrincipalId>,
        items: Vec<T>,
    ) -> Result<Vec<T>, DomainError>
    where
        T: OrganizationOwned,
    {
        let Some(principal) = principal else {
            return Ok(Vec::new());
        };
        let organizations = self.index.organizations_of(principal).await?;
        let before = items.len();
        let kept = retain_owned_by(items, &AccessScope::organizations_only(organizations));
        if kept.len() < before {
            tracing::debug!(
                principal_id = %principal,
                dropped = before - kept.len(),
                "filtered rows outside membership"
            );
        }
        Ok(kept)
    }
}
