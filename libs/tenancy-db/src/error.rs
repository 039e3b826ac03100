//! Errors of the scoped data layer.

use std::fmt;

use sea_orm::{DbErr, SqlErr};

/// Errors that can occur during scoped query execution.
#[derive(thiserror::Error, Debug)]
pub enum ScopeError {
    #[error("database error: {0}")]
    Db(#[from] DbErr),

    /// The statement is malformed with respect to scoping (e.g. no owner set).
    #[error("invalid scope: {0}")]
    Invalid(&'static str),

    /// The row being written belongs to an organization outside the scope.
    #[error("access denied: {0}")]
    Denied(&'static str),
}

impl ScopeError {
    #[must_use]
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Self::Db(err) => is_unique_violation(err),
            Self::Invalid(_) | Self::Denied(_) => false,
        }
    }
}

/// True when the database rejected a write on a unique index or primary key.
#[must_use]
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Database failure that happened outside the transaction callback
/// (begin, commit, rollback, connection loss).
#[derive(Debug, Clone)]
pub struct InfraError {
    message: String,
    unique_violation: bool,
}

impl InfraError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            unique_violation: false,
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn into_message(self) -> String {
        self.message
    }

    /// Commit-time constraint failures (deferred constraints) surface here.
    #[must_use]
    pub fn is_unique_violation(&self) -> bool {
        self.unique_violation
    }
}

impl From<DbErr> for InfraError {
    fn from(err: DbErr) -> Self {
        Self {
            unique_violation: is_unique_violation(&err),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for InfraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for InfraError {}

/// Result error of [`SecureConn::in_transaction`](crate::SecureConn::in_transaction).
///
/// `Domain` is whatever the callback returned; the transaction was rolled back.
#[derive(Debug, Clone)]
pub enum TxError<E> {
    Domain(E),
    Infra(InfraError),
}

impl<E> TxError<E> {
    /// Collapse into the callback's error type.
    pub fn into_domain<F>(self, map_infra: F) -> E
    where
        F: FnOnce(InfraError) -> E,
    {
        match self {
            TxError::Domain(e) => e,
            TxError::Infra(infra) => map_infra(infra),
        }
    }
}

impl<E: fmt::Display> fmt::Display for TxError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxError::Domain(e) => write!(f, "{e}"),
            TxError::Infra(e) => write!(f, "infrastructure error: {e}"),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for TxError<E> {}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn into_domain_keeps_callback_errors() {
        let err: TxError<String> = TxError::Domain("boom".to_owned());
        assert_eq!(err.into_domain(|i| i.message().to_owned()), "boom");
    }

    #[test]
    fn into_domain_maps_infra_errors() {
        let err: TxError<String> = TxError::Infra(InfraError::new("connection reset"));
        let mapped = err.into_domain(|i| format!("infra: {}", i.message()));
        assert_eq!(mapped, "infra: connection reset");
    }

    #[test]
    fn plain_db_errors_are_not_unique_violations() {
        let err = DbErr::Custom("nope".to_owned());
        assert!(!is_unique_violation(&err));
        assert!(!ScopeError::Db(err).is_unique_violation());
        assert!(!InfraError::new("x").is_unique_violation());
    }
}
