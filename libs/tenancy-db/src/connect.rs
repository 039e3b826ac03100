use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DbErr};

use crate::secure_conn::SecureConn;

/// Pool settings for [`connect`].
#[derive(Clone, Debug)]
pub struct ConnectOpts {
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub sqlx_logging: bool,
}

impl Default for ConnectOpts {
    fn default() -> Self {
        Self {
            max_connections: 10,
            acquire_timeout: Duration::from_secs(30),
            sqlx_logging: false,
        }
    }
}

/// Open a pool for `url`.
///
/// An in-memory `SQLite` database lives per connection, so its pool is pinned
/// to a single connection.
///
/// # Errors
/// Returns `DbErr` if the pool cannot be created.
pub async fn connect(url: &str, opts: &ConnectOpts) -> Result<SecureConn, DbErr> {
    let max_connections = if url.contains(":memory:") {
        1
    } else {
        opts.max_connections
    };

    let mut options = ConnectOptions::new(url.to_owned());
    options
        .max_connections(max_connections)
        .min_connections(1)
        .acquire_timeout(opts.acquire_timeout)
        .sqlx_logging(opts.sqlx_logging);

    let conn = Database::connect(options).await?;
    tracing::debug!(max_connections, "database pool ready");
    Ok(SecureConn::new(conn))
}
