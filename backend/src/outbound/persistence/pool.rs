//! Async connection pool for the PostgreSQL credential store.
//!
//! Wraps `diesel-async`'s `bb8` integration. Every repository call checks a
//! connection out of this pool and runs under [`QUERY_TIMEOUT`].

use std::future::Future;
use std::time::Duration;

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

/// Upper bound for a single repository operation, transaction included.
pub const QUERY_TIMEOUT: Duration = Duration::from_secs(5);

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Errors raised while building, using or migrating the pool.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// No connection became available in time.
    #[error("failed to get connection from pool: {message}")]
    Checkout { message: String },

    /// The pool could not be constructed.
    #[error("failed to build connection pool: {message}")]
    Build { message: String },

    /// Schema migrations failed to apply.
    #[error("failed to apply migrations: {message}")]
    Migration { message: String },
}

impl PoolError {
    /// Create a checkout error.
    pub fn checkout(message: impl Into<String>) -> Self {
        Self::Checkout {
            message: message.into(),
        }
    }

    /// Create a build error.
    pub fn build(message: impl Into<String>) -> Self {
        Self::Build {
            message: message.into(),
        }
    }

    /// Create a migration error.
    pub fn migration(message: impl Into<String>) -> Self {
        Self::Migration {
            message: message.into(),
        }
    }

    /// Human-readable cause, without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Checkout { message } | Self::Build { message } | Self::Migration { message } => {
                message
            }
        }
    }
}

/// Pool sizing and checkout settings.
///
/// ```
/// use std::time::Duration;
/// use socialgate::outbound::persistence::PoolConfig;
///
/// let config = PoolConfig::new("postgres://localhost/socialgate")
///     .with_max_size(20)
///     .with_connection_timeout(Duration::from_secs(5));
/// assert_eq!(config.database_url(), "postgres://localhost/socialgate");
/// ```
#[derive(Debug, Clone)]
pub struct PoolConfig {
    database_url: String,
    max_size: u32,
    min_idle: Option<u32>,
    connection_timeout: Duration,
}

impl PoolConfig {
    /// Defaults: 10 connections, 2 idle, 5 second checkout timeout.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_size: 10,
            min_idle: Some(2),
            connection_timeout: QUERY_TIMEOUT,
        }
    }

    /// Set the maximum number of pooled connections.
    pub fn with_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size;
        self
    }

    /// Set the number of idle connections kept warm.
    pub fn with_min_idle(mut self, min_idle: Option<u32>) -> Self {
        self.min_idle = min_idle;
        self
    }

    /// Set the checkout timeout.
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Connection string.
    pub fn database_url(&self) -> &str {
        &self.database_url
    }
}

/// Cloneable handle over the `bb8` pool.
#[derive(Clone)]
pub struct DbPool {
    inner: Pool<AsyncPgConnection>,
}

impl DbPool {
    /// Build the pool.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Build`] when the pool cannot be constructed.
    pub async fn new(config: PoolConfig) -> Result<Self, PoolError> {
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(&config.database_url);
        let inner = Pool::builder()
            .max_size(config.max_size)
            .min_idle(config.min_idle)
            .connection_timeout(config.connection_timeout)
            .build(manager)
            .await
            .map_err(|err| PoolError::build(err.to_string()))?;
        Ok(Self { inner })
    }

    /// Check out a connection.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Checkout`] when none is available in time.
    pub async fn get(&self) -> Result<PooledConnection<'_, AsyncPgConnection>, PoolError> {
        self.inner
            .get()
            .await
            .map_err(|err| PoolError::checkout(err.to_string()))
    }
}

/// Apply embedded schema migrations, including the role seed.
///
/// # Errors
///
/// Returns [`PoolError::Migration`] when connecting or migrating fails.
pub async fn run_migrations(database_url: &str) -> Result<(), PoolError> {
    let url = database_url.to_owned();
    let applied = tokio::task::spawn_blocking(move || {
        let mut conn = PgConnection::establish(&url)
            .map_err(|err| PoolError::migration(err.to_string()))?;
        conn.run_pending_migrations(MIGRATIONS)
            .map(|versions| versions.len())
            .map_err(|err| PoolError::migration(err.to_string()))
    })
    .await
    .map_err(|err| PoolError::migration(err.to_string()))??;
    info!(applied, "database migrations complete");
    Ok(())
}

/// Run `operation` under [`QUERY_TIMEOUT`], mapping expiry via `on_timeout`.
pub(crate) async fn bounded<T, E>(
    operation: &'static str,
    future: impl Future<Output = Result<T, E>>,
    on_timeout: impl FnOnce(&'static str) -> E,
) -> Result<T, E> {
    tokio::time::timeout(QUERY_TIMEOUT, future)
        .await
        .unwrap_or_else(|_| Err(on_timeout(operation)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn config_defaults() {
        let config = PoolConfig::new("postgres://localhost/test");
        assert_eq!(config.max_size, 10);
        assert_eq!(config.min_idle, Some(2));
        assert_eq!(config.connection_timeout, QUERY_TIMEOUT);
    }

    #[rstest]
    #[case(PoolError::checkout("refused"), "refused")]
    #[case(PoolError::build("bad url"), "bad url")]
    #[case(PoolError::migration("syntax"), "syntax")]
    fn message_strips_prefix(#[case] err: PoolError, #[case] expected: &str) {
        assert_eq!(err.message(), expected);
        assert!(err.to_string().ends_with(expected));
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn bounded_maps_expiry_with_operation_name() {
        let result: Result<(), String> = bounded(
            "find_by_id",
            async {
                tokio::time::sleep(QUERY_TIMEOUT * 2).await;
                Ok(())
            },
            |op| format!("{op} timed out"),
        )
        .await;
        assert_eq!(result, Err("find_by_id timed out".to_owned()));
    }

    #[rstest]
    #[tokio::test]
    async fn bounded_passes_through_fast_results() {
        let result: Result<u8, String> = bounded("delete", async { Ok(7) }, |op| op.to_owned()).await;
        assert_eq!(result, Ok(7));
    }
}
