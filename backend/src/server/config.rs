//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use socialgate::outbound::persistence::DbPool;
use socialgate::settings::AppSettings;

/// Settings plus the connections opened before the server starts.
pub struct ServerConfig {
    pub(crate) settings: AppSettings,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    #[must_use]
    pub fn new(settings: AppSettings) -> Self {
        Self {
            settings,
            db_pool: None,
        }
    }

    /// Attach a database pool; without one the in-memory store is used.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.settings.bind_addr()
    }
}
