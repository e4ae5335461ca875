//! Shared HTTP adapter state.
//!
//! Handlers receive these bundles through `actix_web::web::Data` so they
//! depend only on driving ports and stay testable without I/O.

use std::sync::Arc;

use zeroize::Zeroizing;

use crate::domain::FixedWindowRateLimiter;
use crate::domain::ports::{AccountCommand, IdentityQuery, RegistrationCommand, TokenCommand};

/// Use-cases reachable from HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub identities: Arc<dyn IdentityQuery>,
    pub tokens: Arc<dyn TokenCommand>,
    pub registration: Arc<dyn RegistrationCommand>,
    pub accounts: Arc<dyn AccountCommand>,
}

impl HttpState {
    /// Bundle the driving ports.
    pub fn new(
        identities: Arc<dyn IdentityQuery>,
        tokens: Arc<dyn TokenCommand>,
        registration: Arc<dyn RegistrationCommand>,
        accounts: Arc<dyn AccountCommand>,
    ) -> Self {
        Self {
            identities,
            tokens,
            registration,
            accounts,
        }
    }
}

/// Where identity snapshots are cached, reported by the debug surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CacheMode {
    /// Every lookup reads the store.
    Disabled,
    /// Process-local cache.
    Memory,
    /// Shared Redis cache.
    Redis,
}

/// Which credential store backs the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StoreMode {
    /// Process-local store; data is lost on restart.
    Memory,
    /// Diesel over PostgreSQL.
    Postgres,
}

/// Deployment facts exposed by the health and debug endpoints.
#[derive(Clone)]
pub struct RuntimeInfo {
    pub env: String,
    pub version: &'static str,
    pub cache_mode: CacheMode,
    pub store_mode: StoreMode,
    pub limiter: Option<Arc<FixedWindowRateLimiter>>,
}

/// HTTP Basic credentials guarding the operator surface.
#[derive(Clone)]
pub struct OperatorCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl OperatorCredentials {
    /// Wrap the configured operator user name and password.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: Zeroizing::new(password.into()),
        }
    }

    pub(crate) fn username(&self) -> &str {
        &self.username
    }

    pub(crate) fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl std::fmt::Debug for OperatorCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperatorCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
