//! Application settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `SOCIALGATE_*` environment variables or a
//! configuration file. Unset values fall back to the defaults below.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_ENVIRONMENT: &str = "development";
const DEFAULT_FRONTEND_URL: &str = "http://localhost:5173";
const DEFAULT_ISSUER: &str = "socialgate";
const THREE_DAYS_SECS: u64 = 3 * 24 * 60 * 60;
const DEFAULT_CACHE_TTL_SECS: u64 = 60;
const DEFAULT_OPERATOR: &str = "admin";
const DEFAULT_RATE_REQUESTS: u32 = 20;
const DEFAULT_RATE_WINDOW_SECS: u64 = 5;
const DEFAULT_MAIL_API_URL: &str = "https://send.api.mailtrap.io/api/send";
const DEFAULT_MAIL_FROM_EMAIL: &str = "hello@socialgate.local";
const DEFAULT_MAIL_FROM_NAME: &str = "Socialgate";
const DEFAULT_DELIVERY_ATTEMPTS: u32 = 3;
const DEFAULT_DELIVERY_BACKOFF_MS: u64 = 1_000;
const DEFAULT_MAIL_TIMEOUT_SECS: u64 = 10;
/// Signing secret used only outside production when none is configured.
pub const DEVELOPMENT_TOKEN_SECRET: &str = "socialgate-development-secret";

/// Runtime configuration for the service.
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SOCIALGATE")]
pub struct AppSettings {
    /// Interface to bind.
    pub host: Option<IpAddr>,
    /// Port to bind.
    pub port: Option<u16>,
    /// Deployment environment name, e.g. `development` or `production`.
    pub environment: Option<String>,
    /// Base URL of the web client serving activation links.
    pub frontend_url: Option<String>,
    /// Postgres URL; the in-memory store is used when unset.
    pub database_url: Option<String>,
    /// Redis URL for the identity cache.
    pub redis_url: Option<String>,
    /// Cache identity lookups; off unless set.
    pub cache_enabled: Option<bool>,
    /// Lifetime of a cached identity snapshot, in seconds.
    pub cache_ttl_secs: Option<u64>,
    /// HS256 signing secret for bearer tokens.
    pub token_secret: Option<String>,
    /// `iss` claim stamped on and required from bearer tokens.
    pub token_issuer: Option<String>,
    /// Bearer token lifetime, in seconds.
    pub token_ttl_secs: Option<u64>,
    /// Activation link lifetime, in seconds.
    pub invitation_ttl_secs: Option<u64>,
    /// Operator Basic username for `/v1/debug/vars`.
    pub basic_username: Option<String>,
    /// Operator Basic password for `/v1/debug/vars`.
    pub basic_password: Option<String>,
    /// Per-client throttling; on unless set to `false`.
    pub rate_limiter_enabled: Option<bool>,
    /// Requests allowed per client and window.
    pub rate_limiter_requests: Option<u32>,
    /// Window length, in seconds.
    pub rate_limiter_window_secs: Option<u64>,
    /// Mail API endpoint; delivery is only logged when no key is set.
    pub mail_api_url: Option<String>,
    /// Bearer key for the mail API.
    pub mail_api_key: Option<String>,
    /// Sender address on activation emails.
    pub mail_from_email: Option<String>,
    /// Sender display name on activation emails.
    pub mail_from_name: Option<String>,
    /// Delivery attempts before a sign-up is rolled back.
    pub delivery_attempts: Option<u32>,
    /// Linear backoff step between delivery attempts, in milliseconds.
    pub delivery_backoff_ms: Option<u64>,
}

impl AppSettings {
    /// Socket address to bind.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(
            self.host.unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
            self.port.unwrap_or(DEFAULT_PORT),
        )
    }

    /// Deployment environment name.
    pub fn environment(&self) -> &str {
        self.environment.as_deref().unwrap_or(DEFAULT_ENVIRONMENT)
    }

    /// True when running with the `production` environment name.
    pub fn is_production(&self) -> bool {
        self.environment().eq_ignore_ascii_case("production")
    }

    /// Base URL for activation links.
    pub fn frontend_url(&self) -> &str {
        self.frontend_url.as_deref().unwrap_or(DEFAULT_FRONTEND_URL)
    }

    /// Whether identity lookups go through a cache.
    pub fn cache_enabled(&self) -> bool {
        self.cache_enabled.unwrap_or(false)
    }

    /// Cached snapshot lifetime.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs.unwrap_or(DEFAULT_CACHE_TTL_SECS))
    }

    /// Issuer claim for bearer tokens.
    pub fn token_issuer(&self) -> &str {
        self.token_issuer.as_deref().unwrap_or(DEFAULT_ISSUER)
    }

    /// Bearer token lifetime.
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs.unwrap_or(THREE_DAYS_SECS))
    }

    /// Activation link lifetime.
    pub fn invitation_ttl(&self) -> Duration {
        Duration::from_secs(self.invitation_ttl_secs.unwrap_or(THREE_DAYS_SECS))
    }

    /// Operator username.
    pub fn basic_username(&self) -> &str {
        self.basic_username.as_deref().unwrap_or(DEFAULT_OPERATOR)
    }

    /// Operator password.
    pub fn basic_password(&self) -> &str {
        self.basic_password.as_deref().unwrap_or(DEFAULT_OPERATOR)
    }

    /// Whether per-client throttling runs.
    pub fn rate_limiter_enabled(&self) -> bool {
        self.rate_limiter_enabled.unwrap_or(true)
    }

    /// Requests per client and window.
    pub fn rate_limiter_requests(&self) -> u32 {
        self.rate_limiter_requests.unwrap_or(DEFAULT_RATE_REQUESTS)
    }

    /// Window length, at least one second.
    pub fn rate_limiter_window(&self) -> Duration {
        Duration::from_secs(
            self.rate_limiter_window_secs
                .unwrap_or(DEFAULT_RATE_WINDOW_SECS)
                .max(1),
        )
    }

    /// Mail API endpoint.
    pub fn mail_api_url(&self) -> &str {
        self.mail_api_url.as_deref().unwrap_or(DEFAULT_MAIL_API_URL)
    }

    /// Sender address.
    pub fn mail_from_email(&self) -> &str {
        self.mail_from_email
            .as_deref()
            .unwrap_or(DEFAULT_MAIL_FROM_EMAIL)
    }

    /// Sender display name.
    pub fn mail_from_name(&self) -> &str {
        self.mail_from_name.as_deref().unwrap_or(DEFAULT_MAIL_FROM_NAME)
    }

    /// Per-request timeout for the mail API.
    pub fn mail_timeout(&self) -> Duration {
        Duration::from_secs(DEFAULT_MAIL_TIMEOUT_SECS)
    }

    /// Delivery attempts per sign-up.
    pub fn delivery_attempts(&self) -> u32 {
        self.delivery_attempts.unwrap_or(DEFAULT_DELIVERY_ATTEMPTS)
    }

    /// Backoff step between delivery attempts.
    pub fn delivery_backoff(&self) -> Duration {
        Duration::from_millis(self.delivery_backoff_ms.unwrap_or(DEFAULT_DELIVERY_BACKOFF_MS))
    }
}

impl std::fmt::Debug for AppSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redacted = |set: bool| if set { "<redacted>" } else { "<unset>" };
        f.debug_struct("AppSettings")
            .field("bind_addr", &self.bind_addr())
            .field("environment", &self.environment())
            .field("frontend_url", &self.frontend_url())
            .field("database_url", &redacted(self.database_url.is_some()))
            .field("redis_url", &redacted(self.redis_url.is_some()))
            .field("cache_enabled", &self.cache_enabled())
            .field("token_secret", &redacted(self.token_secret.is_some()))
            .field("token_issuer", &self.token_issuer())
            .field("rate_limiter_enabled", &self.rate_limiter_enabled())
            .field("mail_api_key", &redacted(self.mail_api_key.is_some()))
            .finish_non_exhaustive()
    }
}
