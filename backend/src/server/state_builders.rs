//! Builders turning settings into adapters and driving ports.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use reqwest::Url;
use tracing::{info, warn};
use zeroize::Zeroizing;

use socialgate::domain::ports::{
    FixtureRoleRepository, Mailer, RoleRepository, TokenAuthenticator, UserCache, UserRepository,
};
use socialgate::domain::{
    AccountService, DeliveryPolicy, FixedWindowRateLimiter, IdentityDirectory, RateLimitConfig,
    RegistrationConfig, RegistrationService, RoleAuthorizer, TokenConfig, TokenService,
};
use socialgate::inbound::http::state::{
    CacheMode, HttpState, OperatorCredentials, RuntimeInfo, StoreMode,
};
use socialgate::outbound::cache::RedisUserCache;
use socialgate::outbound::mail::{HttpMailer, HttpMailerConfig, LoggingMailer};
use socialgate::outbound::memory::{InMemoryUserCache, InMemoryUserRepository};
use socialgate::outbound::persistence::{DieselRoleRepository, DieselUserRepository};
use socialgate::outbound::token::JwtAuthenticator;
use socialgate::settings::{AppSettings, DEVELOPMENT_TOKEN_SECRET};

use super::ServerConfig;

/// Everything the app factory clones into each worker.
#[derive(Clone)]
pub(crate) struct BuiltState {
    pub(crate) http: HttpState,
    pub(crate) runtime: RuntimeInfo,
    pub(crate) operator: OperatorCredentials,
}

fn startup_error(message: impl Into<String>) -> std::io::Error {
    std::io::Error::other(message.into())
}

fn to_chrono(duration: std::time::Duration, what: &str) -> std::io::Result<chrono::Duration> {
    chrono::Duration::from_std(duration)
        .map_err(|err| startup_error(format!("{what} is out of range: {err}")))
}

fn build_stores(
    config: &ServerConfig,
    clock: &Arc<dyn Clock>,
) -> (Arc<dyn UserRepository>, Arc<dyn RoleRepository>, StoreMode) {
    match &config.db_pool {
        Some(pool) => (
            Arc::new(DieselUserRepository::new(pool.clone())),
            Arc::new(DieselRoleRepository::new(pool.clone())),
            StoreMode::Postgres,
        ),
        None => {
            warn!("no database URL configured; using the in-memory store");
            (
                Arc::new(InMemoryUserRepository::new(clock.clone())),
                Arc::new(FixtureRoleRepository::default()),
                StoreMode::Memory,
            )
        }
    }
}

async fn build_cache(
    settings: &AppSettings,
    clock: &Arc<dyn Clock>,
) -> std::io::Result<(Option<Arc<dyn UserCache>>, CacheMode)> {
    if !settings.cache_enabled() {
        return Ok((None, CacheMode::Disabled));
    }
    match &settings.redis_url {
        Some(url) => {
            let cache = RedisUserCache::connect(url, settings.cache_ttl())
                .await
                .map_err(|err| startup_error(format!("redis cache unavailable: {err}")))?;
            info!("identity cache backed by redis");
            Ok((Some(Arc::new(cache)), CacheMode::Redis))
        }
        None => {
            info!("identity cache held in process memory");
            let cache = InMemoryUserCache::new(settings.cache_ttl(), clock.clone());
            Ok((Some(Arc::new(cache)), CacheMode::Memory))
        }
    }
}

fn build_mailer(settings: &AppSettings) -> std::io::Result<Arc<dyn Mailer>> {
    match &settings.mail_api_key {
        Some(key) => {
            let endpoint = Url::parse(settings.mail_api_url())
                .map_err(|err| startup_error(format!("invalid mail API URL: {err}")))?;
            let mailer = HttpMailer::new(HttpMailerConfig {
                endpoint,
                api_key: Zeroizing::new(key.clone()),
                from_email: settings.mail_from_email().to_owned(),
                from_name: settings.mail_from_name().to_owned(),
                timeout: settings.mail_timeout(),
            })
            .map_err(|err| startup_error(format!("mail client setup failed: {err}")))?;
            Ok(Arc::new(mailer))
        }
        None if settings.is_production() => Err(startup_error(
            "a mail API key is required in production",
        )),
        None => {
            warn!("no mail API key configured; activation emails are only logged");
            Ok(Arc::new(LoggingMailer))
        }
    }
}

fn build_authenticator(
    settings: &AppSettings,
    clock: &Arc<dyn Clock>,
) -> std::io::Result<Arc<dyn TokenAuthenticator>> {
    let secret = match &settings.token_secret {
        Some(secret) => Zeroizing::new(secret.clone()),
        None if settings.is_production() => {
            return Err(startup_error("a token secret is required in production"));
        }
        None => {
            warn!("no token secret configured; using the development secret");
            Zeroizing::new(DEVELOPMENT_TOKEN_SECRET.to_owned())
        }
    };
    Ok(Arc::new(JwtAuthenticator::new(
        secret.as_bytes(),
        settings.token_issuer(),
        clock.clone(),
    )))
}

/// Build the limiter when throttling is enabled.
pub(crate) fn build_limiter(settings: &AppSettings) -> Option<Arc<FixedWindowRateLimiter>> {
    settings.rate_limiter_enabled().then(|| {
        Arc::new(FixedWindowRateLimiter::new(
            RateLimitConfig {
                requests: settings.rate_limiter_requests(),
                window: settings.rate_limiter_window(),
            },
            Arc::new(DefaultClock),
        ))
    })
}

/// Wire adapters and services into handler state.
///
/// # Errors
/// Fails when an adapter cannot be configured, e.g. an unreachable Redis or
/// a production deployment missing its secrets.
pub(crate) async fn build_state(
    config: &ServerConfig,
    limiter: Option<Arc<FixedWindowRateLimiter>>,
) -> std::io::Result<BuiltState> {
    let settings = &config.settings;
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);

    let (users, roles, store_mode) = build_stores(config, &clock);
    let (cache, cache_mode) = build_cache(settings, &clock).await?;
    let mailer = build_mailer(settings)?;
    let authenticator = build_authenticator(settings, &clock)?;

    let identities = Arc::new(IdentityDirectory::new(users.clone(), cache));
    let tokens = TokenService::new(
        users.clone(),
        authenticator,
        clock.clone(),
        TokenConfig {
            issuer: settings.token_issuer().to_owned(),
            ttl: to_chrono(settings.token_ttl(), "token TTL")?,
        },
    );
    let registration = RegistrationService::new(
        users.clone(),
        mailer,
        clock,
        RegistrationConfig {
            invitation_ttl: to_chrono(settings.invitation_ttl(), "invitation TTL")?,
            frontend_url: settings.frontend_url().to_owned(),
            delivery: DeliveryPolicy {
                max_attempts: settings.delivery_attempts(),
                backoff_step: settings.delivery_backoff(),
            },
        },
    );
    let accounts = AccountService::new(users, RoleAuthorizer::new(roles), identities.clone());

    Ok(BuiltState {
        http: HttpState::new(
            identities,
            Arc::new(tokens),
            Arc::new(registration),
            Arc::new(accounts),
        ),
        runtime: RuntimeInfo {
            env: settings.environment().to_owned(),
            version: env!("CARGO_PKG_VERSION"),
            cache_mode,
            store_mode,
            limiter,
        },
        operator: OperatorCredentials::new(settings.basic_username(), settings.basic_password()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use std::time::Duration;

    use env_lock::lock_env;
    use ortho_config::OrthoConfig;
    use rstest::rstest;

    const KEYS: [&str; 5] = [
        "SOCIALGATE_ENVIRONMENT",
        "SOCIALGATE_CACHE_ENABLED",
        "SOCIALGATE_REDIS_URL",
        "SOCIALGATE_RATE_LIMITER_ENABLED",
        "SOCIALGATE_RATE_LIMITER_REQUESTS",
    ];

    fn settings_from_env(overrides: &[(&'static str, &str)]) -> AppSettings {
        let vars = KEYS.map(|key| {
            let value = overrides
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (*value).to_owned());
            (key, value)
        });
        let _guard = lock_env(vars);
        AppSettings::load_from_iter([OsString::from("socialgate")]).expect("settings should load")
    }

    #[rstest]
    fn default_settings_build_a_limiter() {
        let settings = settings_from_env(&[]);
        let limiter = build_limiter(&settings).expect("throttling is on by default");
        assert_eq!(limiter.config().requests, 20);
        assert_eq!(limiter.config().window, Duration::from_secs(5));
    }

    #[rstest]
    fn limiter_follows_the_environment() {
        let tuned = settings_from_env(&[("SOCIALGATE_RATE_LIMITER_REQUESTS", "7")]);
        let limiter = build_limiter(&tuned).expect("limiter");
        assert_eq!(limiter.config().requests, 7);

        let disabled = settings_from_env(&[("SOCIALGATE_RATE_LIMITER_ENABLED", "false")]);
        assert!(build_limiter(&disabled).is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn default_state_throttles_without_a_cache() {
        let settings = settings_from_env(&[]);
        let limiter = build_limiter(&settings);
        let state = build_state(&ServerConfig::new(settings), limiter)
            .await
            .expect("development state builds");

        assert!(state.runtime.limiter.is_some());
        assert_eq!(state.runtime.cache_mode, CacheMode::Disabled);
        assert_eq!(state.runtime.store_mode, StoreMode::Memory);
    }

    #[rstest]
    #[tokio::test]
    async fn enabling_the_cache_without_redis_uses_process_memory() {
        let settings = settings_from_env(&[("SOCIALGATE_CACHE_ENABLED", "true")]);
        let state = build_state(&ServerConfig::new(settings), None)
            .await
            .expect("development state builds");

        assert_eq!(state.runtime.cache_mode, CacheMode::Memory);
    }
}
