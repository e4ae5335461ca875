//! Shared wiring for HTTP flow tests: the full middleware and handler stack
//! over the in-memory store, with a scriptable mailer.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_web::body::BoxBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{App, test, web};
use async_trait::async_trait;
use mockable::{Clock, DefaultClock};
use serde_json::Value;

use socialgate::domain::ports::{
    DeliveryReceipt, FixtureRoleRepository, Mailer, MailerError, OutboundMessage, UserCache,
};
use socialgate::domain::{
    AccountService, DeliveryPolicy, DeliverySleeper, FixedWindowRateLimiter, IdentityDirectory,
    RateLimitConfig, RegistrationConfig, RegistrationService, RoleAuthorizer, TokenConfig,
    TokenService,
};
use socialgate::inbound::http::api_scope;
use socialgate::inbound::http::state::{
    CacheMode, HttpState, OperatorCredentials, RuntimeInfo, StoreMode,
};
use socialgate::outbound::memory::{InMemoryUserCache, InMemoryUserRepository};
use socialgate::outbound::token::JwtAuthenticator;
use socialgate::{RateLimit, Trace};

pub const OPERATOR_USER: &str = "ops";
pub const OPERATOR_PASSWORD: &str = "open-sesame";

/// Mailer that records every attempt and optionally fails all of them.
#[derive(Default)]
pub struct ScriptedMailer {
    fail: bool,
    sent: Mutex<Vec<OutboundMessage>>,
}

impl ScriptedMailer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn attempts(&self) -> Vec<OutboundMessage> {
        self.sent.lock().expect("mailer lock").clone()
    }
}

#[async_trait]
impl Mailer for ScriptedMailer {
    async fn send(&self, message: &OutboundMessage) -> Result<DeliveryReceipt, MailerError> {
        self.sent.lock().expect("mailer lock").push(message.clone());
        if self.fail {
            Err(MailerError::delivery("provider returned 503"))
        } else {
            Ok(DeliveryReceipt { status: 202 })
        }
    }
}

struct NoSleep;

#[async_trait]
impl DeliverySleeper for NoSleep {
    async fn sleep(&self, _duration: Duration) {}
}

/// Knobs for [`Stack::new`].
pub struct StackOptions {
    pub mailer: ScriptedMailer,
    pub rate_limit: Option<u32>,
    pub cached: bool,
}

impl Default for StackOptions {
    fn default() -> Self {
        Self {
            mailer: ScriptedMailer::default(),
            rate_limit: None,
            cached: true,
        }
    }
}

/// Adapters shared between the app under test and assertions.
pub struct Stack {
    pub users: Arc<InMemoryUserRepository>,
    pub mailer: Arc<ScriptedMailer>,
    pub limiter: Option<Arc<FixedWindowRateLimiter>>,
    http: HttpState,
    runtime: RuntimeInfo,
}

impl Stack {
    pub fn new(options: StackOptions) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
        let users = Arc::new(InMemoryUserRepository::new(clock.clone()));
        let mailer = Arc::new(options.mailer);
        let cache: Option<Arc<dyn UserCache>> = options.cached.then(|| {
            Arc::new(InMemoryUserCache::new(Duration::from_secs(60), clock.clone()))
                as Arc<dyn UserCache>
        });
        let limiter = options.rate_limit.map(|requests| {
            Arc::new(FixedWindowRateLimiter::new(
                RateLimitConfig {
                    requests,
                    window: Duration::from_secs(5),
                },
                clock.clone(),
            ))
        });

        let identities = Arc::new(IdentityDirectory::new(users.clone(), cache));
        let tokens = TokenService::new(
            users.clone(),
            Arc::new(JwtAuthenticator::new(b"integration-secret", "socialgate", clock.clone())),
            clock.clone(),
            TokenConfig::default(),
        );
        let registration = RegistrationService::with_sleeper(
            users.clone(),
            mailer.clone(),
            clock,
            Arc::new(NoSleep),
            RegistrationConfig {
                frontend_url: "https://app.example.com".to_owned(),
                delivery: DeliveryPolicy::default(),
                ..RegistrationConfig::default()
            },
        );
        let accounts = AccountService::new(
            users.clone(),
            RoleAuthorizer::new(Arc::new(FixtureRoleRepository::default())),
            identities.clone(),
        );

        let cache_mode = if options.cached {
            CacheMode::Memory
        } else {
            CacheMode::Disabled
        };
        Self {
            http: HttpState::new(
                identities,
                Arc::new(tokens),
                Arc::new(registration),
                Arc::new(accounts),
            ),
            runtime: RuntimeInfo {
                env: "test".to_owned(),
                version: env!("CARGO_PKG_VERSION"),
                cache_mode,
                store_mode: StoreMode::Memory,
                limiter: limiter.clone(),
            },
            users,
            mailer,
            limiter,
        }
    }

    /// Initialise the app with production middleware ordering.
    pub async fn app(
        &self,
    ) -> impl Service<
        actix_http::Request,
        Response = ServiceResponse<BoxBody>,
        Error = actix_web::Error,
    > {
        test::init_service(
            App::new()
                .app_data(web::Data::new(self.http.clone()))
                .app_data(web::Data::new(self.runtime.clone()))
                .app_data(web::Data::new(OperatorCredentials::new(
                    OPERATOR_USER,
                    OPERATOR_PASSWORD,
                )))
                .service(api_scope().wrap(RateLimit::new(self.limiter.clone())))
                .wrap(Trace),
        )
        .await
    }
}

/// Register `username` and return `(user id, plaintext invitation token)`.
pub async fn register<S>(app: &S, username: &str, email: &str, password: &str) -> (i64, String)
where
    S: Service<
            actix_http::Request,
            Response = ServiceResponse<BoxBody>,
            Error = actix_web::Error,
        >,
{
    let req = test::TestRequest::post()
        .uri("/v1/authentication/user")
        .set_json(serde_json::json!({
            "username": username,
            "email": email,
            "password": password,
        }))
        .to_request();
    let res = test::call_service(app, req).await;
    assert_eq!(res.status(), 201, "registration of {username} failed");
    let body: Value = test::read_body_json(res).await;
    let id = body["user"]["id"].as_i64().expect("user id");
    let token = body["token"].as_str().expect("token").to_owned();
    (id, token)
}

/// Activate, then log in; returns the bearer token.
pub async fn activate_and_login<S>(app: &S, invitation: &str, email: &str, password: &str) -> String
where
    S: Service<
            actix_http::Request,
            Response = ServiceResponse<BoxBody>,
            Error = actix_web::Error,
        >,
{
    let req = test::TestRequest::put()
        .uri(&format!("/v1/users/activate/{invitation}"))
        .to_request();
    assert_eq!(test::call_service(app, req).await.status(), 204);

    let req = test::TestRequest::post()
        .uri("/v1/authentication/token")
        .set_json(serde_json::json!({ "email": email, "password": password }))
        .to_request();
    let res = test::call_service(app, req).await;
    assert_eq!(res.status(), 201);
    let body: Value = test::read_body_json(res).await;
    body["token"].as_str().expect("bearer token").to_owned()
}
