//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;

use std::sync::Arc;
use std::time::Duration;

use actix_web::body::BoxBody;
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::debug;

#[cfg(debug_assertions)]
use socialgate::doc::ApiDoc;
use socialgate::domain::FixedWindowRateLimiter;
use socialgate::inbound::http::api_scope;
use socialgate::inbound::http::health::{HealthState, live, ready};
use socialgate::{RateLimit, Trace};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use state_builders::{BuiltState, build_limiter, build_state};

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    state: BuiltState,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<BoxBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        state,
    } = deps;
    let limiter = state.runtime.limiter.clone();

    let app = App::new()
        .app_data(health_state)
        .app_data(web::Data::new(state.http))
        .app_data(web::Data::new(state.runtime))
        .app_data(web::Data::new(state.operator))
        .service(api_scope().wrap(RateLimit::new(limiter)))
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // Health checks and docs stay outside the throttled scope. `Trace` wraps
    // everything, so throttled responses still carry a trace id.
    app.wrap(Trace)
}

/// Evict idle limiter windows once per window length.
fn spawn_limiter_sweep(limiter: Arc<FixedWindowRateLimiter>) {
    let period = limiter.config().window.max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            let purged = limiter.purge_expired();
            if purged > 0 {
                debug!(purged, tracked = limiter.tracked_keys(), "rate limiter windows purged");
            }
        }
    });
}

/// Construct the HTTP server.
///
/// # Errors
/// Propagates [`std::io::Error`] when an adapter cannot be configured or the
/// socket cannot be bound.
pub async fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let limiter = build_limiter(&config.settings);
    let state = build_state(&config, limiter.clone()).await?;
    if let Some(limiter) = limiter {
        spawn_limiter_sweep(limiter);
    }

    let deps = AppDependencies {
        health_state: health_state.clone(),
        state,
    };
    let server = HttpServer::new(move || build_app(deps.clone()))
        .bind(config.bind_addr())?
        .run();

    health_state.mark_ready();
    Ok(server)
}
