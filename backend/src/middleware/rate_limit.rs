//! Per-peer request throttling.
//!
//! Wraps [`FixedWindowRateLimiter`] as actix middleware keyed on the peer IP.
//! Denied requests short-circuit with `429`, a `Retry-After` header and the
//! usual JSON error body.

use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, ResponseError};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use serde_json::json;
use tracing::debug;

use crate::domain::{Error as DomainError, FixedWindowRateLimiter, RateDecision};
use crate::inbound::http::error::RETRY_AFTER_DETAIL;

/// Key used when the peer address is unknown, e.g. in unit tests.
const UNKNOWN_PEER: &str = "unknown";

/// Middleware factory. `None` disables throttling.
#[derive(Clone)]
pub struct RateLimit {
    limiter: Option<Arc<FixedWindowRateLimiter>>,
}

impl RateLimit {
    /// Throttle with `limiter`, or pass every request through when `None`.
    pub fn new(limiter: Option<Arc<FixedWindowRateLimiter>>) -> Self {
        Self { limiter }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service,
            limiter: self.limiter.clone(),
        }))
    }
}

/// Service produced by [`RateLimit`].
pub struct RateLimitMiddleware<S> {
    service: S,
    limiter: Option<Arc<FixedWindowRateLimiter>>,
}

/// Whole seconds to wait, rounded up and never zero.
fn retry_after_seconds(retry_after: Duration) -> u64 {
    let secs = retry_after.as_secs();
    let rounded = if retry_after.subsec_nanos() > 0 {
        secs.saturating_add(1)
    } else {
        secs
    };
    rounded.max(1)
}

fn peer_key(req: &ServiceRequest) -> String {
    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_PEER.to_owned())
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let decision = self
            .limiter
            .as_ref()
            .map(|limiter| limiter.allow(&peer_key(&req)));

        match decision {
            Some(RateDecision::Denied { retry_after }) => {
                let seconds = retry_after_seconds(retry_after);
                debug!(peer = %peer_key(&req), seconds, "request throttled");
                // Built inside the future so the trace id is in scope.
                Box::pin(async move {
                    let err = DomainError::rate_limited("rate limit exceeded")
                        .with_details(json!({ RETRY_AFTER_DETAIL: seconds }));
                    Ok(req.into_response(err.error_response()).map_into_right_body())
                })
            }
            Some(RateDecision::Allowed { .. }) | None => {
                let fut = self.service.call(req);
                Box::pin(async move { Ok(fut.await?.map_into_left_body()) })
            }
        }
    }
}
