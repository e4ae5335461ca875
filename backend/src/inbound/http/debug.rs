//! Operator-only runtime variables.
use actix_web::{HttpResponse, get, http::header, web};
use serde::{Deserialize, Serialize};

use super::auth::OperatorAccess;
use super::state::{CacheMode, RuntimeInfo, StoreMode};

/// Snapshot of the rate limiter.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RateLimiterVars {
    /// Clients with an open window.
    pub tracked_keys: usize,
    /// Budget per client and window.
    pub requests_per_window: u32,
    /// Window length.
    pub window_seconds: u64,
}

/// Body of `GET /v1/debug/vars`.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DebugVars {
    /// Crate version of the running binary.
    pub version: String,
    /// Deployment environment name.
    pub env: String,
    /// Identity cache backing.
    pub cache_mode: CacheMode,
    /// Credential store backing.
    pub store_mode: StoreMode,
    /// Absent when throttling is disabled.
    pub rate_limiter: Option<RateLimiterVars>,
}

impl DebugVars {
    fn collect(info: &RuntimeInfo) -> Self {
        let rate_limiter = info.limiter.as_ref().map(|limiter| {
            let config = limiter.config();
            RateLimiterVars {
                tracked_keys: limiter.tracked_keys(),
                requests_per_window: config.requests,
                window_seconds: config.window.as_secs(),
            }
        });
        Self {
            version: info.version.to_owned(),
            env: info.env.clone(),
            cache_mode: info.cache_mode,
            store_mode: info.store_mode,
            rate_limiter,
        }
    }
}

/// Expose runtime variables to operators holding the Basic credentials.
#[utoipa::path(
    get,
    path = "/v1/debug/vars",
    tags = ["ops"],
    security(("BasicAuth" = [])),
    responses(
        (status = 200, description = "Runtime variables", body = DebugVars),
        (status = 401, description = "Operator credentials required", body = crate::domain::Error)
    )
)]
#[get("/debug/vars")]
pub async fn debug_vars(_access: OperatorAccess, info: web::Data<RuntimeInfo>) -> HttpResponse {
    HttpResponse::Ok()
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .json(DebugVars::collect(&info))
}
