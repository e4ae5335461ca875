//! OpenAPI documentation for the REST surface.
//!
//! Swagger UI serves this document at `/docs` in debug builds.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode, Role, User};
use crate::inbound::http::authentication::{
    CreateTokenRequest, RegisterUserRequest, RegisteredUserResponse, TokenResponse,
};
use crate::inbound::http::debug::{DebugVars, RateLimiterVars};
use crate::inbound::http::health::HealthStatus;
use crate::inbound::http::state::{CacheMode, StoreMode};

/// Registers the bearer and operator Basic schemes.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        let bearer = HttpBuilder::new()
            .scheme(HttpAuthScheme::Bearer)
            .bearer_format("JWT")
            .description(Some("Token issued by POST /v1/authentication/token."))
            .build();
        components.add_security_scheme("BearerToken", SecurityScheme::Http(bearer));

        let basic = HttpBuilder::new()
            .scheme(HttpAuthScheme::Basic)
            .description(Some("Operator credentials for the debug surface."))
            .build();
        components.add_security_scheme("BasicAuth", SecurityScheme::Http(basic));
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Socialgate API",
        description = "Identity, authentication and throttling front for the social network."
    ),
    servers((url = "/", description = "Relative to the deployment base URL")),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::authentication::register_user,
        crate::inbound::http::authentication::create_token,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::users::activate_user,
        crate::inbound::http::health::health,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
        crate::inbound::http::debug::debug_vars,
    ),
    components(schemas(
        Error,
        ErrorCode,
        User,
        Role,
        RegisterUserRequest,
        RegisteredUserResponse,
        CreateTokenRequest,
        TokenResponse,
        HealthStatus,
        DebugVars,
        RateLimiterVars,
        CacheMode,
        StoreMode,
    )),
    tags(
        (name = "authentication", description = "Sign-up and token issuance"),
        (name = "users", description = "Account lookup, activation and removal"),
        (name = "health", description = "Health checks"),
        (name = "ops", description = "Operator surface")
    )
)]
pub struct ApiDoc;
