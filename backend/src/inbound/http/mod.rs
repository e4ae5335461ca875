//! HTTP inbound adapter exposing the versioned REST surface.

pub mod auth;
pub mod authentication;
pub mod debug;
pub mod error;
pub mod health;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;

use actix_web::{error::JsonPayloadError, web};

use crate::domain::Error;

/// Version prefix shared by every API route.
pub const API_PREFIX: &str = "/v1";

/// JSON extractor settings that report malformed bodies as domain errors.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(16 * 1024)
        .error_handler(|err: JsonPayloadError, _req| {
            Error::invalid_request(format!("invalid JSON body: {err}")).into()
        })
}

/// The `/v1` scope with every handler registered.
pub fn api_scope() -> actix_web::Scope {
    web::scope(API_PREFIX)
        .app_data(json_config())
        .service(authentication::register_user)
        .service(authentication::create_token)
        .service(users::current_user)
        .service(users::activate_user)
        .service(users::get_user)
        .service(users::delete_user)
        .service(health::health)
        .service(debug::debug_vars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{MockIdentityQuery, MockTokenCommand};
    use crate::inbound::http::test_utils::state_with;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};

    #[actix_web::test]
    async fn malformed_json_is_an_invalid_request() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state_with(
                    MockTokenCommand::new(),
                    MockIdentityQuery::new(),
                )))
                .service(api_scope()),
        )
        .await;
        let req = test::TestRequest::post()
            .uri("/v1/authentication/token")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let err: Error = test::read_body_json(res).await;
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }
}
