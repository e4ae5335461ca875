//! Users API handlers.
//!
//! ```text
//! GET    /v1/users/me
//! GET    /v1/users/{id}
//! DELETE /v1/users/{id}
//! PUT    /v1/users/activate/{token}
//! ```
//!
//! `/users/me` must be registered ahead of `/users/{id}` so the literal
//! segment wins.

use actix_web::{HttpResponse, delete, get, put, web};

use crate::domain::{Error, InvitationToken, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::parse_user_id;

/// Return the caller's own record.
#[utoipa::path(
    get,
    path = "/v1/users/me",
    responses(
        (status = 200, description = "Authenticated user", body = User),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 429, description = "Too many requests", body = Error)
    ),
    tags = ["users"],
    operation_id = "currentUser",
    security(("BearerToken" = []))
)]
#[get("/users/me")]
pub async fn current_user(caller: AuthenticatedUser) -> ApiResult<web::Json<User>> {
    Ok(web::Json(caller.into_inner()))
}

/// Resolve a user through the identity directory.
#[utoipa::path(
    get,
    path = "/v1/users/{id}",
    params(("id" = i64, Path, description = "User identifier")),
    responses(
        (status = 200, description = "User", body = User),
        (status = 400, description = "Invalid identifier", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Unknown or inactive user", body = Error),
        (status = 429, description = "Too many requests", body = Error),
        (status = 503, description = "Store or cache unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "getUser",
    security(("BearerToken" = []))
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    _caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<User>> {
    let id = parse_user_id(&path)?;
    let user = state.identities.resolve(id).await?;
    Ok(web::Json(user))
}

/// Delete an account. Owners may delete themselves; anyone else needs the
/// `admin` role.
#[utoipa::path(
    delete,
    path = "/v1/users/{id}",
    params(("id" = i64, Path, description = "User identifier")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 400, description = "Invalid identifier", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Insufficient role", body = Error),
        (status = 404, description = "Unknown user", body = Error),
        (status = 429, description = "Too many requests", body = Error)
    ),
    tags = ["users"],
    operation_id = "deleteUser",
    security(("BearerToken" = []))
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let target = parse_user_id(&path)?;
    state.accounts.delete_account(caller.user(), target).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Redeem an invitation token and activate its account.
#[utoipa::path(
    put,
    path = "/v1/users/activate/{token}",
    params(("token" = String, Path, description = "Plaintext invitation token")),
    responses(
        (status = 204, description = "Account activated"),
        (status = 404, description = "Unknown or expired token", body = Error),
        (status = 429, description = "Too many requests", body = Error)
    ),
    tags = ["users"],
    operation_id = "activateUser",
    security([])
)]
#[put("/users/activate/{token}")]
pub async fn activate_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let token = InvitationToken::from_presented(path.as_str());
    state.registration.activate(&token).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{
        MockAccountCommand, MockIdentityQuery, MockRegistrationCommand, MockTokenCommand,
    };
    use crate::domain::{ErrorCode, UserId};
    use crate::inbound::http::test_utils::full_state;
    use crate::test_support::sample_user;
    use actix_web::http::StatusCode;
    use actix_web::http::header::AUTHORIZATION;
    use actix_web::{App, test};
    use mockall::predicate::eq;
    use rstest::rstest;

    const CALLER: i64 = 7;

    fn id(raw: i64) -> UserId {
        UserId::new(raw).expect("valid id")
    }

    fn signed_in_tokens() -> MockTokenCommand {
        let mut tokens = MockTokenCommand::new();
        tokens
            .expect_authenticate_bearer()
            .returning(|_| Ok(UserId::new(CALLER).expect("valid id")));
        tokens
    }

    fn caller_identities() -> MockIdentityQuery {
        let mut identities = MockIdentityQuery::new();
        identities
            .expect_resolve()
            .with(eq(id(CALLER)))
            .returning(|id| Ok(sample_user(id.get())));
        identities
    }

    async fn call(
        tokens: MockTokenCommand,
        identities: MockIdentityQuery,
        registration: MockRegistrationCommand,
        accounts: MockAccountCommand,
        req: test::TestRequest,
    ) -> actix_web::dev::ServiceResponse {
        let state = full_state(tokens, identities, registration, accounts);
        let app = test::init_service(
            App::new().app_data(web::Data::new(state)).service(
                web::scope("/v1")
                    .service(current_user)
                    .service(activate_user)
                    .service(get_user)
                    .service(delete_user),
            ),
        )
        .await;
        test::call_service(&app, req.to_request()).await
    }

    fn bearer(req: test::TestRequest) -> test::TestRequest {
        req.insert_header((AUTHORIZATION, "Bearer token"))
    }

    #[rstest]
    #[actix_web::test]
    async fn me_returns_the_caller() {
        let res = call(
            signed_in_tokens(),
            caller_identities(),
            MockRegistrationCommand::new(),
            MockAccountCommand::new(),
            bearer(test::TestRequest::get().uri("/v1/users/me")),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["id"], CALLER);
        assert!(body.get("passwordHash").is_none());
    }

    #[rstest]
    #[actix_web::test]
    async fn get_user_resolves_through_the_directory() {
        let mut identities = caller_identities();
        identities
            .expect_resolve()
            .with(eq(id(12)))
            .times(1)
            .returning(|id| Ok(sample_user(id.get())));

        let res = call(
            signed_in_tokens(),
            identities,
            MockRegistrationCommand::new(),
            MockAccountCommand::new(),
            bearer(test::TestRequest::get().uri("/v1/users/12")),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["id"], 12);
    }

    #[rstest]
    #[actix_web::test]
    async fn get_user_requires_a_bearer_token() {
        let res = call(
            MockTokenCommand::new(),
            MockIdentityQuery::new(),
            MockRegistrationCommand::new(),
            MockAccountCommand::new(),
            test::TestRequest::get().uri("/v1/users/12"),
        )
        .await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[actix_web::test]
    async fn get_user_rejects_non_numeric_ids() {
        let res = call(
            signed_in_tokens(),
            caller_identities(),
            MockRegistrationCommand::new(),
            MockAccountCommand::new(),
            bearer(test::TestRequest::get().uri("/v1/users/abc")),
        )
        .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[rstest]
    #[case(Ok(()), StatusCode::NO_CONTENT)]
    #[case(Err(Error::forbidden("forbidden")), StatusCode::FORBIDDEN)]
    #[case(Err(Error::not_found("user not found")), StatusCode::NOT_FOUND)]
    #[actix_web::test]
    async fn delete_maps_the_service_outcome(
        #[case] outcome: Result<(), Error>,
        #[case] expected: StatusCode,
    ) {
        let mut accounts = MockAccountCommand::new();
        accounts
            .expect_delete_account()
            .withf(|actor, target| actor.id().get() == CALLER && target.get() == 30)
            .times(1)
            .return_once(move |_, _| outcome);

        let res = call(
            signed_in_tokens(),
            caller_identities(),
            MockRegistrationCommand::new(),
            accounts,
            bearer(test::TestRequest::delete().uri("/v1/users/30")),
        )
        .await;

        assert_eq!(res.status(), expected);
    }

    #[rstest]
    #[actix_web::test]
    async fn activation_needs_no_bearer_token() {
        let mut registration = MockRegistrationCommand::new();
        registration
            .expect_activate()
            .withf(|token| token.expose() == "abc-123")
            .times(1)
            .returning(|_| Ok(sample_user(4).activated()));

        let res = call(
            MockTokenCommand::new(),
            MockIdentityQuery::new(),
            registration,
            MockAccountCommand::new(),
            test::TestRequest::put().uri("/v1/users/activate/abc-123"),
        )
        .await;

        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }

    #[rstest]
    #[actix_web::test]
    async fn unknown_activation_token_is_not_found() {
        let mut registration = MockRegistrationCommand::new();
        registration
            .expect_activate()
            .returning(|_| Err(Error::not_found("invitation not found")));

        let res = call(
            MockTokenCommand::new(),
            MockIdentityQuery::new(),
            registration,
            MockAccountCommand::new(),
            test::TestRequest::put().uri("/v1/users/activate/stale"),
        )
        .await;

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let err: Error = test::read_body_json(res).await;
        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
