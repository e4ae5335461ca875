//! Sign-up and token endpoints.
//!
//! ```text
//! POST /v1/authentication/user  {"username":"ada","email":"ada@example.com","password":"secret"}
//! POST /v1/authentication/token {"email":"ada@example.com","password":"secret"}
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{Error, LoginCredentials, RegistrationRequest, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::map_user_validation_error;

/// Body of `POST /v1/authentication/user`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserRequest {
    #[schema(example = "ada")]
    pub username: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[schema(example = "correct horse")]
    pub password: String,
}

/// Pending account plus the plaintext activation token.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredUserResponse {
    pub user: User,
    pub token: String,
}

/// Body of `POST /v1/authentication/token`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTokenRequest {
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[schema(example = "correct horse")]
    pub password: String,
}

/// Signed bearer token.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub token: String,
}

/// Register a pending account and mail its activation link.
#[utoipa::path(
    post,
    path = "/v1/authentication/user",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "User registered", body = RegisteredUserResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Email or username already taken", body = Error),
        (status = 429, description = "Too many requests", body = Error),
        (status = 503, description = "Activation email could not be delivered", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["authentication"],
    operation_id = "registerUser",
    security([])
)]
#[post("/authentication/user")]
pub async fn register_user(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterUserRequest>,
) -> ApiResult<HttpResponse> {
    let RegisterUserRequest {
        username,
        email,
        password,
    } = payload.into_inner();
    let request = RegistrationRequest::try_from_parts(&username, &email, &password)
        .map_err(map_user_validation_error)?;
    let registered = state.registration.register(&request).await?;
    Ok(HttpResponse::Created().json(RegisteredUserResponse {
        token: registered.token.expose().to_owned(),
        user: registered.user,
    }))
}

/// Exchange credentials for a bearer token.
#[utoipa::path(
    post,
    path = "/v1/authentication/token",
    request_body = CreateTokenRequest,
    responses(
        (status = 201, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 429, description = "Too many requests", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["authentication"],
    operation_id = "createToken",
    security([])
)]
#[post("/authentication/token")]
pub async fn create_token(
    state: web::Data<HttpState>,
    payload: web::Json<CreateTokenRequest>,
) -> ApiResult<HttpResponse> {
    let credentials = LoginCredentials::try_from_parts(&payload.email, &payload.password)
        .map_err(map_user_validation_error)?;
    let token = state.tokens.create_token(&credentials).await?;
    Ok(HttpResponse::Created().json(TokenResponse { token }))
}
