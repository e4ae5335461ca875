//! Request extractors establishing who is calling.
//!
//! [`AuthenticatedUser`] turns an `Authorization: Bearer` header into a
//! resolved [`User`]. [`OperatorAccess`] guards the operator surface with
//! HTTP Basic credentials compared in constant time.

use actix_web::dev::Payload;
use actix_web::http::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use actix_web::http::StatusCode;
use actix_web::{FromRequest, HttpRequest, HttpResponse, ResponseError, web};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use futures_util::future::{LocalBoxFuture, Ready, ready};
use subtle::ConstantTimeEq;
use tracing::{debug, error, warn};

use crate::domain::{Error, ErrorCode, User};

use super::state::{HttpState, OperatorCredentials};

const BASIC_CHALLENGE: &str = r#"Basic realm="restricted", charset="UTF-8""#;

fn split_scheme<'a>(req: &'a HttpRequest, scheme: &str) -> Option<&'a str> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (found, credentials) = value.split_once(' ')?;
    let credentials = credentials.trim();
    (found.eq_ignore_ascii_case(scheme) && !credentials.is_empty()).then_some(credentials)
}

fn bearer_token(req: &HttpRequest) -> Result<String, Error> {
    if !req.headers().contains_key(AUTHORIZATION) {
        return Err(Error::unauthorized("authorization header is missing"));
    }
    split_scheme(req, "Bearer")
        .map(str::to_owned)
        .ok_or_else(|| Error::unauthorized("authorization header is malformed"))
}

/// The caller identified by a valid bearer token.
///
/// Rejects with `401` when the header is absent, malformed, the token does
/// not validate, or its subject no longer resolves to an active account.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(User);

impl AuthenticatedUser {
    /// Resolved caller.
    pub fn user(&self) -> &User {
        &self.0
    }

    /// Take ownership of the resolved caller.
    pub fn into_inner(self) -> User {
        self.0
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        let token = bearer_token(req);
        Box::pin(async move {
            let state = state.ok_or_else(|| {
                error!("HttpState is not registered as app data");
                Error::internal("authentication is not configured")
            })?;
            let id = state.tokens.authenticate_bearer(&token?)?;
            match state.identities.resolve(id).await {
                Ok(user) => Ok(Self(user)),
                Err(err) if err.code() == ErrorCode::NotFound => {
                    debug!(user_id = %id, "token subject no longer resolves");
                    Err(Error::unauthorized("unauthorized"))
                }
                Err(err) => Err(err),
            }
        })
    }
}

/// Proof that the caller presented the operator Basic credentials.
#[derive(Debug, Clone, Copy)]
pub struct OperatorAccess;

/// Rejection carrying the Basic challenge header.
#[derive(Debug)]
pub struct OperatorChallenge;

impl std::fmt::Display for OperatorChallenge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("operator credentials required")
    }
}

impl ResponseError for OperatorChallenge {
    fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::Unauthorized()
            .insert_header((WWW_AUTHENTICATE, BASIC_CHALLENGE))
            .json(Error::unauthorized("unauthorized"))
    }
}

fn decode_basic(encoded: &str) -> Option<(String, String)> {
    let bytes = BASE64.decode(encoded).ok()?;
    let text = String::from_utf8(bytes).ok()?;
    let (user, password) = text.split_once(':')?;
    Some((user.to_owned(), password.to_owned()))
}

fn check_operator(req: &HttpRequest) -> Result<OperatorAccess, OperatorChallenge> {
    let Some(expected) = req.app_data::<web::Data<OperatorCredentials>>() else {
        error!("operator credentials are not registered as app data");
        return Err(OperatorChallenge);
    };
    let (user, password) = split_scheme(req, "Basic")
        .and_then(decode_basic)
        .ok_or(OperatorChallenge)?;

    let user_ok = user.as_bytes().ct_eq(expected.username().as_bytes());
    let password_ok = password.as_bytes().ct_eq(expected.password().as_bytes());
    if bool::from(user_ok & password_ok) {
        Ok(OperatorAccess)
    } else {
        warn!("operator credentials rejected");
        Err(OperatorChallenge)
    }
}

impl FromRequest for OperatorAccess {
    type Error = OperatorChallenge;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(check_operator(req))
    }
}
