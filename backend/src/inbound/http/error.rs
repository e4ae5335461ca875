//! Rendering of [`Error`] as an HTTP response.
//!
//! Every failure leaves as the same JSON body with a `trace-id` header.
//! Throttled responses also carry `Retry-After`.

use actix_web::http::header::{self, HeaderValue};
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::Value;
use tracing::error;

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Handler return type.
pub type ApiResult<T> = Result<T, Error>;

/// Key inside a rate-limited error's details carrying the wait in seconds.
pub const RETRY_AFTER_DETAIL: &str = "retryAfterSeconds";

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn public_body(error: &Error) -> Error {
    if error.code() != ErrorCode::InternalError {
        return error.clone();
    }
    let body = Error::internal("Internal server error");
    match error.trace_id() {
        Some(id) => body.with_trace_id(id),
        None => body,
    }
}

fn retry_after(error: &Error) -> Option<u64> {
    if error.code() != ErrorCode::RateLimited {
        return None;
    }
    error
        .details()
        .and_then(|details| details.get(RETRY_AFTER_DETAIL))
        .and_then(Value::as_u64)
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::build(self.status_code());
        if let Some(seconds) = retry_after(self) {
            response.insert_header((header::RETRY_AFTER, HeaderValue::from(seconds)));
        }
        if let Some(id) = self.trace_id() {
            response.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        response.json(public_body(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "unhandled framework error");
        Error::internal("Internal server error")
    }
}
