//! The single failure type every gatekeeping operation returns.
//!
//! Nothing here knows about HTTP. `inbound::http::error` turns an
//! [`ErrorCode`] into a status line and hides `internal_error` messages.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::TraceId;

/// Failure category, serialised as `snake_case` in response bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Malformed body, path or field value.
    InvalidRequest,
    /// Missing, expired or rejected credentials.
    Unauthorized,
    /// Valid identity whose role does not dominate the target.
    Forbidden,
    /// Unknown, inactive or already redeemed.
    NotFound,
    /// Email or username already taken.
    Conflict,
    /// Fixed-window budget spent.
    RateLimited,
    /// The credential store, identity cache or mail provider failed.
    ServiceUnavailable,
    /// Bug or invariant breach; the message never leaves the process.
    InternalError,
}

/// Error body shared by services and adapters.
///
/// Construction reads [`TraceId::current`], so an error raised anywhere
/// inside a traced request already knows its request.
///
/// # Examples
/// ```
/// use socialgate::domain::{Error, ErrorCode};
///
/// let err = Error::not_found("user not found");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// assert!(err.trace_id().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Error {
    #[schema(example = "invalid_request")]
    code: ErrorCode,
    #[schema(example = "Something went wrong")]
    message: String,
    /// Request that raised the error, when one was in scope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Machine-readable extras: the offending field or the retry delay.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl Error {
    /// Build an error stamped with the in-scope trace id.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            trace_id: TraceId::current().map(|id| id.to_string()),
            details: None,
        }
    }

    /// Failure category.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Message shown to the caller.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Trace id captured at construction.
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    /// Structured extras, if any.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Override the captured trace id.
    pub fn with_trace_id(mut self, id: impl Into<String>) -> Self {
        self.trace_id = Some(id.into());
        self
    }

    /// Replace the structured extras.
    ///
    /// # Examples
    /// ```
    /// use socialgate::domain::Error;
    /// use serde_json::json;
    ///
    /// let err = Error::invalid_request("bad")
    ///     .with_details(json!({ "field": "email", "code": "invalid_email" }));
    /// assert!(err.details().is_some());
    /// ```
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Rejected input.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Caller could not be authenticated.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Caller is authenticated but outranked.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    /// Target does not exist for this caller.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Uniqueness violation.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    /// Throttled; attach the wait via [`Self::with_details`].
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::RateLimited, message)
    }

    /// A backing service failed.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    /// Unexpected failure; redacted on the wire.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}
