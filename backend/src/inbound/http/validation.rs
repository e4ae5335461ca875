//! Shared validation helpers for inbound HTTP adapters.

use serde_json::json;

use crate::domain::{Error, UserId, UserValidationError};

/// Map a domain validation failure onto a `400` naming the violated field.
pub(crate) fn map_user_validation_error(err: UserValidationError) -> Error {
    Error::invalid_request(err.to_string()).with_details(json!({
        "field": err.field(),
        "code": err.code(),
    }))
}

/// Parse a path segment into a [`UserId`].
pub(crate) fn parse_user_id(raw: &str) -> Result<UserId, Error> {
    raw.parse::<UserId>().map_err(map_user_validation_error)
}
