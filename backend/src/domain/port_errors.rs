//! Translation of driven-port failures into domain errors.
//!
//! Causes are logged here with full detail; the returned [`Error`] carries
//! only a caller-safe message.

use serde_json::json;
use tracing::{error, warn};

use super::Error;
use super::ports::{RoleRepositoryError, UserCacheError, UserPersistenceError};

pub(crate) fn map_user_persistence_error(err: UserPersistenceError) -> Error {
    match err {
        UserPersistenceError::Connection { message } => {
            error!(error = %message, "user store connection failed");
            Error::service_unavailable("user store unavailable")
        }
        UserPersistenceError::Timeout { operation } => {
            warn!(%operation, "user store call timed out");
            Error::service_unavailable("user store unavailable")
        }
        UserPersistenceError::Query { message } => {
            error!(error = %message, "user store query failed");
            Error::internal("user store query failed")
        }
        UserPersistenceError::DuplicateEmail => Error::conflict("a user with that email already exists")
            .with_details(json!({ "field": "email", "code": "duplicate" })),
        UserPersistenceError::DuplicateUsername => {
            Error::conflict("a user with that username already exists")
                .with_details(json!({ "field": "username", "code": "duplicate" }))
        }
        UserPersistenceError::NotFound => Error::not_found("user not found"),
    }
}

pub(crate) fn map_user_cache_error(err: UserCacheError) -> Error {
    match err {
        UserCacheError::Backend { message } => {
            error!(error = %message, "user cache backend failed");
            Error::service_unavailable("user cache unavailable")
        }
        UserCacheError::Timeout => {
            warn!("user cache call timed out");
            Error::service_unavailable("user cache unavailable")
        }
        UserCacheError::Serialization { message } => {
            error!(error = %message, "user cache entry could not be decoded");
            Error::internal("user cache entry is corrupt")
        }
    }
}

pub(crate) fn map_role_error(err: RoleRepositoryError) -> Error {
    match err {
        RoleRepositoryError::Connection { message } => {
            error!(error = %message, "role store connection failed");
            Error::service_unavailable("role store unavailable")
        }
        RoleRepositoryError::Timeout => {
            warn!("role lookup timed out");
            Error::service_unavailable("role store unavailable")
        }
        RoleRepositoryError::Query { message } => {
            error!(error = %message, "role lookup failed");
            Error::internal("role lookup failed")
        }
    }
}
