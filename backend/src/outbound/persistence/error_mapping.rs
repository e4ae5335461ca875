//! Diesel and pool failures translated into port error variants.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::{RoleRepositoryError, UserPersistenceError};

use super::pool::PoolError;

const EMAIL_CONSTRAINT: &str = "users_email_key";
const USERNAME_CONSTRAINT: &str = "users_username_key";

fn log_diesel_error(error: &DieselError) {
    match error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), constraint = ?info.constraint_name(), "diesel operation failed");
        }
        _ => debug!(error = %error, "diesel operation failed"),
    }
}

pub(crate) fn map_pool_error(error: PoolError) -> UserPersistenceError {
    UserPersistenceError::connection(error.message())
}

/// `NotFound` surfaces as the port's not-found variant; callers use
/// `.optional()` where absence is not an error.
pub(crate) fn map_diesel_error(error: DieselError) -> UserPersistenceError {
    log_diesel_error(&error);
    match error {
        DieselError::NotFound => UserPersistenceError::not_found(),
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            match info.constraint_name() {
                Some(EMAIL_CONSTRAINT) => UserPersistenceError::duplicate_email(),
                Some(USERNAME_CONSTRAINT) => UserPersistenceError::duplicate_username(),
                _ => UserPersistenceError::query("unique constraint violated"),
            }
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            UserPersistenceError::connection("database connection error")
        }
        DieselError::QueryBuilderError(_) => UserPersistenceError::query("database query error"),
        _ => UserPersistenceError::query("database error"),
    }
}

pub(crate) fn map_role_pool_error(error: PoolError) -> RoleRepositoryError {
    RoleRepositoryError::connection(error.message())
}

pub(crate) fn map_role_diesel_error(error: DieselError) -> RoleRepositoryError {
    log_diesel_error(&error);
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            RoleRepositoryError::connection("database connection error")
        }
        _ => RoleRepositoryError::query("database error"),
    }
}
