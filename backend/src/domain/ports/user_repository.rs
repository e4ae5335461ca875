//! Credential store port: the system of record for accounts and invitations.
//!
//! Multi-step writes (`create_and_invite`, `activate`, `delete`) are atomic in
//! every adapter. Lookups return only activated accounts.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    EmailAddress, InvitationTokenHash, NewInvitation, NewUser, User, UserCredentials, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// The operation exceeded its deadline.
        Timeout { operation: String } => "user repository {operation} timed out",
        /// Another account already uses this email.
        DuplicateEmail => "a user with that email already exists",
        /// Another account already uses this username.
        DuplicateUsername => "a user with that username already exists",
        /// The targeted account or invitation does not exist.
        NotFound => "user not found",
    }
}

/// Driven port over the credential store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a pending user and its invitation in one transaction.
    async fn create_and_invite(
        &self,
        user: &NewUser,
        invitation: &NewInvitation,
    ) -> Result<User, UserPersistenceError>;

    /// Fetch an active user by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch an active user with their password hash.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserCredentials>, UserPersistenceError>;

    /// Redeem an unexpired invitation: activate its owner and drop every
    /// invitation they hold, in one transaction.
    ///
    /// Unknown and expired hashes both yield [`UserPersistenceError::NotFound`].
    async fn activate(
        &self,
        token_hash: &InvitationTokenHash,
        now: DateTime<Utc>,
    ) -> Result<User, UserPersistenceError>;

    /// Delete a user and their invitations in one transaction.
    async fn delete(&self, id: UserId) -> Result<(), UserPersistenceError>;
}
