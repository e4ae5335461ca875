//! Driving port for sign-up and account activation.
use async_trait::async_trait;

use crate::domain::{Error, InvitationToken, RegistrationRequest, User};

/// Outcome of a successful registration.
#[derive(Debug, Clone)]
pub struct RegisteredUser {
    /// The pending (inactive) account.
    pub user: User,
    /// Plaintext invitation token that was mailed to the user.
    pub token: InvitationToken,
}

/// Use-case port for the registration saga and invitation redemption.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistrationCommand: Send + Sync {
    /// Create a pending account and deliver its activation email.
    async fn register(&self, request: &RegistrationRequest) -> Result<RegisteredUser, Error>;

    /// Redeem a plaintext invitation token.
    async fn activate(&self, token: &InvitationToken) -> Result<User, Error>;
}
