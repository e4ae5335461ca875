//! Driving port for bearer token issuance and verification.
use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, UserId};

/// Use-case port exchanging credentials for tokens and tokens for identities.
///
/// Every credential failure is reported as the same `unauthorized` error.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenCommand: Send + Sync {
    /// Verify credentials and mint a signed token.
    async fn create_token(&self, credentials: &LoginCredentials) -> Result<String, Error>;

    /// Validate a presented bearer token and return its subject.
    fn authenticate_bearer(&self, token: &str) -> Result<UserId, Error>;
}
