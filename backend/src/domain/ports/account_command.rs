//! Driving port for mutations on existing accounts.
use async_trait::async_trait;

use crate::domain::{Error, User, UserId};

/// Use-case port for account removal under ownership-or-precedence rules.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Delete `target` on behalf of `actor`.
    async fn delete_account(&self, actor: &User, target: UserId) -> Result<(), Error>;
}
