//! Driving port resolving a numeric identity to a full user snapshot.
use async_trait::async_trait;

use crate::domain::{Error, User, UserId};

/// Use-case port backing bearer authentication and profile reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityQuery: Send + Sync {
    /// Resolve `id`, failing with `not_found` when no active user has it.
    async fn resolve(&self, id: UserId) -> Result<User, Error>;

    /// Forget any cached snapshot for `id`.
    async fn invalidate(&self, id: UserId) -> Result<(), Error>;
}
