//! Port interface for the volatile identity cache.
use async_trait::async_trait;

use crate::domain::{User, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors surfaced by the caching adapter.
    ///
    /// None of these mean "absent": a miss is `Ok(None)`.
    pub enum UserCacheError {
        /// Cache backend is unavailable or refused the command.
        Backend { message: String } => "user cache backend failure: {message}",
        /// The command exceeded its deadline.
        Timeout => "user cache command timed out",
        /// Serialisation or deserialisation of cached content failed.
        Serialization { message: String } => "user cache serialisation failed: {message}",
    }
}

/// Best-effort snapshot cache keyed by user identifier.
///
/// Entries expire after an adapter-defined time-to-live.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserCache: Send + Sync {
    /// Read a cached snapshot.
    async fn get(&self, id: UserId) -> Result<Option<User>, UserCacheError>;

    /// Store a snapshot, replacing any existing entry.
    async fn set(&self, user: &User) -> Result<(), UserCacheError>;

    /// Drop the entry for `id`; absent entries are not an error.
    async fn delete(&self, id: UserId) -> Result<(), UserCacheError>;
}
