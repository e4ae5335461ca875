//! Cache-aside identity directory.
//!
//! Resolution reads the cache first and falls through to the credential store
//! on a miss, repopulating the cache on the way out. Store "not found" is
//! never cached. Concurrent misses for the same identity may each repopulate
//! the entry; the write is idempotent.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::ports::{IdentityQuery, UserCache, UserRepository};
use super::port_errors::{map_user_cache_error, map_user_persistence_error};
use super::{Error, User, UserId};

/// Resolves user identities through an optional cache.
pub struct IdentityDirectory<R: ?Sized, C: ?Sized> {
    store: Arc<R>,
    cache: Option<Arc<C>>,
}

impl<R: ?Sized, C: ?Sized> Clone for IdentityDirectory<R, C> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            cache: self.cache.clone(),
        }
    }
}

impl<R, C> IdentityDirectory<R, C>
where
    R: UserRepository + ?Sized,
    C: UserCache + ?Sized,
{
    /// Directory fronted by `cache`; pass `None` to disable caching.
    pub fn new(store: Arc<R>, cache: Option<Arc<C>>) -> Self {
        Self { store, cache }
    }

    /// Whether lookups go through a cache.
    pub fn is_cached(&self) -> bool {
        self.cache.is_some()
    }

    async fn load(&self, id: UserId) -> Result<User, Error> {
        self.store
            .find_by_id(id)
            .await
            .map_err(map_user_persistence_error)?
            .ok_or_else(|| Error::not_found("user not found"))
    }
}

#[async_trait]
impl<R, C> IdentityQuery for IdentityDirectory<R, C>
where
    R: UserRepository + ?Sized,
    C: UserCache + ?Sized,
{
    async fn resolve(&self, id: UserId) -> Result<User, Error> {
        let Some(cache) = &self.cache else {
            return self.load(id).await;
        };

        if let Some(user) = cache.get(id).await.map_err(map_user_cache_error)? {
            debug!(user_id = %id, "identity cache hit");
            return Ok(user);
        }

        let user = self.load(id).await?;
        if let Err(err) = cache.set(&user).await {
            warn!(user_id = %id, error = %err, "failed to repopulate identity cache");
        }
        Ok(user)
    }

    async fn invalidate(&self, id: UserId) -> Result<(), Error> {
        match &self.cache {
            Some(cache) => cache.delete(id).await.map_err(map_user_cache_error),
            None => Ok(()),
        }
    }
}
