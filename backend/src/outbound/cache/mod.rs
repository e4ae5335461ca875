//! Redis-backed [`UserCache`] adapter.
//!
//! Snapshots are stored as JSON under namespaced keys (`user:v1:<id>`) so a
//! format change can bump the version instead of flushing the keyspace.
//! Every command is bounded by [`CACHE_TIMEOUT`].

use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::RedisConnectionManager;
use bb8_redis::bb8::Pool;
use bb8_redis::redis::AsyncCommands;

use crate::domain::ports::{UserCache, UserCacheError};
use crate::domain::{User, UserId};

/// Upper bound for one cache command, checkout included.
pub const CACHE_TIMEOUT: Duration = Duration::from_secs(2);

fn cache_key(id: UserId) -> String {
    format!("user:v1:{id}")
}

fn ttl_seconds(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

fn backend(err: impl std::fmt::Display) -> UserCacheError {
    UserCacheError::backend(err.to_string())
}

/// Pooled Redis cache with a fixed entry TTL.
#[derive(Clone)]
pub struct RedisUserCache {
    pool: Pool<RedisConnectionManager>,
    ttl: Duration,
}

impl RedisUserCache {
    /// Connect a pool to `url`; entries expire after `ttl`.
    ///
    /// # Errors
    ///
    /// Returns [`UserCacheError::Backend`] when the URL is invalid or the
    /// pool cannot be built.
    pub async fn connect(url: &str, ttl: Duration) -> Result<Self, UserCacheError> {
        let manager = RedisConnectionManager::new(url).map_err(backend)?;
        let pool = Pool::builder()
            .connection_timeout(CACHE_TIMEOUT)
            .build(manager)
            .await
            .map_err(backend)?;
        Ok(Self { pool, ttl })
    }

    async fn bounded<T>(
        &self,
        command: impl std::future::Future<Output = Result<T, UserCacheError>>,
    ) -> Result<T, UserCacheError> {
        tokio::time::timeout(CACHE_TIMEOUT, command)
            .await
            .unwrap_or_else(|_| Err(UserCacheError::timeout()))
    }
}

#[async_trait]
impl UserCache for RedisUserCache {
    async fn get(&self, id: UserId) -> Result<Option<User>, UserCacheError> {
        self.bounded(async {
            let mut conn = self.pool.get().await.map_err(backend)?;
            let raw: Option<String> = conn.get(cache_key(id)).await.map_err(backend)?;
            raw.map(|json| {
                serde_json::from_str(&json)
                    .map_err(|err| UserCacheError::serialization(err.to_string()))
            })
            .transpose()
        })
        .await
    }

    async fn set(&self, user: &User) -> Result<(), UserCacheError> {
        let json = serde_json::to_string(user)
            .map_err(|err| UserCacheError::serialization(err.to_string()))?;
        self.bounded(async {
            let mut conn = self.pool.get().await.map_err(backend)?;
            conn.set_ex::<_, _, ()>(cache_key(user.id()), json, ttl_seconds(self.ttl))
                .await
                .map_err(backend)
        })
        .await
    }

    async fn delete(&self, id: UserId) -> Result<(), UserCacheError> {
        self.bounded(async {
            let mut conn = self.pool.get().await.map_err(backend)?;
            conn.del::<_, ()>(cache_key(id)).await.map_err(backend)
        })
        .await
    }
}
