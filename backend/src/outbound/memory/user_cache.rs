//! Process-local identity cache with per-entry expiry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;

use crate::domain::ports::{UserCache, UserCacheError};
use crate::domain::{User, UserId};

/// In-memory [`UserCache`] used when no Redis URL is configured.
pub struct InMemoryUserCache {
    entries: Mutex<HashMap<UserId, (User, DateTime<Utc>)>>,
    ttl: TimeDelta,
    clock: Arc<dyn Clock>,
}

impl InMemoryUserCache {
    /// Cache whose entries live for `ttl`.
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
            clock,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<UserId, (User, DateTime<Utc>)>>, UserCacheError> {
        self.entries
            .lock()
            .map_err(|_| UserCacheError::backend("in-memory cache lock poisoned"))
    }
}

#[async_trait]
impl UserCache for InMemoryUserCache {
    async fn get(&self, id: UserId) -> Result<Option<User>, UserCacheError> {
        let now = self.clock.utc();
        let mut entries = self.lock()?;
        match entries.get(&id) {
            Some((user, expires_at)) if *expires_at > now => Ok(Some(user.clone())),
            Some(_) => {
                entries.remove(&id);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, user: &User) -> Result<(), UserCacheError> {
        let expires_at = self
            .clock
            .utc()
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.lock()?.insert(user.id(), (user.clone(), expires_at));
        Ok(())
    }

    async fn delete(&self, id: UserId) -> Result<(), UserCacheError> {
        self.lock()?.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MutableClock, fixed_now, sample_user};
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn entries_expire_after_ttl() {
        let clock = Arc::new(MutableClock::new(fixed_now()));
        let cache = InMemoryUserCache::new(Duration::from_secs(60), clock.clone());
        let user = sample_user(3);

        cache.set(&user).await.expect("set");
        clock.advance(Duration::from_secs(59));
        assert_eq!(cache.get(user.id()).await.expect("get"), Some(user.clone()));

        clock.advance(Duration::from_secs(1));
        assert_eq!(cache.get(user.id()).await.expect("get"), None);
    }

    #[rstest]
    #[tokio::test]
    async fn delete_removes_entry() {
        let cache = InMemoryUserCache::new(
            Duration::from_secs(60),
            Arc::new(MutableClock::new(fixed_now())),
        );
        let user = sample_user(3);
        cache.set(&user).await.expect("set");
        cache.delete(user.id()).await.expect("delete");
        assert_eq!(cache.get(user.id()).await.expect("get"), None);
    }
}
