//! Fixed-window request throttling.
//!
//! One window per caller key. A window admits `requests` calls; once its
//! duration has elapsed the next call opens a fresh window. Bursts of up to
//! twice the configured rate are possible across a window boundary.
//!
//! Each key's read-modify-write happens under its `DashMap` shard lock, so
//! overlapping requests for the same key cannot lose increments.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use mockable::Clock;

/// Quota applied to every caller key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Calls admitted per window.
    pub requests: u32,
    /// Window length.
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests: 20,
            window: Duration::from_secs(5),
        }
    }
}

/// Outcome of [`FixedWindowRateLimiter::allow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    /// The call fits in the current window.
    Allowed {
        /// Calls left before the window is exhausted.
        remaining: u32,
    },
    /// The window is exhausted.
    Denied {
        /// Time until the window resets; always positive.
        retry_after: Duration,
    },
}

impl RateDecision {
    /// True for [`RateDecision::Allowed`].
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }
}

#[derive(Debug, Clone, Copy)]
struct RateWindow {
    started_at: DateTime<Utc>,
    count: u32,
}

/// In-process fixed-window limiter keyed by caller identifier.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// use mockable::DefaultClock;
/// use socialgate::domain::{FixedWindowRateLimiter, RateLimitConfig};
///
/// let limiter = FixedWindowRateLimiter::new(
///     RateLimitConfig { requests: 1, window: Duration::from_secs(60) },
///     Arc::new(DefaultClock),
/// );
/// assert!(limiter.allow("10.0.0.1").is_allowed());
/// assert!(!limiter.allow("10.0.0.1").is_allowed());
/// assert!(limiter.allow("10.0.0.2").is_allowed());
/// ```
pub struct FixedWindowRateLimiter {
    config: RateLimitConfig,
    windows: DashMap<String, RateWindow>,
    clock: Arc<dyn Clock>,
}

impl FixedWindowRateLimiter {
    /// Build a limiter reading time from `clock`.
    pub fn new(config: RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            windows: DashMap::new(),
            clock,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> RateLimitConfig {
        self.config
    }

    /// Record a call from `key` and decide whether to admit it.
    pub fn allow(&self, key: &str) -> RateDecision {
        let now = self.clock.utc();
        let mut entry = self
            .windows
            .entry(key.to_owned())
            .or_insert(RateWindow {
                started_at: now,
                count: 0,
            });
        let window = entry.value_mut();

        let mut elapsed = elapsed_since(window.started_at, now);
        if elapsed >= self.config.window {
            window.started_at = now;
            window.count = 0;
            elapsed = Duration::ZERO;
        }

        window.count = window.count.saturating_add(1);
        if window.count <= self.config.requests {
            RateDecision::Allowed {
                remaining: self.config.requests - window.count,
            }
        } else {
            RateDecision::Denied {
                retry_after: self.config.window.saturating_sub(elapsed),
            }
        }
    }

    /// Drop windows that have fully elapsed; returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.utc();
        let before = self.windows.len();
        self.windows
            .retain(|_, window| elapsed_since(window.started_at, now) < self.config.window);
        before.saturating_sub(self.windows.len())
    }

    /// Number of caller keys currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }
}

fn elapsed_since(started_at: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    // A clock stepping backwards counts as no time elapsed.
    now.signed_duration_since(started_at)
        .to_std()
        .unwrap_or(Duration::ZERO)
}
