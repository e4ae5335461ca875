//! Shared test doubles for unit tests.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;

use crate::domain::{
    DeliverySleeper, EmailAddress, Role, RoleName, User, UserId, Username, seeded_roles,
};

/// Clock whose time only moves when a test advances it.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance(&self, delta: Duration) {
        let delta = match TimeDelta::from_std(delta) {
            Ok(delta) => delta,
            Err(error) => panic!("failed to convert Duration to TimeDelta: {error}"),
        };
        *self.lock_clock() += delta;
    }

    fn lock_clock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Sleeper that records requested delays and returns immediately.
#[derive(Default)]
pub struct RecordingSleeper(pub Mutex<Vec<Duration>>);

impl RecordingSleeper {
    pub fn recorded(&self) -> Vec<Duration> {
        match self.0.lock() {
            Ok(guard) => guard.clone(),
            Err(_) => panic!("sleeper mutex"),
        }
    }
}

#[async_trait]
impl DeliverySleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        match self.0.lock() {
            Ok(mut guard) => guard.push(duration),
            Err(_) => panic!("sleeper mutex"),
        }
    }
}

/// A fixed instant used across fixtures.
pub fn fixed_now() -> DateTime<Utc> {
    match Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).single() {
        Some(now) => now,
        None => panic!("fixture timestamp"),
    }
}

/// Active user `user<id>` holding the role named `role`.
pub fn sample_user_with_role(id: i64, role: &str) -> User {
    let role_name = match RoleName::new(role) {
        Ok(name) => name,
        Err(error) => panic!("fixture role name: {error}"),
    };
    let role = seeded_roles()
        .into_iter()
        .find(|candidate| candidate.name() == &role_name)
        .unwrap_or_else(|| Role::new(99, role_name, 0, "fixture"));
    match (
        UserId::new(id),
        Username::new(format!("user{id}")),
        EmailAddress::new(format!("user{id}@example.com")),
    ) {
        (Ok(id), Ok(username), Ok(email)) => {
            User::new(id, username, email, true, role, fixed_now())
        }
        _ => panic!("fixture user {id} must be valid"),
    }
}

/// Active user `user<id>` with the default role.
pub fn sample_user(id: i64) -> User {
    sample_user_with_role(id, "user")
}
