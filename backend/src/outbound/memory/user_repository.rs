//! Process-local credential store.
//!
//! Every operation runs under one mutex, which gives the multi-step writes
//! the same all-or-nothing behaviour the database adapter gets from a
//! transaction.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::{Clock, DefaultClock};

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{
    EmailAddress, InvitationTokenHash, NewInvitation, NewUser, PasswordHash, Role, User,
    UserCredentials, UserId, seeded_roles,
};

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    password_hash: PasswordHash,
}

#[derive(Debug, Clone)]
struct StoredInvitation {
    token_hash: InvitationTokenHash,
    user_id: UserId,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct MemoryState {
    last_id: i64,
    users: BTreeMap<UserId, StoredUser>,
    invitations: Vec<StoredInvitation>,
}

/// In-memory [`UserRepository`] seeded with the default role hierarchy.
pub struct InMemoryUserRepository {
    state: Mutex<MemoryState>,
    roles: Vec<Role>,
    clock: Arc<dyn Clock>,
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new(Arc::new(DefaultClock))
    }
}

impl InMemoryUserRepository {
    /// Empty store stamping creation times from `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            roles: seeded_roles(),
            clock,
        }
    }

    /// Number of outstanding invitations across all users.
    pub fn invitation_count(&self) -> usize {
        self.lock().map_or(0, |state| state.invitations.len())
    }

    /// Whether any record, active or pending, exists for `id`.
    pub fn contains(&self, id: UserId) -> bool {
        self.lock().is_ok_and(|state| state.users.contains_key(&id))
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, UserPersistenceError> {
        self.state
            .lock()
            .map_err(|_| UserPersistenceError::query("in-memory user store lock poisoned"))
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create_and_invite(
        &self,
        user: &NewUser,
        invitation: &NewInvitation,
    ) -> Result<User, UserPersistenceError> {
        let mut state = self.lock()?;
        let existing = state.users.values().map(|stored| &stored.user);
        for other in existing {
            if other.email() == &user.email {
                return Err(UserPersistenceError::duplicate_email());
            }
            if other.username() == &user.username {
                return Err(UserPersistenceError::duplicate_username());
            }
        }
        let role = self
            .roles
            .iter()
            .find(|role| role.name() == &user.role_name)
            .cloned()
            .ok_or_else(|| UserPersistenceError::query(format!("role {} missing", user.role_name)))?;

        let id = UserId::new(state.last_id + 1)
            .map_err(|err| UserPersistenceError::query(err.to_string()))?;
        let created = User::new(
            id,
            user.username.clone(),
            user.email.clone(),
            false,
            role,
            self.clock.utc(),
        );
        state.last_id = id.get();
        state.users.insert(
            id,
            StoredUser {
                user: created.clone(),
                password_hash: user.password_hash.clone(),
            },
        );
        state.invitations.push(StoredInvitation {
            token_hash: invitation.token_hash.clone(),
            user_id: id,
            expires_at: invitation.expires_at,
        });
        Ok(created)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let state = self.lock()?;
        Ok(state
            .users
            .get(&id)
            .filter(|stored| stored.user.is_active())
            .map(|stored| stored.user.clone()))
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserCredentials>, UserPersistenceError> {
        let state = self.lock()?;
        Ok(state
            .users
            .values()
            .find(|stored| stored.user.is_active() && stored.user.email() == email)
            .map(|stored| UserCredentials {
                user: stored.user.clone(),
                password_hash: stored.password_hash.clone(),
            }))
    }

    async fn activate(
        &self,
        token_hash: &InvitationTokenHash,
        now: DateTime<Utc>,
    ) -> Result<User, UserPersistenceError> {
        let mut state = self.lock()?;
        let user_id = state
            .invitations
            .iter()
            .find(|invite| &invite.token_hash == token_hash && invite.expires_at > now)
            .map(|invite| invite.user_id)
            .ok_or_else(UserPersistenceError::not_found)?;
        let stored = state
            .users
            .get_mut(&user_id)
            .ok_or_else(UserPersistenceError::not_found)?;
        stored.user = stored.user.clone().activated();
        let activated = stored.user.clone();
        state.invitations.retain(|invite| invite.user_id != user_id);
        Ok(activated)
    }

    async fn delete(&self, id: UserId) -> Result<(), UserPersistenceError> {
        let mut state = self.lock()?;
        if state.users.remove(&id).is_none() {
            return Err(UserPersistenceError::not_found());
        }
        state.invitations.retain(|invite| invite.user_id != id);
        Ok(())
    }
}
