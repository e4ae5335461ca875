//! Account mutations guarded by ownership-or-precedence.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use super::authorization::RoleAuthorizer;
use super::port_errors::map_user_persistence_error;
use super::ports::{AccountCommand, IdentityQuery, RoleRepository, UserRepository};
use super::{Error, RoleName, User, UserId};

/// Implements [`AccountCommand`].
pub struct AccountService<U: ?Sized, R: ?Sized> {
    users: Arc<U>,
    authorizer: RoleAuthorizer<R>,
    identities: Arc<dyn IdentityQuery>,
}

impl<U, R> AccountService<U, R>
where
    U: UserRepository + ?Sized,
    R: RoleRepository + ?Sized,
{
    /// Build the service; `identities` is told about deletions.
    pub fn new(
        users: Arc<U>,
        authorizer: RoleAuthorizer<R>,
        identities: Arc<dyn IdentityQuery>,
    ) -> Self {
        Self {
            users,
            authorizer,
            identities,
        }
    }
}

#[async_trait]
impl<U, R> AccountCommand for AccountService<U, R>
where
    U: UserRepository + ?Sized,
    R: RoleRepository + ?Sized,
{
    async fn delete_account(&self, actor: &User, target: UserId) -> Result<(), Error> {
        self.authorizer
            .authorize_owned(actor, target, &RoleName::admin())
            .await?;
        self.users
            .delete(target)
            .await
            .map_err(map_user_persistence_error)?;
        info!(actor = %actor.id(), %target, "account deleted");

        // The store write already happened; a stale entry expires with its TTL.
        if let Err(err) = self.identities.invalidate(target).await {
            warn!(%target, error = %err, "failed to invalidate cached identity");
        }
        Ok(())
    }
}
