//! Role-precedence authorization.
//!
//! Actors may always act on resources they own. Otherwise their role must be
//! at least as privileged as the role required for the action. Ownership is
//! checked first so the common case never touches the role store.

use std::sync::Arc;

use tracing::{debug, error};

use super::port_errors::map_role_error;
use super::ports::{RoleRepository, RoleRepositoryError};
use super::{Error, Role, RoleName, User, UserId};

/// Failure while evaluating role precedence.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PrecedenceError {
    /// The required role is not defined; a configuration problem, not a denial.
    #[error("required role `{0}` is not defined")]
    UnknownRole(RoleName),
    /// The role store failed.
    #[error(transparent)]
    Store(#[from] RoleRepositoryError),
}

/// Authorizer backed by the role hierarchy.
pub struct RoleAuthorizer<R: ?Sized> {
    roles: Arc<R>,
}

impl<R: ?Sized> Clone for RoleAuthorizer<R> {
    fn clone(&self) -> Self {
        Self {
            roles: Arc::clone(&self.roles),
        }
    }
}

impl<R> RoleAuthorizer<R>
where
    R: RoleRepository + ?Sized,
{
    /// Build an authorizer over `roles`.
    pub fn new(roles: Arc<R>) -> Self {
        Self { roles }
    }

    /// True when `caller` ranks at or above the role named `required`.
    ///
    /// # Errors
    /// [`PrecedenceError::UnknownRole`] when `required` names no role, kept
    /// distinct from a `false` decision.
    pub async fn has_precedence(
        &self,
        caller: &Role,
        required: &RoleName,
    ) -> Result<bool, PrecedenceError> {
        let required_role = self
            .roles
            .find_by_name(required)
            .await?
            .ok_or_else(|| PrecedenceError::UnknownRole(required.clone()))?;
        Ok(caller.outranks_or_equals(&required_role))
    }

    /// Allow `actor` to act on a resource owned by `owner`.
    pub async fn authorize_owned(
        &self,
        actor: &User,
        owner: UserId,
        required: &RoleName,
    ) -> Result<(), Error> {
        if actor.id() == owner {
            return Ok(());
        }

        match self.has_precedence(actor.role(), required).await {
            Ok(true) => Ok(()),
            Ok(false) => {
                debug!(actor = %actor.id(), %owner, %required, "role precedence denied");
                Err(Error::forbidden("forbidden"))
            }
            Err(PrecedenceError::UnknownRole(name)) => {
                error!(role = %name, "authorization references an undefined role");
                Err(Error::internal("authorization misconfigured"))
            }
            Err(PrecedenceError::Store(err)) => Err(map_role_error(err)),
        }
    }
}
