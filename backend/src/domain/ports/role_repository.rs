//! Port for reading the role hierarchy.
use async_trait::async_trait;

use crate::domain::{Role, RoleName, seeded_roles};

use super::define_port_error;

define_port_error! {
    /// Errors raised by role repository adapters.
    pub enum RoleRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "role repository connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } => "role repository query failed: {message}",
        /// The lookup exceeded its deadline.
        Timeout => "role repository lookup timed out",
    }
}

/// Read-only access to roles by name.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Look up a role; `None` when no role carries `name`.
    async fn find_by_name(&self, name: &RoleName) -> Result<Option<Role>, RoleRepositoryError>;
}

/// In-memory role table holding the seeded hierarchy.
#[derive(Debug, Clone)]
pub struct FixtureRoleRepository {
    roles: Vec<Role>,
}

impl Default for FixtureRoleRepository {
    fn default() -> Self {
        Self {
            roles: seeded_roles(),
        }
    }
}

#[async_trait]
impl RoleRepository for FixtureRoleRepository {
    async fn find_by_name(&self, name: &RoleName) -> Result<Option<Role>, RoleRepositoryError> {
        Ok(self.roles.iter().find(|role| role.name() == name).cloned())
    }
}
