//! PostgreSQL-backed [`RoleRepository`].

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{RoleRepository, RoleRepositoryError};
use crate::domain::{Role, RoleName};

use super::error_mapping::{map_role_diesel_error, map_role_pool_error};
use super::models::RoleRow;
use super::pool::{DbPool, bounded};
use super::schema::roles;

/// Reads roles seeded by the initial migration.
#[derive(Clone)]
pub struct DieselRoleRepository {
    pool: DbPool,
}

impl DieselRoleRepository {
    /// Wrap a connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleRepository for DieselRoleRepository {
    async fn find_by_name(&self, name: &RoleName) -> Result<Option<Role>, RoleRepositoryError> {
        bounded(
            "find_role_by_name",
            async {
                let mut conn = self.pool.get().await.map_err(map_role_pool_error)?;
                let row: Option<RoleRow> = roles::table
                    .filter(roles::name.eq(name.as_ref()))
                    .select(RoleRow::as_select())
                    .first(&mut conn)
                    .await
                    .optional()
                    .map_err(map_role_diesel_error)?;
                row.map(|row| row.into_domain().map_err(RoleRepositoryError::query))
                    .transpose()
            },
            |_| RoleRepositoryError::timeout(),
        )
        .await
    }
}
