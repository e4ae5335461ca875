//! PostgreSQL-backed [`UserRepository`].
//!
//! Multi-step writes each run in one Diesel transaction. Every call is
//! bounded by [`QUERY_TIMEOUT`](super::QUERY_TIMEOUT).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::debug;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{
    EmailAddress, InvitationTokenHash, NewInvitation, NewUser, User, UserCredentials, UserId,
};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{
    NewInvitationRow, NewUserRow, RoleRow, UserRow, credentials_from_rows, user_from_rows,
};
use super::pool::{DbPool, bounded};
use super::schema::{roles, user_invitations, users};

/// Failure inside a transaction body.
#[derive(Debug)]
enum TxError {
    Diesel(diesel::result::Error),
    MissingRole(String),
}

impl From<diesel::result::Error> for TxError {
    fn from(value: diesel::result::Error) -> Self {
        Self::Diesel(value)
    }
}

fn map_tx_error(error: TxError) -> UserPersistenceError {
    match error {
        TxError::Diesel(err) => map_diesel_error(err),
        TxError::MissingRole(name) => {
            UserPersistenceError::query(format!("role {name} is not seeded"))
        }
    }
}

fn corrupt_row(message: String) -> UserPersistenceError {
    UserPersistenceError::query(format!("stored user row is invalid: {message}"))
}

fn timed_out(operation: &'static str) -> UserPersistenceError {
    UserPersistenceError::timeout(operation)
}

/// Diesel implementation of the credential store.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Wrap a connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn load_joined(
        conn: &mut diesel_async::AsyncPgConnection,
        id: i64,
    ) -> Result<(UserRow, RoleRow), diesel::result::Error> {
        users::table
            .inner_join(roles::table)
            .filter(users::id.eq(id))
            .select((UserRow::as_select(), RoleRow::as_select()))
            .first(conn)
            .await
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create_and_invite(
        &self,
        user: &NewUser,
        invitation: &NewInvitation,
    ) -> Result<User, UserPersistenceError> {
        bounded(
            "create_and_invite",
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                let (row, role) = conn
                    .transaction::<_, TxError, _>(|conn| {
                        async move {
                            let role: RoleRow = roles::table
                                .filter(roles::name.eq(user.role_name.as_ref()))
                                .select(RoleRow::as_select())
                                .first(conn)
                                .await
                                .optional()?
                                .ok_or_else(|| TxError::MissingRole(user.role_name.to_string()))?;

                            let row: UserRow = diesel::insert_into(users::table)
                                .values(&NewUserRow {
                                    username: user.username.as_ref(),
                                    email: user.email.as_ref(),
                                    password_hash: user.password_hash.as_phc(),
                                    is_active: false,
                                    role_id: role.id,
                                })
                                .returning(UserRow::as_returning())
                                .get_result(conn)
                                .await?;

                            diesel::insert_into(user_invitations::table)
                                .values(&NewInvitationRow {
                                    token_hash: invitation.token_hash.as_ref(),
                                    user_id: row.id,
                                    expires_at: invitation.expires_at,
                                })
                                .execute(conn)
                                .await?;

                            Ok((row, role))
                        }
                        .scope_boxed()
                    })
                    .await
                    .map_err(map_tx_error)?;
                user_from_rows(row, role).map_err(corrupt_row)
            },
            timed_out,
        )
        .await
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        bounded(
            "find_by_id",
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                let found: Option<(UserRow, RoleRow)> = users::table
                    .inner_join(roles::table)
                    .filter(users::id.eq(id.get()))
                    .filter(users::is_active.eq(true))
                    .select((UserRow::as_select(), RoleRow::as_select()))
                    .first(&mut conn)
                    .await
                    .optional()
                    .map_err(map_diesel_error)?;
                found
                    .map(|(user, role)| user_from_rows(user, role).map_err(corrupt_row))
                    .transpose()
            },
            timed_out,
        )
        .await
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserCredentials>, UserPersistenceError> {
        bounded(
            "find_by_email",
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                let found: Option<(UserRow, RoleRow)> = users::table
                    .inner_join(roles::table)
                    .filter(users::email.eq(email.as_ref()))
                    .filter(users::is_active.eq(true))
                    .select((UserRow::as_select(), RoleRow::as_select()))
                    .first(&mut conn)
                    .await
                    .optional()
                    .map_err(map_diesel_error)?;
                found
                    .map(|(user, role)| credentials_from_rows(user, role).map_err(corrupt_row))
                    .transpose()
            },
            timed_out,
        )
        .await
    }

    async fn activate(
        &self,
        token_hash: &InvitationTokenHash,
        now: DateTime<Utc>,
    ) -> Result<User, UserPersistenceError> {
        bounded(
            "activate",
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                let (row, role) = conn
                    .transaction::<_, TxError, _>(|conn| {
                        async move {
                            let user_id: i64 = user_invitations::table
                                .filter(user_invitations::token_hash.eq(token_hash.as_ref()))
                                .filter(user_invitations::expires_at.gt(now))
                                .select(user_invitations::user_id)
                                .first(conn)
                                .await?;

                            diesel::update(users::table.find(user_id))
                                .set(users::is_active.eq(true))
                                .execute(conn)
                                .await?;

                            diesel::delete(
                                user_invitations::table
                                    .filter(user_invitations::user_id.eq(user_id)),
                            )
                            .execute(conn)
                            .await?;

                            Ok(Self::load_joined(conn, user_id).await?)
                        }
                        .scope_boxed()
                    })
                    .await
                    .map_err(map_tx_error)?;
                debug!(user_id = row.id, "invitation redeemed");
                user_from_rows(row, role).map_err(corrupt_row)
            },
            timed_out,
        )
        .await
    }

    async fn delete(&self, id: UserId) -> Result<(), UserPersistenceError> {
        bounded(
            "delete",
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                conn.transaction::<_, TxError, _>(|conn| {
                    async move {
                        diesel::delete(
                            user_invitations::table
                                .filter(user_invitations::user_id.eq(id.get())),
                        )
                        .execute(conn)
                        .await?;

                        let removed = diesel::delete(users::table.find(id.get()))
                            .execute(conn)
                            .await?;
                        if removed == 0 {
                            return Err(TxError::Diesel(diesel::result::Error::NotFound));
                        }
                        Ok(())
                    }
                    .scope_boxed()
                })
                .await
                .map_err(map_tx_error)
            },
            timed_out,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn missing_role_is_a_query_failure() {
        let err = map_tx_error(TxError::MissingRole("user".to_owned()));
        assert!(matches!(err, UserPersistenceError::Query { .. }));
    }

    #[rstest]
    fn missing_invitation_is_not_found() {
        let err = map_tx_error(TxError::Diesel(diesel::result::Error::NotFound));
        assert_eq!(err, UserPersistenceError::not_found());
    }

    #[rstest]
    fn timeouts_name_the_operation() {
        assert_eq!(
            timed_out("activate"),
            UserPersistenceError::Timeout {
                operation: "activate".to_owned()
            }
        );
    }
}
