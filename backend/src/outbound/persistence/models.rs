//! Diesel row structs. Internal to the persistence adapter.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::{EmailAddress, PasswordHash, Role, RoleName, User, UserCredentials, UserId, Username};

use super::schema::{roles, user_invitations, users};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = roles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RoleRow {
    pub id: i64,
    pub name: String,
    pub level: i32,
    pub description: String,
}

impl RoleRow {
    pub(crate) fn into_domain(self) -> Result<Role, String> {
        let name = RoleName::new(self.name).map_err(|err| err.to_string())?;
        Ok(Role::new(self.id, name, self.level, self.description))
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_active: bool,
    #[expect(dead_code, reason = "role is loaded through the join")]
    pub role_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Convert a joined user/role pair into a domain snapshot.
pub(crate) fn user_from_rows(user: UserRow, role: RoleRow) -> Result<User, String> {
    credentials_from_rows(user, role).map(|credentials| credentials.user)
}

/// Convert a joined user/role pair, keeping the password hash.
pub(crate) fn credentials_from_rows(user: UserRow, role: RoleRow) -> Result<UserCredentials, String> {
    let id = UserId::new(user.id).map_err(|err| err.to_string())?;
    let username = Username::new(&user.username).map_err(|err| err.to_string())?;
    let email = EmailAddress::new(&user.email).map_err(|err| err.to_string())?;
    let role = role.into_domain()?;
    Ok(UserCredentials {
        user: User::new(id, username, email, user.is_active, role, user.created_at),
        password_hash: PasswordHash::from_phc(user.password_hash),
    })
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub is_active: bool,
    pub role_id: i64,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = user_invitations)]
pub(crate) struct NewInvitationRow<'a> {
    pub token_hash: &'a str,
    pub user_id: i64,
    pub expires_at: DateTime<Utc>,
}
