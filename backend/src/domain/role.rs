//! Role hierarchy primitives.
//!
//! Roles are read-only from the gatekeeper's point of view; an
//! administrative surface elsewhere owns them. Each role carries an integer
//! precedence level and any two levels are comparable.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Name assigned to newly registered accounts.
pub const DEFAULT_ROLE: &str = "user";
/// Role required to act on another user's account.
pub const ADMIN_ROLE: &str = "admin";

/// Validation errors for role names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleValidationError {
    /// Role name was blank once trimmed.
    EmptyName,
}

impl fmt::Display for RoleValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "role name must not be empty"),
        }
    }
}

impl std::error::Error for RoleValidationError {}

/// Unique role name such as `user` or `admin`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoleName(String);

impl RoleName {
    /// Validate and construct a role name.
    pub fn new(name: impl Into<String>) -> Result<Self, RoleValidationError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(RoleValidationError::EmptyName);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// The role assigned at registration.
    pub fn default_role() -> Self {
        Self(DEFAULT_ROLE.to_owned())
    }

    /// The role required for cross-account mutations.
    pub fn admin() -> Self {
        Self(ADMIN_ROLE.to_owned())
    }
}

impl AsRef<str> for RoleName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<RoleName> for String {
    fn from(value: RoleName) -> Self {
        value.0
    }
}

impl TryFrom<String> for RoleName {
    type Error = RoleValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Role with its precedence level.
///
/// # Examples
/// ```
/// use socialgate::domain::{Role, RoleName};
///
/// let admin = Role::new(3, RoleName::admin(), 3, "Administrator");
/// let user = Role::new(1, RoleName::default_role(), 1, "Member");
/// assert!(admin.outranks_or_equals(&user));
/// assert!(!user.outranks_or_equals(&admin));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    #[schema(example = 1)]
    id: i64,
    #[schema(value_type = String, example = "user")]
    name: RoleName,
    #[schema(example = 1)]
    level: i32,
    #[schema(example = "A regular member")]
    description: String,
}

impl Role {
    /// Build a role from validated parts.
    pub fn new(id: i64, name: RoleName, level: i32, description: impl Into<String>) -> Self {
        Self {
            id,
            name,
            level,
            description: description.into(),
        }
    }

    /// Store-assigned identifier.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Unique role name.
    pub fn name(&self) -> &RoleName {
        &self.name
    }

    /// Precedence level; higher is more privileged.
    pub fn level(&self) -> i32 {
        self.level
    }

    /// Free-form description.
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// True when this role is at least as privileged as `other`.
    pub fn outranks_or_equals(&self, other: &Self) -> bool {
        self.level >= other.level
    }
}

/// The roles every deployment starts with.
pub fn seeded_roles() -> Vec<Role> {
    vec![
        Role::new(1, RoleName::default_role(), 1, "A user can create posts and comments"),
        Role::new(
            2,
            RoleName(String::from("moderator")),
            2,
            "A moderator can update other users' posts",
        ),
        Role::new(3, RoleName::admin(), 3, "An admin can update and delete other users' posts"),
    ]
}
