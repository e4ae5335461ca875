//! User identity model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{PasswordHash, Role, RoleName};

/// Maximum username length in characters.
pub const USERNAME_MAX: usize = 100;
/// Maximum email length in characters.
pub const EMAIL_MAX: usize = 255;

/// Validation errors raised while building user inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// Identifier was zero or negative.
    InvalidId,
    /// Username was blank once trimmed.
    EmptyUsername,
    /// Username exceeded the maximum length.
    UsernameTooLong { max: usize },
    /// Email was blank once trimmed.
    EmptyEmail,
    /// Email exceeded the maximum length.
    EmailTooLong { max: usize },
    /// Email did not have the `local@domain.tld` shape.
    InvalidEmail,
    /// Password shorter than the minimum.
    PasswordTooShort { min: usize },
    /// Password longer than the maximum.
    PasswordTooLong { max: usize },
}

impl UserValidationError {
    /// Input field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidId => "id",
            Self::EmptyUsername | Self::UsernameTooLong { .. } => "username",
            Self::EmptyEmail | Self::EmailTooLong { .. } | Self::InvalidEmail => "email",
            Self::PasswordTooShort { .. } | Self::PasswordTooLong { .. } => "password",
        }
    }

    /// Stable constraint code echoed to API clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidId => "invalid_id",
            Self::EmptyUsername | Self::EmptyEmail => "required",
            Self::UsernameTooLong { .. } | Self::EmailTooLong { .. } => "too_long",
            Self::InvalidEmail => "invalid_email",
            Self::PasswordTooShort { .. } => "too_short",
            Self::PasswordTooLong { .. } => "too_long",
        }
    }
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "user id must be a positive integer"),
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::UsernameTooLong { max } => {
                write!(f, "username must be at most {max} characters")
            }
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::EmailTooLong { max } => write!(f, "email must be at most {max} characters"),
            Self::InvalidEmail => write!(f, "email must be a valid address"),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
            Self::PasswordTooLong { max } => {
                write!(f, "password must be at most {max} characters")
            }
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Store-assigned numeric user identifier.
///
/// # Examples
/// ```
/// use socialgate::domain::UserId;
///
/// let id = UserId::new(42).unwrap();
/// assert_eq!(id.get(), 42);
/// assert!(UserId::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct UserId(i64);

impl UserId {
    /// Validate and wrap a raw identifier.
    pub fn new(raw: i64) -> Result<Self, UserValidationError> {
        if raw <= 0 {
            return Err(UserValidationError::InvalidId);
        }
        Ok(Self(raw))
    }

    /// Raw identifier value.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<UserId> for i64 {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl TryFrom<i64> for UserId {
    type Error = UserValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl std::str::FromStr for UserId {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw: i64 = s.parse().map_err(|_| UserValidationError::InvalidId)?;
        Self::new(raw)
    }
}

/// Unique account handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Trim and validate a username.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        if trimmed.chars().count() > USERNAME_MAX {
            return Err(UserValidationError::UsernameTooLong { max: USERNAME_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Lower-cased email address.
///
/// Only the coarse `local@domain.tld` shape is checked; deliverability is the
/// mail channel's concern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Trim, lower-case and validate an email address.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let normalised = raw.as_ref().trim().to_lowercase();
        if normalised.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if normalised.chars().count() > EMAIL_MAX {
            return Err(UserValidationError::EmailTooLong { max: EMAIL_MAX });
        }
        let Some((local, domain)) = normalised.split_once('@') else {
            return Err(UserValidationError::InvalidEmail);
        };
        let domain_ok = domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.')
            && !domain.contains('@');
        if local.is_empty() || !domain_ok || normalised.chars().any(char::is_whitespace) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(normalised))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Snapshot of a user account, safe to serialise.
///
/// The password hash is deliberately absent; see [`UserCredentials`].
///
/// ## Invariants
/// - `id` is store-assigned and immutable.
/// - `is_active` flips to `true` exactly once, on invitation redemption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[schema(value_type = i64, example = 42)]
    id: UserId,
    #[schema(value_type = String, example = "ada")]
    username: Username,
    #[schema(value_type = String, example = "ada@example.com")]
    email: EmailAddress,
    is_active: bool,
    role: Role,
    created_at: DateTime<Utc>,
}

impl User {
    /// Assemble a user snapshot from validated parts.
    pub fn new(
        id: UserId,
        username: Username,
        email: EmailAddress,
        is_active: bool,
        role: Role,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            username,
            email,
            is_active,
            role,
            created_at,
        }
    }

    /// Stable identifier.
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Unique handle.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Unique email address.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Whether the invitation has been redeemed.
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Assigned role.
    pub fn role(&self) -> &Role {
        &self.role
    }

    /// Creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Copy of this user with the activation flag set.
    #[must_use]
    pub fn activated(mut self) -> Self {
        self.is_active = true;
        self
    }
}

/// A user together with their password hash.
///
/// Returned only by the lookup used when minting tokens.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    /// Account snapshot.
    pub user: User,
    /// Stored Argon2id hash.
    pub password_hash: PasswordHash,
}

/// Pending account awaiting insertion.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Requested handle.
    pub username: Username,
    /// Requested email address.
    pub email: EmailAddress,
    /// Hash of the chosen password.
    pub password_hash: PasswordHash,
    /// Role to assign.
    pub role_name: RoleName,
}

#[cfg(test)]
mod tests;
