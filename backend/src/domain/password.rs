//! Password input and Argon2id hashing.

use std::fmt;

use argon2::password_hash::{self, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::rngs::OsRng;
use tracing::error;
use zeroize::Zeroizing;

use super::UserValidationError;

/// Minimum password length in characters.
pub const PASSWORD_MIN: usize = 3;
/// Maximum password length in characters.
pub const PASSWORD_MAX: usize = 72;

/// Plaintext password supplied by a caller.
///
/// The buffer is scrubbed on drop and never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Validate the length of a caller-supplied password.
    ///
    /// Whitespace is preserved; it is part of the secret.
    pub fn new(raw: &str) -> Result<Self, UserValidationError> {
        let length = raw.chars().count();
        if length < PASSWORD_MIN {
            return Err(UserValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        if length > PASSWORD_MAX {
            return Err(UserValidationError::PasswordTooLong { max: PASSWORD_MAX });
        }
        Ok(Self(Zeroizing::new(raw.to_owned())))
    }

    /// Plaintext bytes for hashing.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Failure while deriving a password hash.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("password hashing failed: {message}")]
pub struct PasswordHashError {
    message: String,
}

/// Default Argon2id parameters over a fixed salt; matches no password.
const DECOY_PHC: &str = "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

/// Argon2id hash in PHC string format.
///
/// # Examples
/// ```
/// use socialgate::domain::{Password, PasswordHash};
///
/// let password = Password::new("hunter22").unwrap();
/// let hash = PasswordHash::derive(&password).unwrap();
/// assert!(hash.verify(&password));
/// assert!(!hash.verify(&Password::new("hunter23").unwrap()));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Hash `password` with a fresh random salt.
    pub fn derive(password: &Password) -> Result<Self, PasswordHashError> {
        let salt = SaltString::generate(&mut OsRng);
        let phc = Argon2::default()
            .hash_password(password.expose().as_bytes(), &salt)
            .map_err(|err| PasswordHashError {
                message: err.to_string(),
            })?;
        Ok(Self(phc.to_string()))
    }

    /// [`Self::derive`] on the blocking pool, keeping Argon2 off the
    /// request workers.
    ///
    /// # Errors
    /// Fails when hashing fails or the blocking task is lost.
    pub async fn derive_off_thread(password: &Password) -> Result<Self, PasswordHashError> {
        let password = password.clone();
        tokio::task::spawn_blocking(move || Self::derive(&password))
            .await
            .map_err(|err| PasswordHashError {
                message: format!("hashing task failed: {err}"),
            })?
    }

    /// Hash checked when the account does not exist, so unknown and known
    /// emails cost the same Argon2 work.
    pub fn decoy() -> Self {
        Self::from_phc(DECOY_PHC)
    }

    /// Wrap a PHC string loaded from storage.
    pub fn from_phc(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }

    /// Check `password` against this hash.
    ///
    /// A malformed stored hash verifies as `false`.
    pub fn verify(&self, password: &Password) -> bool {
        let Ok(parsed) = password_hash::PasswordHash::new(&self.0) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.expose().as_bytes(), &parsed)
            .is_ok()
    }

    /// [`Self::verify`] on the blocking pool.
    ///
    /// A lost blocking task verifies as `false`.
    pub async fn verify_off_thread(&self, password: &Password) -> bool {
        let hash = self.clone();
        let password = password.clone();
        tokio::task::spawn_blocking(move || hash.verify(&password))
            .await
            .unwrap_or_else(|err| {
                error!(error = %err, "password verification task failed");
                false
            })
    }

    /// PHC string for persistence.
    pub fn as_phc(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}
