//! Identity token claim set.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{UserId, UserValidationError};

/// Claims carried by a bearer token.
///
/// Timestamps are whole seconds since the Unix epoch. `sub` is the decimal
/// user identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the user identifier.
    pub sub: String,
    /// Issued at.
    pub iat: i64,
    /// Not valid before.
    pub nbf: i64,
    /// Expiry.
    pub exp: i64,
    /// Issuer.
    pub iss: String,
    /// Audience.
    pub aud: String,
}

impl TokenClaims {
    /// Claims for `user` valid from `now` for `ttl`.
    ///
    /// The audience matches the issuer. `None` when `now + ttl` falls outside
    /// the representable calendar.
    pub fn for_user(
        user: UserId,
        now: DateTime<Utc>,
        ttl: Duration,
        issuer: &str,
    ) -> Option<Self> {
        let expires = now.checked_add_signed(ttl)?;
        let issued = now.timestamp();
        Some(Self {
            sub: user.to_string(),
            iat: issued,
            nbf: issued,
            exp: expires.timestamp(),
            iss: issuer.to_owned(),
            aud: issuer.to_owned(),
        })
    }

    /// Subject as a validated user identifier.
    pub fn subject(&self) -> Result<UserId, UserValidationError> {
        self.sub.parse()
    }

    /// True once `now` has reached the expiry.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }

    /// True while `now` precedes the not-before instant.
    pub fn is_premature_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() < self.nbf
    }
}
