//! Invitation tokens redeemed to activate a pending account.
//!
//! Only [`InvitationTokenHash`] is ever persisted. The plaintext
//! [`InvitationToken`] lives in memory long enough to be mailed and returned to
//! the registering client, and is zeroised on drop.

use std::fmt;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;
use zeroize::Zeroizing;

/// Plaintext invitation token.
#[derive(Clone, PartialEq, Eq)]
pub struct InvitationToken(Zeroizing<String>);

impl InvitationToken {
    /// Generate a fresh random token.
    pub fn generate() -> Self {
        Self(Zeroizing::new(Uuid::new_v4().to_string()))
    }

    /// Wrap a token presented by a caller.
    pub fn from_presented(raw: &str) -> Self {
        Self(Zeroizing::new(raw.to_owned()))
    }

    /// Plaintext value for the activation link.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    /// One-way hash stored server side.
    pub fn hash(&self) -> InvitationTokenHash {
        let digest = Sha256::digest(self.0.as_bytes());
        InvitationTokenHash(hex::encode(digest))
    }
}

impl fmt::Debug for InvitationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("InvitationToken(<redacted>)")
    }
}

/// Lower-case hex SHA-256 digest of an [`InvitationToken`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InvitationTokenHash(String);

impl InvitationTokenHash {
    /// Wrap a digest loaded from storage.
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }
}

impl AsRef<str> for InvitationTokenHash {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Invitation row written alongside a pending user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInvitation {
    /// Hash of the mailed token.
    pub token_hash: InvitationTokenHash,
    /// Absolute expiry; redemption at or after this instant fails.
    pub expires_at: DateTime<Utc>,
}
