//! Port for minting and verifying signed identity tokens.
use crate::domain::TokenClaims;

use super::define_port_error;

define_port_error! {
    /// Errors raised by token adapters.
    pub enum TokenError {
        /// The signing key could not produce a token.
        Signing { message: String } => "token signing failed: {message}",
        /// Signature, time window, issuer or audience check failed.
        ///
        /// Adapters log the specific reason and surface only this variant.
        Invalid => "invalid token",
    }
}

/// Stateless issuer and validator for bearer tokens.
///
/// Both operations are pure computation and never suspend.
#[cfg_attr(test, mockall::automock)]
pub trait TokenAuthenticator: Send + Sync {
    /// Sign `claims` into a compact token.
    fn issue(&self, claims: &TokenClaims) -> Result<String, TokenError>;

    /// Verify `token` and return its claims.
    fn validate(&self, token: &str) -> Result<TokenClaims, TokenError>;
}
