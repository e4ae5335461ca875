//! HS256 JSON Web Token adapter for the [`TokenAuthenticator`] port.
//!
//! The time window is checked against the injected clock rather than the
//! library's wall-clock check, so expiry behaves identically in tests and in
//! production.

use std::sync::Arc;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use mockable::Clock;
use tracing::debug;

use crate::domain::TokenClaims;
use crate::domain::ports::{TokenAuthenticator, TokenError};

/// Signs and verifies tokens with a shared secret.
pub struct JwtAuthenticator {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl JwtAuthenticator {
    /// Build an authenticator expecting `issuer` as both `iss` and `aud`.
    pub fn new(secret: &[u8], issuer: &str, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;
        validation.set_issuer(&[issuer]);
        validation.set_audience(&[issuer]);
        validation.set_required_spec_claims(&["exp", "nbf", "iss", "aud", "sub"]);
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            clock,
        }
    }
}

impl TokenAuthenticator for JwtAuthenticator {
    fn issue(&self, claims: &TokenClaims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|err| TokenError::signing(err.to_string()))
    }

    fn validate(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let claims = decode::<TokenClaims>(token, &self.decoding, &self.validation)
            .map_err(|err| {
                debug!(reason = ?err.kind(), "bearer token rejected");
                TokenError::invalid()
            })?
            .claims;

        let now = self.clock.utc();
        if claims.is_expired_at(now) {
            debug!(exp = claims.exp, "bearer token expired");
            return Err(TokenError::invalid());
        }
        if claims.is_premature_at(now) {
            debug!(nbf = claims.nbf, "bearer token not yet valid");
            return Err(TokenError::invalid());
        }
        Ok(claims)
    }
}
