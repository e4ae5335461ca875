//! Bearer token issuance and verification service.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use mockable::Clock;
use tracing::{debug, error, info};

use super::port_errors::map_user_persistence_error;
use super::ports::{TokenAuthenticator, TokenCommand, TokenError, UserRepository};
use super::{Error, LoginCredentials, PasswordHash, TokenClaims, UserId};

/// Token lifetime and issuer settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenConfig {
    /// Value of the `iss` and `aud` claims.
    pub issuer: String,
    /// Lifetime of minted tokens.
    pub ttl: Duration,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            issuer: String::from("socialgate"),
            ttl: Duration::days(3),
        }
    }
}

/// Implements [`TokenCommand`] over the credential store and a signer.
pub struct TokenService<R: ?Sized, T: ?Sized> {
    users: Arc<R>,
    tokens: Arc<T>,
    clock: Arc<dyn Clock>,
    config: TokenConfig,
}

impl<R, T> TokenService<R, T>
where
    R: UserRepository + ?Sized,
    T: TokenAuthenticator + ?Sized,
{
    /// Build the service.
    pub fn new(users: Arc<R>, tokens: Arc<T>, clock: Arc<dyn Clock>, config: TokenConfig) -> Self {
        Self {
            users,
            tokens,
            clock,
            config,
        }
    }
}

fn unauthorized() -> Error {
    Error::unauthorized("unauthorized")
}

#[async_trait]
impl<R, T> TokenCommand for TokenService<R, T>
where
    R: UserRepository + ?Sized,
    T: TokenAuthenticator + ?Sized,
{
    async fn create_token(&self, credentials: &LoginCredentials) -> Result<String, Error> {
        let Some(record) = self
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(map_user_persistence_error)?
        else {
            // Same Argon2 cost as a real check, so response time does not
            // reveal whether the email is registered.
            PasswordHash::decoy()
                .verify_off_thread(credentials.password())
                .await;
            debug!("token requested for unknown or inactive account");
            return Err(unauthorized());
        };

        if !record
            .password_hash
            .verify_off_thread(credentials.password())
            .await
        {
            debug!(user_id = %record.user.id(), "token requested with wrong password");
            return Err(unauthorized());
        }

        let Some(claims) = TokenClaims::for_user(
            record.user.id(),
            self.clock.utc(),
            self.config.ttl,
            &self.config.issuer,
        ) else {
            error!(ttl = %self.config.ttl, "token expiry overflows the calendar");
            return Err(Error::internal("token lifetime is out of range"));
        };
        let token = self.tokens.issue(&claims).map_err(|err| {
            error!(error = %err, "failed to sign token");
            Error::internal("failed to sign token")
        })?;
        info!(user_id = %record.user.id(), "token issued");
        Ok(token)
    }

    fn authenticate_bearer(&self, token: &str) -> Result<UserId, Error> {
        let claims = self.tokens.validate(token).map_err(|err| {
            if let TokenError::Signing { message } = &err {
                error!(error = %message, "token validator misreported a signing failure");
            }
            unauthorized()
        })?;
        claims.subject().map_err(|err| {
            debug!(error = %err, sub = %claims.sub, "token subject is not a user id");
            unauthorized()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{MockTokenAuthenticator, MockUserRepository};
    use crate::domain::{Password, PasswordHash, UserCredentials};
    use crate::test_support::{MutableClock, sample_user};
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    fn clock() -> Arc<MutableClock> {
        Arc::new(MutableClock::new(
            Utc.timestamp_opt(1_700_000_000, 0)
                .single()
                .expect("valid timestamp"),
        ))
    }

    fn credentials(password: &str) -> LoginCredentials {
        LoginCredentials::try_from_parts("user7@example.com", password).expect("valid credentials")
    }

    fn store_with_password(password: &str) -> MockUserRepository {
        let hash = PasswordHash::derive(&Password::new(password).expect("valid password"))
            .expect("hash password");
        let mut store = MockUserRepository::new();
        store.expect_find_by_email().returning(move |_| {
            Ok(Some(UserCredentials {
                user: sample_user(7),
                password_hash: hash.clone(),
            }))
        });
        store
    }

    fn service(
        store: MockUserRepository,
        tokens: MockTokenAuthenticator,
    ) -> TokenService<MockUserRepository, MockTokenAuthenticator> {
        TokenService::new(
            Arc::new(store),
            Arc::new(tokens),
            clock(),
            TokenConfig::default(),
        )
    }

    #[rstest]
    #[tokio::test]
    async fn valid_credentials_mint_claims_for_the_user() {
        let mut tokens = MockTokenAuthenticator::new();
        tokens
            .expect_issue()
            .withf(|claims| {
                claims.sub == "7"
                    && claims.iat == 1_700_000_000
                    && claims.nbf == claims.iat
                    && claims.exp == 1_700_000_000 + 3 * 86_400
                    && claims.iss == "socialgate"
                    && claims.aud == "socialgate"
            })
            .times(1)
            .returning(|_| Ok("signed".to_owned()));

        let token = service(store_with_password("secret"), tokens)
            .create_token(&credentials("secret"))
            .await
            .expect("token issued");
        assert_eq!(token, "signed");
    }

    #[rstest]
    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let mut tokens = MockTokenAuthenticator::new();
        tokens.expect_issue().times(0);

        let err = service(store_with_password("secret"), tokens)
            .create_token(&credentials("guess"))
            .await
            .expect_err("wrong password");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_email_is_indistinguishable_from_wrong_password() {
        let mut store = MockUserRepository::new();
        store.expect_find_by_email().returning(|_| Ok(None));

        let err = service(store, MockTokenAuthenticator::new())
            .create_token(&credentials("secret"))
            .await
            .expect_err("unknown email");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
        assert_eq!(err.message(), "unauthorized");
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_email_pays_for_a_password_check() {
        let known = service(store_with_password("secret"), MockTokenAuthenticator::new());
        let wrong_password = std::time::Instant::now();
        known
            .create_token(&credentials("guess"))
            .await
            .expect_err("wrong password");
        let known_cost = wrong_password.elapsed();

        let mut store = MockUserRepository::new();
        store.expect_find_by_email().returning(|_| Ok(None));
        let unknown = service(store, MockTokenAuthenticator::new());
        let unknown_email = std::time::Instant::now();
        unknown
            .create_token(&credentials("guess"))
            .await
            .expect_err("unknown email");
        let unknown_cost = unknown_email.elapsed();

        assert!(
            unknown_cost * 4 >= known_cost,
            "unknown email answered in {unknown_cost:?}, known email in {known_cost:?}"
        );
    }

    #[rstest]
    #[tokio::test]
    async fn token_lifetime_past_the_calendar_is_internal() {
        let mut tokens = MockTokenAuthenticator::new();
        tokens.expect_issue().times(0);
        let service = TokenService::new(
            Arc::new(store_with_password("secret")),
            Arc::new(tokens),
            clock(),
            TokenConfig {
                ttl: Duration::seconds(10_i64.pow(13)),
                ..TokenConfig::default()
            },
        );

        let err = service
            .create_token(&credentials("secret"))
            .await
            .expect_err("expiry out of range");
        assert_eq!(err.code(), ErrorCode::InternalError);
    }

    #[rstest]
    fn invalid_bearer_is_unauthorized() {
        let mut tokens = MockTokenAuthenticator::new();
        tokens.expect_validate().returning(|_| Err(TokenError::invalid()));

        let err = service(MockUserRepository::new(), tokens)
            .authenticate_bearer("garbage")
            .expect_err("invalid token");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    #[case("abc")]
    #[case("0")]
    fn non_numeric_subject_is_unauthorized(#[case] sub: &'static str) {
        let mut tokens = MockTokenAuthenticator::new();
        tokens.expect_validate().returning(move |_| {
            Ok(TokenClaims {
                sub: sub.to_owned(),
                iat: 0,
                nbf: 0,
                exp: i64::MAX,
                iss: "socialgate".to_owned(),
                aud: "socialgate".to_owned(),
            })
        });

        let err = service(MockUserRepository::new(), tokens)
            .authenticate_bearer("token")
            .expect_err("bad subject");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    fn valid_bearer_yields_subject() {
        let mut tokens = MockTokenAuthenticator::new();
        tokens.expect_validate().returning(|_| {
            Ok(TokenClaims {
                sub: "7".to_owned(),
                iat: 0,
                nbf: 0,
                exp: i64::MAX,
                iss: "socialgate".to_owned(),
                aud: "socialgate".to_owned(),
            })
        });

        let id = service(MockUserRepository::new(), tokens)
            .authenticate_bearer("token")
            .expect("valid token");
        assert_eq!(id.get(), 7);
    }
}
