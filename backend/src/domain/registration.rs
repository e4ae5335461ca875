//! Registration saga and invitation redemption.
//!
//! Registration runs in two phases. Phase one writes the pending user and
//! its invitation in a single store transaction. Phase two delivers the
//! activation email outside that transaction, retrying with linear backoff.
//! If every delivery attempt fails the user is deleted again as an explicit
//! compensating step. A failed compensation is logged and the caller still
//! sees the delivery failure.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{error, info, warn};

use super::port_errors::map_user_persistence_error;
use super::ports::{
    DeliveryReceipt, MailTemplate, Mailer, MailerError, OutboundMessage, RegisteredUser,
    RegistrationCommand, UserPersistenceError, UserRepository,
};
use super::{
    Error, InvitationToken, NewInvitation, NewUser, PasswordHash, RegistrationRequest, RoleName,
    User, UserId,
};

/// Async sleep used between delivery attempts.
///
/// # Examples
/// ```
/// use std::time::Duration;
///
/// use async_trait::async_trait;
/// use socialgate::domain::DeliverySleeper;
///
/// struct NoSleep;
///
/// #[async_trait]
/// impl DeliverySleeper for NoSleep {
///     async fn sleep(&self, _duration: Duration) {}
/// }
/// ```
#[async_trait]
pub trait DeliverySleeper: Send + Sync {
    /// Suspend for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Tokio-based sleeper implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl DeliverySleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Retry policy for activation email delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryPolicy {
    /// Total attempts, including the first. Values below one act as one.
    pub max_attempts: u32,
    /// Delay unit; the wait after attempt `n` is `backoff_step * n`.
    pub backoff_step: Duration,
}

impl Default for DeliveryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_step: Duration::from_secs(1),
        }
    }
}

impl DeliveryPolicy {
    fn delay_after(&self, attempt: u32) -> Duration {
        self.backoff_step.saturating_mul(attempt)
    }
}

/// Registration settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationConfig {
    /// How long an invitation stays redeemable.
    pub invitation_ttl: chrono::Duration,
    /// Base URL of the web client hosting `/confirm/<token>`.
    pub frontend_url: String,
    /// Delivery retry policy.
    pub delivery: DeliveryPolicy,
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            invitation_ttl: chrono::Duration::days(3),
            frontend_url: String::from("http://localhost:5173"),
            delivery: DeliveryPolicy::default(),
        }
    }
}

/// Implements [`RegistrationCommand`].
pub struct RegistrationService<R: ?Sized, M: ?Sized> {
    users: Arc<R>,
    mailer: Arc<M>,
    clock: Arc<dyn Clock>,
    sleeper: Arc<dyn DeliverySleeper>,
    config: RegistrationConfig,
}

impl<R, M> RegistrationService<R, M>
where
    R: UserRepository + ?Sized,
    M: Mailer + ?Sized,
{
    /// Build the service with a tokio sleeper.
    pub fn new(users: Arc<R>, mailer: Arc<M>, clock: Arc<dyn Clock>, config: RegistrationConfig) -> Self {
        Self::with_sleeper(users, mailer, clock, Arc::new(TokioSleeper), config)
    }

    /// Build the service with an explicit sleeper.
    pub fn with_sleeper(
        users: Arc<R>,
        mailer: Arc<M>,
        clock: Arc<dyn Clock>,
        sleeper: Arc<dyn DeliverySleeper>,
        config: RegistrationConfig,
    ) -> Self {
        Self {
            users,
            mailer,
            clock,
            sleeper,
            config,
        }
    }

    fn activation_url(&self, token: &InvitationToken) -> String {
        format!(
            "{}/confirm/{}",
            self.config.frontend_url.trim_end_matches('/'),
            token.expose()
        )
    }

    async fn deliver(&self, message: &OutboundMessage) -> Result<DeliveryReceipt, MailerError> {
        let max_attempts = self.config.delivery.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.mailer.send(message).await {
                Ok(receipt) => return Ok(receipt),
                Err(err) if attempt < max_attempts => {
                    warn!(
                        attempt,
                        max_attempts,
                        template = message.template.name(),
                        error = %err,
                        "activation email delivery failed; retrying"
                    );
                    self.sleeper
                        .sleep(self.config.delivery.delay_after(attempt))
                        .await;
                    attempt += 1;
                }
                Err(err) => {
                    warn!(
                        attempt,
                        template = message.template.name(),
                        error = %err,
                        "activation email delivery failed; giving up"
                    );
                    return Err(err);
                }
            }
        }
    }

    async fn compensate(&self, user_id: UserId) {
        match self.users.delete(user_id).await {
            Ok(()) => info!(%user_id, "rolled back pending user after delivery failure"),
            Err(err) => error!(
                %user_id,
                error = %err,
                "compensating delete failed; pending user left orphaned"
            ),
        }
    }
}

#[async_trait]
impl<R, M> RegistrationCommand for RegistrationService<R, M>
where
    R: UserRepository + ?Sized,
    M: Mailer + ?Sized,
{
    async fn register(&self, request: &RegistrationRequest) -> Result<RegisteredUser, Error> {
        let Some(expires_at) = self
            .clock
            .utc()
            .checked_add_signed(self.config.invitation_ttl)
        else {
            error!(ttl = %self.config.invitation_ttl, "invitation expiry overflows the calendar");
            return Err(Error::internal("invitation lifetime is out of range"));
        };
        let password_hash = PasswordHash::derive_off_thread(request.password())
            .await
            .map_err(|err| {
                error!(error = %err, "password hashing failed");
                Error::internal("failed to hash password")
            })?;
        let token = InvitationToken::generate();
        let invitation = NewInvitation {
            token_hash: token.hash(),
            expires_at,
        };
        let new_user = NewUser {
            username: request.username().clone(),
            email: request.email().clone(),
            password_hash,
            role_name: RoleName::default_role(),
        };

        let user = self
            .users
            .create_and_invite(&new_user, &invitation)
            .await
            .map_err(map_user_persistence_error)?;

        let message = OutboundMessage {
            template: MailTemplate::UserInvitation,
            recipient_username: user.username().clone(),
            recipient_email: user.email().clone(),
            activation_url: self.activation_url(&token),
        };
        match self.deliver(&message).await {
            Ok(receipt) => {
                info!(user_id = %user.id(), status = receipt.status, "activation email sent");
                Ok(RegisteredUser { user, token })
            }
            Err(_) => {
                self.compensate(user.id()).await;
                Err(Error::service_unavailable(
                    "could not deliver the activation email; please try again",
                ))
            }
        }
    }

    async fn activate(&self, token: &InvitationToken) -> Result<User, Error> {
        match self.users.activate(&token.hash(), self.clock.utc()).await {
            Ok(user) => {
                info!(user_id = %user.id(), "account activated");
                Ok(user)
            }
            Err(UserPersistenceError::NotFound) => {
                Err(Error::not_found("invitation not found or expired"))
            }
            Err(err) => Err(map_user_persistence_error(err)),
        }
    }
}
