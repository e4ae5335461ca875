//! Delivery channel port for transactional email.
use async_trait::async_trait;

use crate::domain::{EmailAddress, Username};

use super::define_port_error;

define_port_error! {
    /// Errors raised by mail adapters.
    pub enum MailerError {
        /// The transport rejected or failed to accept the message.
        Delivery { message: String } => "mail delivery failed: {message}",
    }
}

/// Templates the gatekeeper can send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailTemplate {
    /// Account activation link sent after registration.
    UserInvitation,
}

impl MailTemplate {
    /// Stable template identifier for providers and logs.
    pub fn name(self) -> &'static str {
        match self {
            Self::UserInvitation => "user_invitation",
        }
    }

    /// Render subject and plain-text body for `message`.
    pub fn render(self, message: &OutboundMessage) -> (String, String) {
        match self {
            Self::UserInvitation => (
                String::from("Finish registration with socialgate"),
                format!(
                    "Hi {},\n\nThanks for signing up. Confirm your email by visiting:\n{}\n\n\
                     If you did not sign up you can ignore this email.\n",
                    message.recipient_username, message.activation_url
                ),
            ),
        }
    }
}

/// A message addressed to a single recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Template to render.
    pub template: MailTemplate,
    /// Greeting name.
    pub recipient_username: Username,
    /// Destination address.
    pub recipient_email: EmailAddress,
    /// Link carrying the plaintext invitation token.
    pub activation_url: String,
}

/// Acknowledgement returned by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryReceipt {
    /// Provider status code, such as an HTTP status.
    pub status: u16,
}

/// Driven port over the mail transport.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Attempt one delivery of `message`.
    async fn send(&self, message: &OutboundMessage) -> Result<DeliveryReceipt, MailerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invitation_body_contains_link_and_name() {
        let message = OutboundMessage {
            template: MailTemplate::UserInvitation,
            recipient_username: Username::new("ada").expect("valid username"),
            recipient_email: EmailAddress::new("ada@example.com").expect("valid email"),
            activation_url: "https://app.example/confirm/abc".to_owned(),
        };
        let (subject, body) = message.template.render(&message);
        assert!(!subject.is_empty());
        assert!(body.contains("Hi ada"));
        assert!(body.contains("https://app.example/confirm/abc"));
    }
}
