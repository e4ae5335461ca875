//! Mail delivery adapters for the [`Mailer`] port.
//!
//! [`HttpMailer`] posts each message to a transactional mail API. The
//! [`LoggingMailer`] accepts every message and only records it, for local
//! development where no API key is configured.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Serialize;
use tracing::info;
use zeroize::Zeroizing;

use crate::domain::ports::{DeliveryReceipt, Mailer, MailerError, OutboundMessage};

/// Sender identity and credentials for [`HttpMailer`].
pub struct HttpMailerConfig {
    /// Full URL of the send endpoint.
    pub endpoint: Url,
    /// Bearer token for the mail API.
    pub api_key: Zeroizing<String>,
    /// Address placed in the `from` field.
    pub from_email: String,
    /// Display name placed in the `from` field.
    pub from_name: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

/// Reqwest-backed mailer speaking a JSON send API.
pub struct HttpMailer {
    client: Client,
    endpoint: Url,
    api_key: Zeroizing<String>,
    from_email: String,
    from_name: String,
}

impl HttpMailer {
    /// Build the adapter.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(config: HttpMailerConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint,
            api_key: config.api_key,
            from_email: config.from_email,
            from_name: config.from_name,
        })
    }

    fn payload<'a>(&'a self, message: &'a OutboundMessage) -> SendPayload<'a> {
        let (subject, text) = message.template.render(message);
        SendPayload {
            from: Address {
                email: &self.from_email,
                name: &self.from_name,
            },
            to: [Address {
                email: message.recipient_email.as_ref(),
                name: message.recipient_username.as_ref(),
            }],
            subject,
            text,
            category: message.template.name(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Address<'a> {
    email: &'a str,
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct SendPayload<'a> {
    from: Address<'a>,
    to: [Address<'a>; 1],
    subject: String,
    text: String,
    category: &'static str,
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, message: &OutboundMessage) -> Result<DeliveryReceipt, MailerError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(self.api_key.as_str())
            .json(&self.payload(message))
            .send()
            .await
            .map_err(|err| {
                let kind = if err.is_timeout() { "timeout" } else { "transport" };
                MailerError::delivery(format!("{kind}: {err}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(MailerError::delivery(format!(
                "mail API responded with {status}"
            )));
        }
        Ok(DeliveryReceipt {
            status: status.as_u16(),
        })
    }
}

/// Development mailer that logs instead of sending.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingMailer;

#[async_trait]
impl Mailer for LoggingMailer {
    async fn send(&self, message: &OutboundMessage) -> Result<DeliveryReceipt, MailerError> {
        let (subject, _) = message.template.render(message);
        info!(
            template = message.template.name(),
            recipient = %message.recipient_email,
            %subject,
            activation_url = %message.activation_url,
            "mail delivery skipped; logging only"
        );
        Ok(DeliveryReceipt { status: 200 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MailTemplate;
    use crate::domain::{EmailAddress, Username};
    use rstest::{fixture, rstest};
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[fixture]
    fn message() -> OutboundMessage {
        OutboundMessage {
            template: MailTemplate::UserInvitation,
            recipient_username: Username::new("ada").expect("valid username"),
            recipient_email: EmailAddress::new("ada@example.com").expect("valid email"),
            activation_url: "https://app.example/confirm/abc".to_owned(),
        }
    }

    fn mailer(server: &MockServer) -> HttpMailer {
        let endpoint = Url::parse(&format!("{}/api/send", server.uri())).expect("mock url");
        HttpMailer::new(HttpMailerConfig {
            endpoint,
            api_key: Zeroizing::new("mail-key".to_owned()),
            from_email: "noreply@socialgate.test".to_owned(),
            from_name: "socialgate".to_owned(),
            timeout: Duration::from_secs(2),
        })
        .expect("client builds")
    }

    #[rstest]
    #[tokio::test]
    async fn posts_authenticated_json_and_returns_status(message: OutboundMessage) {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/send"))
            .and(header("authorization", "Bearer mail-key"))
            .and(body_partial_json(serde_json::json!({
                "to": [{ "email": "ada@example.com", "name": "ada" }],
                "category": "user_invitation",
            })))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;

        let receipt = mailer(&server).send(&message).await.expect("delivered");
        assert_eq!(receipt.status, 202);
    }

    #[rstest]
    #[case(400)]
    #[case(401)]
    #[case(503)]
    #[tokio::test]
    async fn non_success_status_is_a_delivery_error(
        message: OutboundMessage,
        #[case] status: u16,
    ) {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;

        let err = mailer(&server).send(&message).await.expect_err("rejected");
        assert!(matches!(err, MailerError::Delivery { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn logging_mailer_always_accepts(message: OutboundMessage) {
        let receipt = LoggingMailer.send(&message).await.expect("accepted");
        assert_eq!(receipt.status, 200);
    }
}
