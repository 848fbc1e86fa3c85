use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{info, warn};

use crate::application::ports::{NotificationDispatcher, NotificationError, OutboundEmail};
use crate::config::MailConfig;

const INCOMPLETE_SETTINGS: &str = "SMTP settings are missing or incomplete";

/// SMTP delivery. STARTTLS for remote relays, plain connection for a
/// relay on the local host (mail catchers in development).
///
/// Incomplete settings do not stop the service; every send fails instead.
pub struct SmtpDispatcher {
    relay: Option<Relay>,
}

struct Relay {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

fn parse_address(raw: &str) -> Result<Address, NotificationError> {
    raw.parse::<Address>()
        .map_err(|e| NotificationError::Address(format!("{raw}: {e}")))
}

fn is_local_host(host: &str) -> bool {
    matches!(host, "localhost" | "127.0.0.1" | "::1")
}

impl Relay {
    fn from_config(config: &MailConfig) -> Result<Self, NotificationError> {
        let host = config.host.trim();
        let credentials = match (&config.username, &config.password) {
            (Some(username), Some(password)) => {
                Some(Credentials::new(username.clone(), password.clone()))
            }
            (None, None) => None,
            _ => return Err(NotificationError::NotConfigured(INCOMPLETE_SETTINGS.into())),
        };
        if host.is_empty() || config.port == 0 {
            return Err(NotificationError::NotConfigured(INCOMPLETE_SETTINGS.into()));
        }

        let from = Mailbox::new(
            Some(config.from_name.clone()).filter(|n| !n.is_empty()),
            parse_address(&config.from_email)?,
        );

        let mut builder = if is_local_host(host) {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                .map_err(|e| NotificationError::NotConfigured(e.to_string()))?
        };
        builder = builder.port(config.port);
        if let Some(credentials) = credentials {
            builder = builder.credentials(credentials);
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

impl SmtpDispatcher {
    pub fn new(config: &MailConfig) -> Self {
        match Relay::from_config(config) {
            Ok(relay) => {
                info!(host = %config.host, port = config.port, "SMTP dispatcher configured");
                Self { relay: Some(relay) }
            }
            Err(e) => {
                warn!(error = %e, "SMTP dispatcher unusable; emails will fail");
                Self { relay: None }
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        self.relay.is_some()
    }

    fn relay(&self) -> Result<&Relay, NotificationError> {
        self.relay
            .as_ref()
            .ok_or_else(|| NotificationError::NotConfigured(INCOMPLETE_SETTINGS.into()))
    }

    fn build_message(&self, email: &OutboundEmail) -> Result<Message, NotificationError> {
        let relay = self.relay()?;
        let to = Mailbox::new(email.to_name.clone(), parse_address(&email.to_address)?);

        Message::builder()
            .from(relay.from.clone())
            .to(to)
            .subject(email.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(email.body.clone())
            .map_err(|e| NotificationError::Delivery(e.to_string()))
    }
}

#[async_trait]
impl NotificationDispatcher for SmtpDispatcher {
    async fn send(&self, email: OutboundEmail) -> Result<(), NotificationError> {
        let message = self.build_message(&email)?;
        self.relay()?
            .transport
            .send(message)
            .await
            .map_err(|e| NotificationError::Delivery(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> MailConfig {
        MailConfig {
            host: "localhost".into(),
            port: 1025,
            ..MailConfig::default()
        }
    }

    #[tokio::test]
    async fn builds_plain_text_message() {
        let dispatcher = SmtpDispatcher::new(&config());
        let message = dispatcher
            .build_message(&OutboundEmail {
                to_address: "a@x.com".into(),
                to_name: Some("Alice".into()),
                subject: "Verify your email".into(),
                body: "123456".into(),
            })
            .unwrap();

        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: Verify your email"));
        assert!(raw.contains("a@x.com"));
    }

    #[tokio::test]
    async fn rejects_bad_recipient() {
        let dispatcher = SmtpDispatcher::new(&config());
        let err = dispatcher
            .build_message(&OutboundEmail {
                to_address: "not-an-address".into(),
                to_name: None,
                subject: "s".into(),
                body: "b".into(),
            })
            .unwrap_err();
        assert!(matches!(err, NotificationError::Address(_)));
    }

    #[tokio::test]
    async fn incomplete_settings_fail_every_send() {
        let mut config = config();
        config.host = String::new();
        let dispatcher = SmtpDispatcher::new(&config);
        assert!(!dispatcher.is_configured());

        let err = dispatcher
            .send(OutboundEmail {
                to_address: "a@x.com".into(),
                to_name: None,
                subject: "s".into(),
                body: "b".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "SMTP settings are missing or incomplete");
    }

    #[test]
    fn username_without_password_is_incomplete() {
        let mut config = config();
        config.username = Some("mailer".into());
        assert!(!SmtpDispatcher::new(&config).is_configured());
    }
}
