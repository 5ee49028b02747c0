use crate::{MonitorError, Notifier};
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::Deserialize;
use tracing::info;

fn default_smtp_server() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EmailConfig {
    #[serde(default = "default_smtp_server")]
    pub smtp_server: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    pub username: String,
    pub password: String,
    pub from_email: String,
    pub to_email: String,
}

/// SMTP delivery with STARTTLS.
pub struct EmailNotifier {
    from: Mailbox,
    to: Mailbox,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl EmailNotifier {
    pub fn new(config: &EmailConfig) -> Result<EmailNotifier, MonitorError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_server)?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(EmailNotifier {
            from: config.from_email.parse()?,
            to: config.to_email.parse()?,
            transport,
        })
    }

    pub fn message(&self, subject: &str, body: &str) -> Result<Message, MonitorError> {
        Ok(Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?)
    }
}

#[async_trait::async_trait]
impl Notifier for EmailNotifier {
    fn name(&self) -> &str {
        "email"
    }

    async fn send(&self, subject: &str, body: &str) -> Result<(), MonitorError> {
        let message = self.message(subject, body)?;
        self.transport.send(message).await?;
        info!(to = %self.to, subject, "Email notification sent");
        Ok(())
    }
}
