use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor, message::Mailbox,
    message::header::ContentType, transport::smtp::authentication::Credentials,
};
use tracing::info;

use super::{EmailMessage, EmailSender};
use crate::config::EmailConfig;
use crate::errors::{AuraError, Result};

/// lettre SMTP (STARTTLS) 发送器
pub struct SmtpEmailSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpEmailSender {
    pub fn new(config: &EmailConfig) -> Result<Self> {
        let from: Mailbox = config.from_address.parse().map_err(|e| {
            AuraError::email_delivery(format!(
                "Invalid from address '{}': {}",
                config.from_address, e
            ))
        })?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| AuraError::email_delivery(format!("SMTP relay error: {}", e)))?
            .port(config.smtp_port);

        if !config.smtp_user.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.smtp_user.clone(),
                config.smtp_password.clone(),
            ));
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl EmailSender for SmtpEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        let to: Mailbox = message.to.parse().map_err(|e| {
            AuraError::email_delivery(format!("Invalid recipient '{}': {}", message.to, e))
        })?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(message.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(message.body.clone())
            .map_err(|e| AuraError::email_delivery(format!("Failed to build email: {}", e)))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| AuraError::email_delivery(format!("SMTP send failed: {}", e)))?;

        info!(to = %message.to, subject = %message.subject, "Email sent");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}
