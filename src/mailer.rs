//! Outbound email over SMTP.
//!
//! The transport is optional: when no SMTP credentials are configured the
//! mailer reports itself unconfigured, fulfillment skips its notifications,
//! and the contact form refuses with a 500.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpConfig;
use crate::error::{msg, AppError, Result};

/// A composed message ready for delivery. The sender address belongs to the
/// transport, not the message.
#[derive(Debug, Clone)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: Option<String>,
    pub reply_to: Option<String>,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    fn is_configured(&self) -> bool;

    async fn send(&self, mail: &OutboundEmail) -> Result<()>;
}

/// SMTP mailer backed by a STARTTLS relay.
pub struct SmtpMailer {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from_address: String,
}

impl SmtpMailer {
    /// Build from optional config; `None` yields a permanently-unconfigured
    /// mailer rather than an error, so a mail-less deployment still boots.
    pub fn from_config(config: Option<&SmtpConfig>) -> Result<Self> {
        let Some(config) = config else {
            return Ok(Self {
                transport: None,
                from_address: String::new(),
            });
        };

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| AppError::Internal(format!("Failed to build SMTP transport: {}", e)))?
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self {
            transport: Some(transport),
            from_address: config.from_address.clone(),
        })
    }

    fn parse_mailbox(address: &str) -> Result<Mailbox> {
        address
            .parse()
            .map_err(|e| AppError::Internal(format!("Invalid email address '{}': {}", address, e)))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    fn is_configured(&self) -> bool {
        self.transport.is_some()
    }

    async fn send(&self, mail: &OutboundEmail) -> Result<()> {
        let transport = self
            .transport
            .as_ref()
            .ok_or_else(|| AppError::Internal(msg::MAIL_NOT_CONFIGURED.into()))?;

        let mut builder = Message::builder()
            .from(Self::parse_mailbox(&self.from_address)?)
            .to(Self::parse_mailbox(&mail.to)?)
            .subject(mail.subject.clone());

        if let Some(ref reply_to) = mail.reply_to {
            builder = builder.reply_to(Self::parse_mailbox(reply_to)?);
        }

        let message = match mail.html {
            Some(ref html) => builder
                .multipart(MultiPart::alternative_plain_html(
                    mail.text.clone(),
                    html.clone(),
                ))
                .map_err(|e| AppError::Internal(format!("Failed to build email: {}", e)))?,
            None => builder
                .header(ContentType::TEXT_PLAIN)
                .body(mail.text.clone())
                .map_err(|e| AppError::Internal(format!("Failed to build email: {}", e)))?,
        };

        transport
            .send(message)
            .await
            .map_err(|e| AppError::Upstream(format!("SMTP error: {}", e)))?;

        tracing::info!(to = %mail.to, subject = %mail.subject, "Email sent");
        Ok(())
    }
}
