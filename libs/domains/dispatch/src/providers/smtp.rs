//! SMTP relay provider implementation using lettre.

use super::{MailProvider, OutgoingEmail, SentMail};
use crate::error::ProviderError;
use async_trait::async_trait;
use core_config::{env_or_default, env_required};
use lettre::{
    message::{header::ContentType, Attachment, Body, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::sync::Arc;
use tracing::{debug, error, info};

/// SMTP relay configuration.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    /// SMTP server host.
    pub host: String,
    /// SMTP server port.
    pub port: u16,
    /// Sender header, e.g. `"Raport <noreply@example.com>"`.
    pub from: String,
    /// SMTP username (optional for dev servers like Mailpit).
    pub username: Option<String>,
    /// SMTP password (optional for dev servers like Mailpit).
    pub password: Option<String>,
    /// Whether to use TLS (false for local dev servers).
    pub use_tls: bool,
}

impl SmtpConfig {
    /// Load from environment. `SMTP_HOST` and `MAIL_FROM` are required.
    pub fn from_env() -> Result<Self, ProviderError> {
        let host = env_required("SMTP_HOST").map_err(|e| ProviderError::Config(e.to_string()))?;
        let from = env_required("MAIL_FROM").map_err(|e| ProviderError::Config(e.to_string()))?;
        let port = env_or_default("SMTP_PORT", "587")
            .parse()
            .map_err(|e| ProviderError::Config(format!("Invalid SMTP_PORT: {}", e)))?;

        Ok(Self {
            host,
            port,
            from,
            username: std::env::var("SMTP_USERNAME").ok(),
            password: std::env::var("SMTP_PASSWORD").ok(),
            use_tls: env_or_default("SMTP_USE_TLS", "true")
                .eq_ignore_ascii_case("true"),
        })
    }
}

/// Mail provider speaking SMTP to a configured relay.
pub struct SmtpProvider {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    config: Arc<SmtpConfig>,
}

impl SmtpProvider {
    pub fn new(config: SmtpConfig) -> Result<Self, ProviderError> {
        let transport = Self::build_transport(&config)?;
        Ok(Self {
            transport,
            config: Arc::new(config),
        })
    }

    /// Build the SMTP transport based on configuration.
    fn build_transport(
        config: &SmtpConfig,
    ) -> Result<AsyncSmtpTransport<Tokio1Executor>, ProviderError> {
        let mut builder = if config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .map_err(|e| ProviderError::Config(format!("Failed to create SMTP relay: {}", e)))?
                .port(config.port)
        } else {
            // Non-TLS transport for local dev servers like Mailpit
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host).port(config.port)
        };

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(builder.build())
    }

    /// Build a lettre Message from OutgoingEmail: text part plus the PDF
    /// attachment as raw bytes with a declared `application/pdf` type.
    fn build_message(&self, email: &OutgoingEmail) -> Result<Message, ProviderError> {
        let from: Mailbox = self
            .config
            .from
            .parse()
            .map_err(|e| ProviderError::Config(format!("Invalid from address: {}", e)))?;

        let to: Mailbox = email
            .to
            .parse()
            .map_err(|e| ProviderError::Send {
                code: "invalid_recipient".to_string(),
                message: format!("Invalid to address: {}", e),
            })?;

        let pdf_type = ContentType::parse("application/pdf")
            .map_err(|e| ProviderError::Config(format!("Invalid content type: {}", e)))?;

        let attachment = Attachment::new(email.attachment.filename.clone())
            .body(Body::new(email.attachment.content.clone()), pdf_type);

        Message::builder()
            .from(from)
            .to(to)
            .subject(&email.subject)
            .multipart(
                MultiPart::mixed()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(email.text_body.clone()),
                    )
                    .singlepart(attachment),
            )
            .map_err(|e| ProviderError::Config(format!("Failed to build email message: {}", e)))
    }
}

#[async_trait]
impl MailProvider for SmtpProvider {
    async fn send(&self, email: &OutgoingEmail) -> Result<SentMail, ProviderError> {
        debug!(
            to = %email.to,
            subject = %email.subject,
            host = %self.config.host,
            port = %self.config.port,
            attachment = %email.attachment.filename,
            "Sending email via SMTP"
        );

        let message = self.build_message(email)?;

        let response = self.transport.send(message).await.map_err(|e| {
            error!(to = %email.to, error = %e, "Failed to send email via SMTP");
            // Transport-level error message surfaced unmodified
            ProviderError::Transport(e.to_string())
        })?;

        let message_id = response.message().next().map(|s| s.to_string());

        info!(to = %email.to, message_id = ?message_id, "Email sent via SMTP");

        Ok(SentMail { message_id })
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}
