//! Mail provider implementations.
//!
//! This module contains the `MailProvider` trait and implementations for
//! the supported delivery services: an SMTP relay, the Gmail mailbox API,
//! Resend and SendGrid.

mod gmail;
mod resend;
mod sendgrid;
mod smtp;

pub use gmail::{GmailConfig, GmailProvider};
pub use resend::{ResendConfig, ResendProvider};
pub use sendgrid::{SendGridConfig, SendGridProvider};
pub use smtp::{SmtpConfig, SmtpProvider};

use crate::error::ProviderError;
use async_trait::async_trait;
use core_config::env_or_default;
use std::sync::Arc;

/// A sent email with the provider-specific message ID, when reported.
#[derive(Debug, Clone)]
pub struct SentMail {
    /// Provider-specific message ID for tracking.
    pub message_id: Option<String>,
}

/// One named PDF attachment. Content type is always `application/pdf`.
#[derive(Debug, Clone)]
pub struct MailAttachment {
    pub filename: String,
    pub content: Vec<u8>,
}

/// A fully formed email ready for a provider.
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    /// Recipient email address.
    pub to: String,
    /// Email subject.
    pub subject: String,
    /// Plain text body.
    pub text_body: String,
    /// HTML body.
    pub html_body: String,
    /// The rendered document attachment.
    pub attachment: MailAttachment,
}

/// Trait for mail sending providers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailProvider: Send + Sync {
    /// Attempt delivery of one message. At most one outbound call; no
    /// retries at this level.
    async fn send(&self, email: &OutgoingEmail) -> Result<SentMail, ProviderError>;

    /// Provider name for logging and receipts.
    fn name(&self) -> &'static str;
}

/// A sender identity split into display name and address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub name: String,
    pub email: String,
}

/// Split a `"Display Name <email>"` header into name/email parts.
///
/// Without angle brackets the whole string is used as both name and email.
pub fn parse_sender(header: &str) -> Sender {
    match (header.find('<'), header.rfind('>')) {
        (Some(open), Some(close)) if open < close => Sender {
            name: header[..open].trim().to_string(),
            email: header[open + 1..close].trim().to_string(),
        },
        _ => Sender {
            name: header.trim().to_string(),
            email: header.trim().to_string(),
        },
    }
}

/// Which provider variant is configured for this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Smtp,
    Gmail,
    Resend,
    SendGrid,
}

impl ProviderKind {
    /// Read `MAIL_PROVIDER` (default: `resend`).
    pub fn from_env() -> Result<Self, ProviderError> {
        let raw = env_or_default("MAIL_PROVIDER", "resend");
        raw.parse()
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "smtp" => Ok(ProviderKind::Smtp),
            "gmail" => Ok(ProviderKind::Gmail),
            "resend" => Ok(ProviderKind::Resend),
            "sendgrid" => Ok(ProviderKind::SendGrid),
            other => Err(ProviderError::Config(format!(
                "Unknown MAIL_PROVIDER '{}' (expected smtp, gmail, resend or sendgrid)",
                other
            ))),
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::Smtp => write!(f, "smtp"),
            ProviderKind::Gmail => write!(f, "gmail"),
            ProviderKind::Resend => write!(f, "resend"),
            ProviderKind::SendGrid => write!(f, "sendgrid"),
        }
    }
}

/// Build the configured provider from environment variables.
///
/// Fails with `ProviderError::Config` when the variant's credentials are
/// absent, which the caller must surface as `ProviderNotConfigured`.
pub fn build_provider(kind: ProviderKind) -> Result<Arc<dyn MailProvider>, ProviderError> {
    match kind {
        ProviderKind::Smtp => Ok(Arc::new(SmtpProvider::new(SmtpConfig::from_env()?)?)),
        ProviderKind::Gmail => Ok(Arc::new(GmailProvider::new(GmailConfig::from_env()?))),
        ProviderKind::Resend => Ok(Arc::new(ResendProvider::new(ResendConfig::from_env()?))),
        ProviderKind::SendGrid => Ok(Arc::new(SendGridProvider::new(SendGridConfig::from_env()?))),
    }
}
