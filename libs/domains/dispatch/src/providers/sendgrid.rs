//! SendGrid email provider implementation.

use super::{parse_sender, MailProvider, OutgoingEmail, SentMail};
use crate::error::ProviderError;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use core_config::env_required;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

/// SendGrid API configuration.
#[derive(Debug, Clone)]
pub struct SendGridConfig {
    /// SendGrid API key.
    pub api_key: String,
    /// Sender header, split into name/email fields for the API.
    pub from: String,
    /// SendGrid API base URL (defaults to production).
    pub api_url: String,
}

impl SendGridConfig {
    pub fn new(api_key: String, from: String) -> Self {
        Self {
            api_key,
            from,
            api_url: "https://api.sendgrid.com/v3".to_string(),
        }
    }

    pub fn from_env() -> Result<Self, ProviderError> {
        let api_key =
            env_required("SENDGRID_API_KEY").map_err(|e| ProviderError::Config(e.to_string()))?;
        let from = env_required("MAIL_FROM").map_err(|e| ProviderError::Config(e.to_string()))?;

        Ok(Self::new(api_key, from))
    }
}

/// SendGrid transactional mail provider.
pub struct SendGridProvider {
    config: SendGridConfig,
    client: Client,
}

impl SendGridProvider {
    pub fn new(config: SendGridConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }
}

// SendGrid API request/response structures

#[derive(Debug, Serialize)]
struct SendGridRequest {
    personalizations: Vec<Personalization>,
    from: EmailAddress,
    subject: String,
    content: Vec<Content>,
    attachments: Vec<SendGridAttachment>,
}

#[derive(Debug, Serialize)]
struct Personalization {
    to: Vec<EmailAddress>,
}

#[derive(Debug, Serialize)]
struct EmailAddress {
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(rename = "type")]
    content_type: String,
    value: String,
}

#[derive(Debug, Serialize)]
struct SendGridAttachment {
    content: String,
    #[serde(rename = "type")]
    content_type: String,
    filename: String,
    disposition: String,
}

#[derive(Debug, Deserialize)]
struct SendGridError {
    errors: Vec<SendGridErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct SendGridErrorDetail {
    message: String,
}

#[async_trait]
impl MailProvider for SendGridProvider {
    async fn send(&self, email: &OutgoingEmail) -> Result<SentMail, ProviderError> {
        let sender = parse_sender(&self.config.from);

        let request = SendGridRequest {
            personalizations: vec![Personalization {
                to: vec![EmailAddress {
                    email: email.to.clone(),
                    name: None,
                }],
            }],
            from: EmailAddress {
                email: sender.email,
                name: Some(sender.name),
            },
            subject: email.subject.clone(),
            content: vec![
                Content {
                    content_type: "text/plain".to_string(),
                    value: email.text_body.clone(),
                },
                Content {
                    content_type: "text/html".to_string(),
                    value: email.html_body.clone(),
                },
            ],
            attachments: vec![SendGridAttachment {
                content: STANDARD.encode(&email.attachment.content),
                content_type: "application/pdf".to_string(),
                filename: email.attachment.filename.clone(),
                disposition: "attachment".to_string(),
            }],
        };

        debug!(
            to = %email.to,
            subject = %email.subject,
            attachment = %email.attachment.filename,
            "Sending email via SendGrid"
        );

        let response = self
            .client
            .post(format!("{}/mail/send", self.config.api_url))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let message_id = response
            .headers()
            .get("x-message-id")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        if status.is_success() {
            info!(to = %email.to, message_id = ?message_id, "Email sent via SendGrid");
            Ok(SentMail { message_id })
        } else {
            let error_body = response.text().await.unwrap_or_default();
            error!(to = %email.to, status = %status, error = %error_body, "Failed to send email via SendGrid");

            // Use the provider's own error messages when parseable
            let message = if let Ok(sg_error) = serde_json::from_str::<SendGridError>(&error_body) {
                sg_error
                    .errors
                    .into_iter()
                    .map(|e| e.message)
                    .collect::<Vec<_>>()
                    .join(", ")
            } else {
                error_body
            };

            Err(ProviderError::Send {
                code: status.to_string(),
                message,
            })
        }
    }

    fn name(&self) -> &'static str {
        "sendgrid"
    }
}
