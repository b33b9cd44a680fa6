//! Resend email provider implementation.

use super::{MailProvider, OutgoingEmail, SentMail};
use crate::error::ProviderError;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use core_config::env_required;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

/// Resend API configuration.
#[derive(Debug, Clone)]
pub struct ResendConfig {
    /// Resend API key.
    pub api_key: String,
    /// Sender header, passed through as-is (Resend accepts
    /// `"Display Name <email>"`).
    pub from: String,
    /// API base URL (defaults to production).
    pub api_url: String,
}

impl ResendConfig {
    pub fn new(api_key: String, from: String) -> Self {
        Self {
            api_key,
            from,
            api_url: "https://api.resend.com".to_string(),
        }
    }

    pub fn from_env() -> Result<Self, ProviderError> {
        let api_key =
            env_required("RESEND_API_KEY").map_err(|e| ProviderError::Config(e.to_string()))?;
        let from = std::env::var("MAIL_FROM")
            .unwrap_or_else(|_| "Emerlog Test <onboarding@resend.dev>".to_string());

        Ok(Self::new(api_key, from))
    }
}

/// Resend transactional mail provider.
pub struct ResendProvider {
    config: ResendConfig,
    client: Client,
}

impl ResendProvider {
    pub fn new(config: ResendConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ResendRequest<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: &'a str,
    html: &'a str,
    text: &'a str,
    attachments: Vec<ResendAttachment>,
}

#[derive(Debug, Serialize)]
struct ResendAttachment {
    filename: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ResendResponse {
    id: Option<String>,
    // Resend reports some failures inside a 200 body
    error: Option<ResendError>,
}

#[derive(Debug, Deserialize)]
struct ResendError {
    message: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

#[async_trait]
impl MailProvider for ResendProvider {
    async fn send(&self, email: &OutgoingEmail) -> Result<SentMail, ProviderError> {
        let request = ResendRequest {
            from: &self.config.from,
            to: vec![&email.to],
            subject: &email.subject,
            html: &email.html_body,
            text: &email.text_body,
            attachments: vec![ResendAttachment {
                filename: email.attachment.filename.clone(),
                content: STANDARD.encode(&email.attachment.content),
            }],
        };

        debug!(
            to = %email.to,
            subject = %email.subject,
            attachment = %email.attachment.filename,
            "Sending email via Resend"
        );

        let response = self
            .client
            .post(format!("{}/emails", self.config.api_url))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            error!(to = %email.to, status = %status, error = %body, "Failed to send email via Resend");

            let message = match serde_json::from_str::<ResendResponse>(&body) {
                Ok(ResendResponse {
                    error: Some(err), ..
                }) => err.message.or(err.name).unwrap_or(body),
                _ => body,
            };
            return Err(ProviderError::Send {
                code: status.to_string(),
                message,
            });
        }

        let parsed: ResendResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::Transport(format!("Invalid Resend response: {}", e)))?;

        // Soft failure inside a 2xx body counts as a failure
        if let Some(err) = parsed.error {
            let message = err.message.or(err.name).unwrap_or_else(|| "Resend error".to_string());
            error!(to = %email.to, error = %message, "Resend reported an error in a 2xx response");
            return Err(ProviderError::Send {
                code: status.to_string(),
                message,
            });
        }

        info!(to = %email.to, message_id = ?parsed.id, "Email sent via Resend");

        Ok(SentMail {
            message_id: parsed.id,
        })
    }

    fn name(&self) -> &'static str {
        "resend"
    }
}
