//! Gmail mailbox API provider.
//!
//! Authenticates by exchanging a long-lived refresh token for a short-lived
//! access token, then submits the message as a base64url-encoded RFC 2822
//! blob to the `messages/send` endpoint. The MIME envelope is framed by hand:
//! exactly two parts (text/plain, then the PDF as base64) under one fixed
//! boundary token.

use super::{MailProvider, OutgoingEmail, SentMail};
use crate::error::ProviderError;
use async_trait::async_trait;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use core_config::env_required;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

/// Fixed multipart boundary token. Opens every part, closes with `--`.
const MIME_BOUNDARY: &str = "raport_pdf_boundary";

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const API_URL: &str = "https://gmail.googleapis.com/gmail/v1";

/// Gmail API configuration.
///
/// The refresh token is obtained once, out of band, by an interactive OAuth
/// consent flow and supplied here via the environment.
#[derive(Debug, Clone)]
pub struct GmailConfig {
    /// OAuth client ID.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
    /// Long-lived refresh token with the `gmail.send` scope.
    pub refresh_token: String,
    /// Sender header, e.g. `"Raport <me@gmail.com>"`.
    pub from: String,
    /// Token endpoint (overridable for tests).
    pub token_url: String,
    /// API base URL (overridable for tests).
    pub api_url: String,
}

impl GmailConfig {
    pub fn from_env() -> Result<Self, ProviderError> {
        let client_id =
            env_required("GCLIENT_ID").map_err(|e| ProviderError::Config(e.to_string()))?;
        let client_secret =
            env_required("GCLIENT_SECRET").map_err(|e| ProviderError::Config(e.to_string()))?;
        let refresh_token =
            env_required("GMAIL_REFRESH_TOKEN").map_err(|e| ProviderError::Config(e.to_string()))?;
        let from = env_required("MAIL_FROM").map_err(|e| ProviderError::Config(e.to_string()))?;

        Ok(Self {
            client_id,
            client_secret,
            refresh_token,
            from,
            token_url: TOKEN_URL.to_string(),
            api_url: API_URL.to_string(),
        })
    }
}

/// Mail provider submitting through the Gmail mailbox API.
pub struct GmailProvider {
    config: GmailConfig,
    client: Client,
}

#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    refresh_token: &'a str,
    grant_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest {
    raw: String,
}

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GmailErrorBody {
    error: GmailErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GmailErrorDetail {
    message: String,
}

impl GmailProvider {
    pub fn new(config: GmailConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    /// Exchange the refresh token for a short-lived access token.
    async fn fetch_access_token(&self) -> Result<String, ProviderError> {
        let response = self
            .client
            .post(&self.config.token_url)
            .form(&TokenRequest {
                client_id: &self.config.client_id,
                client_secret: &self.config.client_secret,
                refresh_token: &self.config.refresh_token,
                grant_type: "refresh_token",
            })
            .send()
            .await
            .map_err(|e| ProviderError::Auth(format!("Token exchange failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Auth(format!(
                "Token exchange rejected ({}): {}",
                status, body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Auth(format!("Invalid token response: {}", e)))?;

        Ok(token.access_token)
    }

    /// Frame the two-part MIME envelope: text/plain, then the PDF as a
    /// base64 part. Every part opens with `--boundary`, the envelope closes
    /// with `--boundary--`.
    fn build_mime(&self, email: &OutgoingEmail) -> String {
        let attachment_b64 = STANDARD.encode(&email.attachment.content);

        format!(
            "From: {from}\r\n\
             To: {to}\r\n\
             Subject: {subject}\r\n\
             MIME-Version: 1.0\r\n\
             Content-Type: multipart/mixed; boundary=\"{b}\"\r\n\
             \r\n\
             --{b}\r\n\
             Content-Type: text/plain; charset=\"UTF-8\"\r\n\
             Content-Transfer-Encoding: 7bit\r\n\
             \r\n\
             {body}\r\n\
             --{b}\r\n\
             Content-Type: application/pdf; name=\"{file}\"\r\n\
             Content-Transfer-Encoding: base64\r\n\
             Content-Disposition: attachment; filename=\"{file}\"\r\n\
             \r\n\
             {content}\r\n\
             --{b}--",
            from = self.config.from,
            to = email.to,
            subject = email.subject,
            b = MIME_BOUNDARY,
            body = email.text_body,
            file = email.attachment.filename,
            content = attachment_b64,
        )
    }

    /// Base64url-encode the framed message (`+`→`-`, `/`→`_`, padding
    /// stripped), as the API requires for the `raw` field.
    fn encode_raw(&self, email: &OutgoingEmail) -> String {
        URL_SAFE_NO_PAD.encode(self.build_mime(email))
    }
}

#[async_trait]
impl MailProvider for GmailProvider {
    async fn send(&self, email: &OutgoingEmail) -> Result<SentMail, ProviderError> {
        debug!(
            to = %email.to,
            subject = %email.subject,
            attachment = %email.attachment.filename,
            "Sending email via Gmail API"
        );

        let access_token = self.fetch_access_token().await?;
        let raw = self.encode_raw(email);

        let response = self
            .client
            .post(format!("{}/users/me/messages/send", self.config.api_url))
            .bearer_auth(access_token)
            .json(&SendMessageRequest { raw })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(to = %email.to, status = %status, error = %body, "Gmail API rejected the message");

            let message = match serde_json::from_str::<GmailErrorBody>(&body) {
                Ok(parsed) => parsed.error.message,
                Err(_) => body,
            };
            return Err(match status.as_u16() {
                401 | 403 => ProviderError::Auth(message),
                _ => ProviderError::Send {
                    code: status.to_string(),
                    message,
                },
            });
        }

        let sent: SendMessageResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Transport(format!("Invalid send response: {}", e)))?;

        info!(to = %email.to, message_id = ?sent.id, "Email sent via Gmail API");

        Ok(SentMail { message_id: sent.id })
    }

    fn name(&self) -> &'static str {
        "gmail"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::MailAttachment;

    fn provider() -> GmailProvider {
        GmailProvider::new(GmailConfig {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            refresh_token: "refresh".to_string(),
            from: "Raport <me@example.com>".to_string(),
            token_url: TOKEN_URL.to_string(),
            api_url: API_URL.to_string(),
        })
    }

    fn email(title: &str, body: &str, content: &[u8]) -> OutgoingEmail {
        OutgoingEmail {
            to: "it@example.com".to_string(),
            subject: title.to_string(),
            text_body: body.to_string(),
            html_body: format!("<p>{}</p>", body),
            attachment: MailAttachment {
                filename: "raport-godzin.pdf".to_string(),
                content: content.to_vec(),
            },
        }
    }

    #[test]
    fn test_mime_envelope_part_order_and_boundary() {
        let p = provider();
        let mime = p.build_mime(&email("T", "B", b"pdfbytes"));

        let text_pos = mime.find("Content-Type: text/plain").unwrap();
        let pdf_pos = mime.find("Content-Type: application/pdf").unwrap();
        assert!(text_pos < pdf_pos, "text part must precede the pdf part");

        // Boundary opens both parts and closes the envelope
        assert_eq!(mime.matches(&format!("--{}\r\n", MIME_BOUNDARY)).count(), 2);
        assert!(mime.ends_with(&format!("--{}--", MIME_BOUNDARY)));

        assert!(mime.contains("Content-Transfer-Encoding: 7bit"));
        assert!(mime.contains("Content-Transfer-Encoding: base64"));
        assert!(mime.contains("\r\n\r\nB\r\n"));
    }

    #[test]
    fn test_raw_payload_is_base64url_no_padding() {
        let p = provider();
        let raw = p.encode_raw(&email("T", "B", b"pdfbytes"));

        assert!(!raw.contains('+'));
        assert!(!raw.contains('/'));
        assert!(!raw.contains('='));
        // Decodable with the url-safe alphabet
        URL_SAFE_NO_PAD.decode(&raw).unwrap();
    }

    #[test]
    fn test_raw_payload_round_trips_title_body_and_attachment() {
        let p = provider();
        let attachment: &[u8] = b"%PDF-1.4 example bytes \xff\xfe";
        let raw = p.encode_raw(&email("T", "B", attachment));

        let decoded = String::from_utf8(URL_SAFE_NO_PAD.decode(&raw).unwrap()).unwrap();
        assert!(decoded.contains("Subject: T\r\n"));
        assert!(decoded.contains("\r\n\r\nB\r\n"));

        // Recover the attachment bytes from the base64 part
        let marker = "Content-Transfer-Encoding: base64\r\n\
                      Content-Disposition: attachment; filename=\"raport-godzin.pdf\"\r\n\r\n";
        let start = decoded.find(marker).unwrap() + marker.len();
        let end = decoded[start..].find("\r\n").unwrap() + start;
        let recovered = STANDARD.decode(&decoded[start..end]).unwrap();
        assert_eq!(recovered, attachment);
    }

    #[test]
    fn test_gmail_config_from_env_requires_credentials() {
        temp_env::with_vars(
            [
                ("GCLIENT_ID", None::<&str>),
                ("GCLIENT_SECRET", Some("s")),
                ("GMAIL_REFRESH_TOKEN", Some("r")),
                ("MAIL_FROM", Some("a@b.pl")),
            ],
            || {
                assert!(matches!(
                    GmailConfig::from_env(),
                    Err(ProviderError::Config(_))
                ));
            },
        );
    }
}
