//! Dispatch service: validate, render, send.

use crate::error::{DispatchError, DispatchResult, ProviderError};
use crate::models::{DispatchReceipt, SendRequest, DEFAULT_ATTACHMENT_FILENAME};
use crate::providers::{MailAttachment, MailProvider, OutgoingEmail};
use crate::render::DocumentRenderer;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::{info, warn};

/// Configuration for the dispatch service.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Filename the rendered document is attached under.
    pub attachment_filename: String,
    /// Timeout applied separately to the render and send stages.
    pub stage_timeout: Duration,
    /// Maximum number of concurrent in-flight dispatches.
    pub max_in_flight: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            attachment_filename: std::env::var("ATTACHMENT_FILENAME")
                .unwrap_or_else(|_| DEFAULT_ATTACHMENT_FILENAME.to_string()),
            stage_timeout: Duration::from_secs(
                std::env::var("DISPATCH_STAGE_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .unwrap_or(30),
            ),
            max_in_flight: std::env::var("DISPATCH_MAX_IN_FLIGHT")
                .unwrap_or_else(|_| "16".to_string())
                .parse()
                .unwrap_or(16),
        }
    }
}

/// Validates a send request, renders the PDF and delivers it through the
/// configured provider.
///
/// Exactly one outbound provider call per invocation; no retries and no
/// queueing, so a failed dispatch was attempted at most once. Callers must
/// not retry blindly: there is no idempotency key, a retry risks a
/// duplicate send.
pub struct DispatchService {
    renderer: Arc<dyn DocumentRenderer>,
    provider: Option<Arc<dyn MailProvider>>,
    limiter: Arc<Semaphore>,
    config: DispatchConfig,
}

impl DispatchService {
    /// Create a service with a configured provider.
    pub fn new(
        renderer: Arc<dyn DocumentRenderer>,
        provider: Option<Arc<dyn MailProvider>>,
        config: DispatchConfig,
    ) -> Self {
        if provider.is_none() {
            warn!("No mail provider configured, dispatches will fail until credentials are set");
        }
        Self {
            renderer,
            provider,
            limiter: Arc::new(Semaphore::new(config.max_in_flight)),
            config,
        }
    }

    /// One end-to-end dispatch: validate → render → send.
    pub async fn dispatch(&self, request: SendRequest) -> DispatchResult<DispatchReceipt> {
        if request.recipient.trim().is_empty() {
            return Err(DispatchError::MissingRecipient);
        }

        // Fail fast before rendering when no provider was configured
        let provider = self
            .provider
            .as_ref()
            .ok_or(DispatchError::ProviderNotConfigured)?;

        // Bound concurrent render+send work; the semaphore is never closed
        let _permit = self.limiter.acquire().await.map_err(|e| {
            DispatchError::Provider(ProviderError::Transport(format!(
                "Dispatch limiter closed: {}",
                e
            )))
        })?;

        let document = match timeout(
            self.config.stage_timeout,
            self.renderer
                .render(request.title_or_default(), request.message_or_default()),
        )
        .await
        {
            Ok(result) => result?,
            Err(_) => {
                return Err(DispatchError::Render(format!(
                    "Rendering timed out after {:?}",
                    self.config.stage_timeout
                )))
            }
        };

        let email = OutgoingEmail {
            to: request.recipient.trim().to_string(),
            subject: request.subject_or_default().to_string(),
            text_body: request.email_body_or_default().to_string(),
            html_body: request.html_body(),
            attachment: MailAttachment {
                filename: document.filename,
                content: document.bytes,
            },
        };

        let sent = match timeout(self.config.stage_timeout, provider.send(&email)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(DispatchError::Provider(ProviderError::Transport(format!(
                    "Send timed out after {:?}",
                    self.config.stage_timeout
                ))))
            }
        };

        info!(
            to = %email.to,
            provider = provider.name(),
            message_id = ?sent.message_id,
            "Dispatched PDF email"
        );

        Ok(DispatchReceipt {
            provider: provider.name(),
            message_id: sent.message_id,
        })
    }

    /// Whether a provider was configured at startup.
    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }
}
