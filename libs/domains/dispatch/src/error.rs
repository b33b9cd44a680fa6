//! Error types for the dispatch domain.

use thiserror::Error;

/// Result type for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Errors surfaced by a mail provider.
///
/// `Config` and `Auth` are credential/configuration-level problems (the
/// request never had a chance), `Send` and `Transport` are delivery-level
/// failures reported by or on the way to the provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Provider configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Provider rejected our credentials (e.g. token exchange failed).
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Provider rejected the message. Carries the provider's own error
    /// code/status and message verbatim.
    #[error("{code}: {message}")]
    Send { code: String, message: String },

    /// Transport-level failure (connection, TLS, timeout).
    #[error("Transport error: {0}")]
    Transport(String),
}

impl ProviderError {
    /// Whether the failure is credential/config-level rather than
    /// delivery-level. Drives the HTTP status mapping (500 vs 502).
    pub fn is_configuration(&self) -> bool {
        matches!(self, ProviderError::Config(_) | ProviderError::Auth(_))
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Transport(err.to_string())
    }
}

/// Errors that can occur during a dispatch.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Request did not carry a recipient. Original wording kept for API
    /// compatibility with existing callers.
    #[error("Brak pola 'to'.")]
    MissingRecipient,

    /// No mail provider credentials were present at startup.
    #[error("Mail provider is not configured")]
    ProviderNotConfigured,

    /// Document rendering failed; nothing was sent.
    #[error("Document rendering failed: {0}")]
    Render(String),

    /// The configured provider failed or rejected the message.
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

impl DispatchError {
    /// Stable machine-readable code for the uniform response envelope.
    pub fn code(&self) -> &'static str {
        match self {
            DispatchError::MissingRecipient => "MISSING_RECIPIENT",
            DispatchError::ProviderNotConfigured => "PROVIDER_NOT_CONFIGURED",
            DispatchError::Render(_) => "RENDER_ERROR",
            DispatchError::Provider(_) => "PROVIDER_SEND_ERROR",
        }
    }
}
