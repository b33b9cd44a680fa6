//! Dispatch Domain
//!
//! Renders a PDF report from an inbound request and delivers it as an email
//! attachment through one configured provider.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   API Handler   │  ← POST /send
//! └────────┬────────┘
//!          │
//! ┌────────▼────────┐
//! │ DispatchService │  ← validate, bound concurrency, per-stage timeouts
//! └────────┬────────┘
//!          │
//! ┌────────▼────────┐
//! │ DocumentRenderer│  ← one-page PDF (title + body)
//! └────────┬────────┘
//!          │
//! ┌────────▼────────┐
//! │  MailProvider   │  ← SMTP, Gmail API, Resend, SendGrid
//! └─────────────────┘
//! ```
//!
//! One provider is selected by configuration at process start; each dispatch
//! makes at most one delivery attempt and maps every failure into the
//! uniform error model in [`error`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_dispatch::{
//!     providers::{build_provider, ProviderKind},
//!     DispatchConfig, DispatchService, PdfRenderer, SendRequest,
//! };
//!
//! let config = DispatchConfig::default();
//! let renderer = PdfRenderer::new(config.attachment_filename.clone());
//! let provider = build_provider(ProviderKind::from_env()?).ok();
//! let service = DispatchService::new(Arc::new(renderer), provider, config);
//!
//! let receipt = service.dispatch(request).await?;
//! ```

pub mod error;
pub mod models;
pub mod providers;
pub mod render;
pub mod service;

// Re-export commonly used types
pub use error::{DispatchError, DispatchResult, ProviderError};
pub use models::{DispatchReceipt, RenderedDocument, SendRequest};
pub use providers::{MailProvider, OutgoingEmail, ProviderKind, SentMail};
pub use render::{DocumentRenderer, PdfRenderer};
pub use service::{DispatchConfig, DispatchService};
