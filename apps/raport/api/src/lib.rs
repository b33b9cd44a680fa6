//! PDF Report Mailer API
//!
//! Accepts `{to, subject?, message?}`, renders a one-page PDF and dispatches
//! it as an email attachment through the provider selected by
//! `MAIL_PROVIDER` (smtp, gmail, resend or sendgrid).

use core_config::tracing::{init_tracing, install_color_eyre};
use domain_dispatch::{providers::build_provider, DispatchService, PdfRenderer};
use std::sync::Arc;
use tracing::{info, warn};

pub mod api;
pub mod config;
pub mod state;

use config::Config;
use state::AppState;

/// Load configuration, wire the dispatch service and serve until ctrl-c.
pub async fn run() -> eyre::Result<()> {
    // Install color-eyre first for colored error output (before any fallible operations)
    install_color_eyre();

    // Load configuration from environment variables
    let config = Config::from_env()?;

    // Initialize tracing with ErrorLayer for span trace capture
    init_tracing(&config.environment);

    // Missing credentials leave the service running but unconfigured; every
    // dispatch then fails fast with ProviderNotConfigured.
    let provider = match build_provider(config.provider_kind) {
        Ok(provider) => {
            info!(provider = %config.provider_kind, "Mail provider configured");
            Some(provider)
        }
        Err(e) => {
            warn!(provider = %config.provider_kind, error = %e, "Mail provider not configured, sends will fail");
            None
        }
    };

    let renderer = Arc::new(PdfRenderer::new(config.dispatch.attachment_filename.clone()));
    let dispatch = Arc::new(DispatchService::new(
        renderer,
        provider,
        config.dispatch.clone(),
    ));

    let address = config.server.address();
    let app = api::routes(AppState { config, dispatch });

    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("Listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    info!("Shutdown signal received, draining connections");
}
