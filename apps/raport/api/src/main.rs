//! PDF Report Mailer API - Entry Point
//!
//! HTTP service that renders a PDF from a request and mails it through the
//! configured provider.

#[tokio::main]
async fn main() -> eyre::Result<()> {
    raport_api::run().await
}
