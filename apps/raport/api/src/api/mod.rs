use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

pub mod health;
pub mod send;

/// Build the application router.
///
/// `/send-pdf` is an alias kept for callers of the older deployments.
pub fn routes(state: crate::state::AppState) -> Router {
    Router::new()
        .route("/send", post(send::send_handler))
        .route("/send-pdf", post(send::send_handler))
        .route("/healthz", get(health::healthz_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
