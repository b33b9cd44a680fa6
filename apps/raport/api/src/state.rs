//! Application state management.

use domain_dispatch::DispatchService;
use std::sync::Arc;

/// Shared application state.
///
/// Cloned for each handler (inexpensive Arc clones). The dispatch service
/// and its provider configuration are immutable for the process lifetime.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded from environment variables
    pub config: crate::config::Config,
    /// The dispatch service wired to the configured mail provider
    pub dispatch: Arc<DispatchService>,
}
