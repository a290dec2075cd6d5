use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::ChatModel;

/// Shared application state injected into all route handlers via Axum extractors.
/// Read-only after startup; concurrent requests share nothing mutable.
#[derive(Clone)]
pub struct AppState {
    /// The remote model seam. Production wires in `LlmClient`; tests
    /// substitute a stub.
    pub model: Arc<dyn ChatModel>,
    pub config: Config,
}
