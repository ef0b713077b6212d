use std::sync::Arc;

use studio_core::completion::{CompletionBackend, GeminiClient};
use studio_core::config::StudioConfig;
use studio_core::studio::Studio;

/// Shared application state for the server.
#[derive(Clone)]
pub struct AppState {
    pub config: StudioConfig,
    pub studio: Arc<Studio>,
}

impl AppState {
    /// State backed by the real remote completion client.
    pub fn new(config: StudioConfig) -> Self {
        let backend: Arc<dyn CompletionBackend> =
            Arc::new(GeminiClient::from_config(&config.provider));
        Self::with_backend(config, backend)
    }

    /// State with an injected backend (tests, alternative providers).
    pub fn with_backend(config: StudioConfig, backend: Arc<dyn CompletionBackend>) -> Self {
        Self {
            config,
            studio: Arc::new(Studio::new(backend)),
        }
    }
}
