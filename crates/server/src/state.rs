use std::sync::Arc;

use lobbyline_core::{Authenticator, Config, QueueEngine, SanitizedConfig};

/// Shared application state
pub struct AppState {
    config: Config,
    engine: Arc<QueueEngine>,
    authenticator: Arc<dyn Authenticator>,
}

impl AppState {
    pub fn new(
        config: Config,
        engine: Arc<QueueEngine>,
        authenticator: Arc<dyn Authenticator>,
    ) -> Self {
        Self {
            config,
            engine,
            authenticator,
        }
    }

    pub fn engine(&self) -> &QueueEngine {
        &self.engine
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn authenticator(&self) -> &dyn Authenticator {
        self.authenticator.as_ref()
    }
}
