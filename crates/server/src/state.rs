use std::sync::Arc;
use std::time::Duration;

use streamsift_core::{BatchExecutor, Config, RankingConfig, SanitizedConfig};

/// Shared application state
pub struct AppState {
    config: Config,
    executor: Arc<dyn BatchExecutor>,
}

impl AppState {
    pub fn new(config: Config, executor: Arc<dyn BatchExecutor>) -> Self {
        Self { config, executor }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    /// Ranking preferences every batch starts from.
    pub fn ranking(&self) -> &RankingConfig {
        &self.config.ranking
    }

    pub fn executor(&self) -> &dyn BatchExecutor {
        self.executor.as_ref()
    }

    /// Caller-side deadline for one batch.
    pub fn batch_timeout(&self) -> Duration {
        Duration::from_secs(self.config.worker.timeout_secs)
    }
}
