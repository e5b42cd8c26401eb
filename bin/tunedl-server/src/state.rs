//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use tunedl_core::{Dispatcher, JobRegistry, StatusReporter};

use crate::config::Config;

/// State shared across all HTTP handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Accepts submissions and spawns their workers.
    pub dispatcher: Dispatcher,
    /// Read-only queries over the job registry.
    pub reporter: StatusReporter,
}

impl AppState {
    pub fn new(config: Config, dispatcher: Dispatcher) -> Self {
        let reporter = StatusReporter::new(dispatcher.registry().clone());
        Self {
            config: Arc::new(config),
            dispatcher,
            reporter,
        }
    }

    pub fn registry(&self) -> &JobRegistry {
        self.dispatcher.registry()
    }
}
