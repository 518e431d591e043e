use std::sync::Arc;

use movecheck_pipeline::store::AnalysisStore;
use movecheck_pipeline::AnalysisRunner;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Task, result and video storage.
    pub store: Arc<dyn AnalysisStore>,
    /// Background analysis dispatch. Shares `store`.
    pub runner: AnalysisRunner,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(runner: AnalysisRunner, config: ServerConfig) -> Self {
        Self {
            store: Arc::clone(runner.store()),
            runner,
            config: Arc::new(config),
        }
    }
}
