use std::sync::Arc;

use crate::config::Config;
use crate::store::DocumentStore;
use crate::utils::locks::AggregateLocks;

/// Shared engine state handed to the (external) transport layer.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn DocumentStore>,
    pub locks: AggregateLocks,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn DocumentStore>) -> Self {
        tracing::info!(
            "Engine state initialized (default word count: {})",
            config.default_word_count
        );
        Self {
            config,
            store,
            locks: AggregateLocks::new(),
        }
    }
}

pub mod answer_service;
pub mod eligibility_service;
pub mod hint_service;
pub mod session_service;
pub mod task_service;
