//! Shared application state.

use crate::config::ApiConfig;
use vendo_db::Database;
use vendo_engine::Services;

/// State handed to every handler. Cloning is cheap: the services are thin
/// wrappers over a reference-counted pool.
#[derive(Debug, Clone)]
pub struct AppState {
    pub services: Services,
    pub config: ApiConfig,
}

impl AppState {
    pub fn new(db: &Database, config: ApiConfig) -> AppState {
        AppState {
            services: Services::new(db),
            config,
        }
    }
}
