pub mod api;
pub mod config;
pub mod error;
pub mod live;
pub mod models;
pub mod services;
pub mod storage;

pub use models::*;

use config::AppConfig;
use live::LiveHub;
use std::sync::Arc;
use storage::Storage;

/// Core application state shared across all handlers: the persistent
/// store, link-building configuration, and the live relay hub.
pub struct AppCore {
    pub storage: Arc<Storage>,
    pub config: AppConfig,
    pub live: Arc<LiveHub>,
}

impl AppCore {
    pub fn new(db_path: &str, config: AppConfig) -> anyhow::Result<Self> {
        let storage = Arc::new(Storage::new(db_path)?);

        Ok(Self {
            storage,
            config,
            live: Arc::new(LiveHub::new()),
        })
    }
}
