use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::store::{CacheStore, FileStore, MemoryStore};
use crate::utils::config::{CacheBackend, Config};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub http_client: Client,
    pub store: Arc<dyn CacheStore>,
}

impl AppState {
    pub fn init(config: Config) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.upstream_timeout_secs))
            .build()?;

        let store: Arc<dyn CacheStore> = match config.cache_backend {
            CacheBackend::Fs => Arc::new(FileStore::new(config.cache_dir.clone())),
            CacheBackend::Memory => Arc::new(MemoryStore::new()),
        };

        Ok(AppState {
            config,
            http_client,
            store,
        })
    }
}
