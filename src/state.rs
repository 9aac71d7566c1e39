use crate::config::ServerConfig;
use crate::store::{InMemoryReceiptStore, ReceiptStore};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    config: Arc<ServerConfig>,
    store: Arc<dyn ReceiptStore>,
    shutdown: CancellationToken,
}

impl AppState {
    pub fn new(config: Arc<ServerConfig>) -> Self {
        Self::with_store(config, Arc::new(InMemoryReceiptStore::new()))
    }

    pub fn with_store(config: Arc<ServerConfig>, store: Arc<dyn ReceiptStore>) -> Self {
        Self {
            config,
            store,
            shutdown: CancellationToken::new(),
        }
    }

    /// Ties readiness to an external shutdown signal.
    pub fn with_shutdown_token(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub fn config(&self) -> Arc<ServerConfig> {
        self.config.clone()
    }

    pub fn store(&self) -> &Arc<dyn ReceiptStore> {
        &self.store
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}
