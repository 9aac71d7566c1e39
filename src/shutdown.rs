//! Graceful shutdown coordination
//!
//! On SIGINT or SIGTERM (or an explicit [`ShutdownCoordinator::trigger`]) the
//! HTTP server stops accepting connections and drains in-flight requests.
//! Registered [`ShutdownHandler`]s then run, bounded by the drain timeout.
//!
//! ```rust,no_run
//! use receipt_processor::shutdown::{ShutdownConfig, ShutdownCoordinator};
//!
//! # async fn example() {
//! let coordinator = ShutdownCoordinator::new(ShutdownConfig::default());
//! let token = coordinator.token();
//!
//! tokio::spawn(async move {
//!     token.cancelled().await;
//!     // stop background work
//! });
//!
//! coordinator.wait_for_signal().await;
//! # }
//! ```

use crate::metrics::METRICS;
use crate::store::ReceiptStore;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[derive(Debug, Clone)]
pub struct ShutdownConfig {
    /// Upper bound on running shutdown handlers
    pub handler_timeout: Duration,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            handler_timeout: Duration::from_secs(30),
        }
    }
}

impl ShutdownConfig {
    pub fn with_handler_timeout(mut self, timeout_secs: u64) -> Self {
        self.handler_timeout = Duration::from_secs(timeout_secs);
        self
    }
}

pub struct ShutdownCoordinator {
    config: ShutdownConfig,
    shutdown_token: CancellationToken,
    handlers: Vec<Box<dyn ShutdownHandler>>,
}

impl ShutdownCoordinator {
    pub fn new(config: ShutdownConfig) -> Self {
        Self {
            config,
            shutdown_token: CancellationToken::new(),
            handlers: Vec::new(),
        }
    }

    pub fn add_handler(&mut self, handler: Box<dyn ShutdownHandler>) {
        self.handlers.push(handler);
    }

    /// Token cancelled once shutdown begins
    pub fn token(&self) -> CancellationToken {
        self.shutdown_token.clone()
    }

    pub fn is_shutdown_initiated(&self) -> bool {
        self.shutdown_token.is_cancelled()
    }

    /// Begin shutdown without waiting for a signal.
    pub fn trigger(&self) {
        self.shutdown_token.cancel();
    }

    /// Resolves on SIGINT, SIGTERM or [`trigger`](Self::trigger), and cancels
    /// the shared token.
    pub async fn wait_for_signal(&self) {
        let ctrl_c = async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                error!(?err, "failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(err) => {
                    error!(?err, "failed to install SIGTERM handler");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => info!("received SIGINT (Ctrl+C), initiating graceful shutdown"),
            _ = terminate => info!("received SIGTERM, initiating graceful shutdown"),
            _ = self.shutdown_token.cancelled() => info!("shutdown requested"),
        }

        self.shutdown_token.cancel();
    }

    /// Runs every registered handler once the server has stopped.
    pub async fn run_handlers(&self) -> Result<()> {
        let run_all = async {
            for handler in &self.handlers {
                if let Err(err) = handler.shutdown().await {
                    warn!(handler = handler.name(), ?err, "shutdown handler failed");
                }
            }
        };

        match timeout(self.config.handler_timeout, run_all).await {
            Ok(()) => {
                info!("graceful shutdown completed");
                Ok(())
            }
            Err(_) => {
                error!(
                    timeout_secs = self.config.handler_timeout.as_secs(),
                    "shutdown handlers exceeded timeout"
                );
                Err(anyhow::anyhow!("shutdown timeout exceeded"))
            }
        }
    }
}

#[async_trait::async_trait]
pub trait ShutdownHandler: Send + Sync {
    fn name(&self) -> &'static str;

    async fn shutdown(&self) -> Result<()>;
}

/// Logs final store statistics. In-memory receipts are not persisted.
pub struct StoreShutdownHandler {
    store: Arc<dyn ReceiptStore>,
}

impl StoreShutdownHandler {
    pub fn new(store: Arc<dyn ReceiptStore>) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl ShutdownHandler for StoreShutdownHandler {
    fn name(&self) -> &'static str {
        "store"
    }

    async fn shutdown(&self) -> Result<()> {
        let stored = self.store.len();
        METRICS.update_stored(stored);
        info!(stored_receipts = stored, "receipt store released");
        Ok(())
    }
}
