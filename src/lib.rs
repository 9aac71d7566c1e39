pub mod config;
pub mod error;
pub mod health;
pub mod logging;
pub mod metrics;
pub mod model;
pub mod points;
pub mod server;
pub mod shutdown;
pub mod state;
pub mod store;
pub mod validation;

pub use config::{CliArgs, ServerConfig};
pub use error::{ErrorCode, ReceiptError};
pub use logging::{LoggingConfig, init_logging};
pub use points::{PointsBreakdown, score};
pub use server::build_router;
pub use shutdown::{ShutdownConfig, ShutdownCoordinator};
pub use store::{InMemoryReceiptStore, ReceiptStore};
pub use validation::{ValidatedReceipt, ValidationError, validate};

use anyhow::Result;
use state::AppState;
use std::{future::IntoFuture, sync::Arc};
use tokio::net::TcpListener;

pub async fn run_server(config: ServerConfig) -> Result<()> {
    let config = Arc::new(config);
    let shutdown_config =
        ShutdownConfig::default().with_handler_timeout(config.graceful_shutdown_timeout_secs);
    let mut coordinator = ShutdownCoordinator::new(shutdown_config);
    let state =
        Arc::new(AppState::new(config.clone()).with_shutdown_token(coordinator.token()));
    coordinator.add_handler(Box::new(shutdown::StoreShutdownHandler::new(
        state.store().clone(),
    )));
    let coordinator = Arc::new(coordinator);

    let router = build_router(state);
    let listener = TcpListener::bind(config.http_bind_address).await?;
    let actual_addr = listener.local_addr()?;
    tracing::info!(
        bind = %actual_addr,
        max_body_bytes = config.max_body_bytes,
        "receipt processor listening"
    );

    let shutdown_coordinator = coordinator.clone();
    let server_result = axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown_coordinator.wait_for_signal().await;
        })
        .into_future()
        .await;

    tracing::info!("server stopped, running shutdown handlers");
    if let Err(e) = coordinator.run_handlers().await {
        tracing::error!("error during shutdown: {}", e);
    }

    server_result.map_err(anyhow::Error::from)
}
