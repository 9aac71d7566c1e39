use crate::error::{ErrorCode, ReceiptError};
use crate::health::{self, HealthChecker};
use crate::metrics::{METRICS, RequestMetrics};
use crate::model::{PointsResponse, ProcessResponse, Receipt, ReceiptId};
use crate::points;
use crate::state::AppState;
use crate::validation;
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Path, State, rejection::JsonRejection},
    http::StatusCode,
    routing::{get, post},
};
use std::sync::Arc;
use tracing::Span;

pub const PROCESS_RECEIPT_PATH: &str = "/receipts/process";
pub const POINTS_PATH: &str = "/receipts/{id}/points";

/// Builds the full HTTP surface: receipt endpoints, health probes and
/// Prometheus metrics.
pub fn build_router(state: Arc<AppState>) -> Router {
    let body_limit = state.config().max_body_bytes;
    let health_checker = Arc::new(HealthChecker::new(state.clone()));

    let receipts = Router::new()
        .route(PROCESS_RECEIPT_PATH, post(process_receipt))
        .route(POINTS_PATH, get(get_points))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state);

    let probes = Router::new()
        .route("/health", get(health::liveness_handler))
        .route("/ready", get(health::readiness_handler))
        .with_state(health_checker);

    receipts
        .merge(probes)
        .route("/metrics", get(metrics_handler))
}

#[tracing::instrument(skip_all, fields(receipt_id))]
async fn process_receipt(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Receipt>, JsonRejection>,
) -> Result<Json<ProcessResponse>, ReceiptError> {
    let metrics = RequestMetrics::new("process_receipt");
    match store_receipt(&state, payload) {
        Ok(id) => {
            Span::current().record("receipt_id", id.as_str());
            tracing::info!(receipt_id = %id, "receipt accepted");
            metrics.success();
            Ok(Json(ProcessResponse { id }))
        }
        Err(err) => {
            metrics.error(err.code().category());
            Err(err)
        }
    }
}

fn store_receipt(
    state: &AppState,
    payload: Result<Json<Receipt>, JsonRejection>,
) -> Result<ReceiptId, ReceiptError> {
    let Json(receipt) =
        payload.map_err(|rejection| ReceiptError::MalformedInput(rejection.body_text()))?;
    let validated = validation::validate(&receipt)?;
    let id = state.store().put(validated);
    METRICS.update_stored(state.store().len());
    Ok(id)
}

#[tracing::instrument(skip_all, fields(receipt_id))]
async fn get_points(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<PointsResponse>, ReceiptError> {
    let metrics = RequestMetrics::new("get_points");
    let id = ReceiptId(id);
    Span::current().record("receipt_id", id.as_str());

    let Some(receipt) = state.store().get(&id) else {
        metrics.error(ErrorCode::NotFound.category());
        return Err(ReceiptError::NotFound(id));
    };

    let breakdown = points::breakdown(&receipt);
    let total = breakdown.total();
    tracing::debug!(?breakdown, points = total, "points computed");
    METRICS.record_points(total);
    metrics.success();

    Ok(Json(PointsResponse { points: total }))
}

async fn metrics_handler() -> (StatusCode, String) {
    (StatusCode::OK, METRICS.encode())
}
