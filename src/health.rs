use crate::state::AppState;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::SystemTime;

/// Health status for a component or the overall system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

impl HealthStatus {
    pub fn status_code(&self) -> StatusCode {
        match self {
            HealthStatus::Healthy => StatusCode::OK,
            HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Returns the worse of the two statuses
    pub fn combine(self, other: Self) -> Self {
        match (self, other) {
            (HealthStatus::Healthy, HealthStatus::Healthy) => HealthStatus::Healthy,
            _ => HealthStatus::Unhealthy,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub component: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ComponentHealth {
    pub fn healthy(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            status: HealthStatus::Healthy,
            error: None,
            details: None,
        }
    }

    pub fn healthy_with_details(component: impl Into<String>, details: serde_json::Value) -> Self {
        Self {
            component: component.into(),
            status: HealthStatus::Healthy,
            error: None,
            details: Some(details),
        }
    }

    pub fn unhealthy(component: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            status: HealthStatus::Unhealthy,
            error: Some(error.into()),
            details: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub timestamp: i64,
    pub version: String,
}

impl IntoResponse for HealthResponse {
    fn into_response(self) -> Response {
        let status = self.status.status_code();
        (status, Json(self)).into_response()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub status: HealthStatus,
    pub timestamp: i64,
    pub components: HashMap<String, ComponentHealth>,
}

impl IntoResponse for ReadinessResponse {
    fn into_response(self) -> Response {
        let status = if self.ready {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        };
        (status, Json(self)).into_response()
    }
}

#[derive(Clone)]
pub struct HealthChecker {
    state: Arc<AppState>,
}

impl HealthChecker {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Healthy whenever the process is able to answer
    pub fn liveness(&self) -> HealthResponse {
        HealthResponse {
            status: HealthStatus::Healthy,
            timestamp: now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn readiness(&self) -> ReadinessResponse {
        let mut components = HashMap::new();
        components.insert("server".to_string(), self.check_server());
        components.insert("store".to_string(), self.check_store());

        let status = components
            .values()
            .fold(HealthStatus::Healthy, |acc, health| acc.combine(health.status));

        ReadinessResponse {
            ready: status != HealthStatus::Unhealthy,
            status,
            timestamp: now(),
            components,
        }
    }

    /// Stops accepting traffic once graceful shutdown has begun.
    fn check_server(&self) -> ComponentHealth {
        if self.state.is_shutting_down() {
            ComponentHealth::unhealthy("server", "shutting down")
        } else {
            ComponentHealth::healthy("server")
        }
    }

    fn check_store(&self) -> ComponentHealth {
        let stored = self.state.store().len();
        ComponentHealth::healthy_with_details(
            "store",
            serde_json::json!({
                "receipts": stored,
            }),
        )
    }
}

fn now() -> i64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

pub async fn liveness_handler(State(checker): State<Arc<HealthChecker>>) -> impl IntoResponse {
    checker.liveness()
}

pub async fn readiness_handler(State(checker): State<Arc<HealthChecker>>) -> impl IntoResponse {
    checker.readiness()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;

    #[test]
    fn health_status_combine() {
        use HealthStatus::*;
        assert_eq!(Healthy.combine(Healthy), Healthy);
        assert_eq!(Healthy.combine(Unhealthy), Unhealthy);
        assert_eq!(Unhealthy.combine(Healthy), Unhealthy);
    }

    #[test]
    fn health_status_codes() {
        assert_eq!(HealthStatus::Healthy.status_code(), StatusCode::OK);
        assert_eq!(
            HealthStatus::Unhealthy.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn readiness_reports_store_component() {
        let state = Arc::new(AppState::new(Arc::new(ServerConfig::default())));
        let readiness = HealthChecker::new(state).readiness();

        assert!(readiness.ready);
        assert_eq!(readiness.status, HealthStatus::Healthy);
        let store = &readiness.components["store"];
        assert_eq!(store.details, Some(serde_json::json!({"receipts": 0})));
    }

    #[test]
    fn readiness_fails_once_shutdown_begins() {
        let token = tokio_util::sync::CancellationToken::new();
        let state = Arc::new(
            AppState::new(Arc::new(ServerConfig::default())).with_shutdown_token(token.clone()),
        );
        let checker = HealthChecker::new(state);
        assert!(checker.readiness().ready);

        token.cancel();
        let readiness = checker.readiness();
        assert!(!readiness.ready);
        assert_eq!(readiness.status, HealthStatus::Unhealthy);
        let server = &readiness.components["server"];
        assert_eq!(server.error.as_deref(), Some("shutting down"));
        assert_eq!(
            readiness.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
