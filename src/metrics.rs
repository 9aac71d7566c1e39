//! Prometheus metrics for the receipt service
//!
//! Exposed in text format on `GET /metrics`.

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use prometheus_client::encoding::{EncodeLabelSet, text::encode};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::metrics::histogram::{Histogram, exponential_buckets};
use prometheus_client::registry::Registry;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Global metrics registry instance
pub static METRICS: Lazy<Arc<MetricsCollector>> = Lazy::new(|| Arc::new(MetricsCollector::new()));

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct RequestLabels {
    /// Route name ("process_receipt", "get_points")
    pub endpoint: String,
    /// Outcome ("success" or an error category)
    pub status: String,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct EndpointLabels {
    pub endpoint: String,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct RejectionLabels {
    /// Which check rejected the receipt
    pub reason: String,
}

pub struct MetricsCollector {
    registry: RwLock<Registry>,

    /// Requests by endpoint and outcome
    pub http_requests_total: Family<RequestLabels, Counter>,

    /// Request latency by endpoint
    pub http_request_duration_seconds: Family<EndpointLabels, Histogram>,

    /// Rejected submissions by failed check
    pub rejected_total: Family<RejectionLabels, Counter>,

    /// Receipts currently held in the store
    pub stored: Gauge,

    /// Distribution of awarded points
    pub points_awarded: Histogram,
}

impl MetricsCollector {
    pub fn new() -> Self {
        let mut registry = Registry::with_prefix("receipts");

        let http_requests_total = Family::<RequestLabels, Counter>::default();
        registry.register(
            "http_requests",
            "Total number of HTTP requests",
            http_requests_total.clone(),
        );

        let http_request_duration_seconds =
            Family::<EndpointLabels, Histogram>::new_with_constructor(|| {
                // 100us .. ~1.6s
                Histogram::new(exponential_buckets(0.0001, 2.5, 12))
            });
        registry.register(
            "http_request_duration_seconds",
            "Request latency histogram in seconds",
            http_request_duration_seconds.clone(),
        );

        let rejected_total = Family::<RejectionLabels, Counter>::default();
        registry.register(
            "rejected",
            "Receipt submissions rejected before storage",
            rejected_total.clone(),
        );

        let stored = Gauge::default();
        registry.register("stored", "Receipts held in the store", stored.clone());

        let points_awarded = Histogram::new(exponential_buckets(1.0, 2.0, 12));
        registry.register(
            "points_awarded",
            "Points computed per points query",
            points_awarded.clone(),
        );

        Self {
            registry: RwLock::new(registry),
            http_requests_total,
            http_request_duration_seconds,
            rejected_total,
            stored,
            points_awarded,
        }
    }

    /// Encode metrics in Prometheus text format
    pub fn encode(&self) -> String {
        let mut buffer = String::new();
        let registry = self.registry.read();
        if let Err(err) = encode(&mut buffer, &registry) {
            tracing::error!(?err, "failed to encode metrics");
        }
        buffer
    }

    pub fn record_request(&self, endpoint: &str, status: &str, duration: Duration) {
        self.http_requests_total
            .get_or_create(&RequestLabels {
                endpoint: endpoint.to_string(),
                status: status.to_string(),
            })
            .inc();

        self.http_request_duration_seconds
            .get_or_create(&EndpointLabels {
                endpoint: endpoint.to_string(),
            })
            .observe(duration.as_secs_f64());
    }

    pub fn record_rejection(&self, reason: &str) {
        self.rejected_total
            .get_or_create(&RejectionLabels {
                reason: reason.to_string(),
            })
            .inc();
    }

    pub fn update_stored(&self, count: usize) {
        self.stored.set(count as i64);
    }

    pub fn record_points(&self, points: u64) {
        self.points_awarded.observe(points as f64);
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard that times one request.
///
/// A guard dropped without `success` or `error` is recorded as `"dropped"`,
/// which covers handlers cancelled mid-flight.
pub struct RequestMetrics {
    endpoint: &'static str,
    start: Instant,
    completed: bool,
}

impl RequestMetrics {
    pub fn new(endpoint: &'static str) -> Self {
        Self {
            endpoint,
            start: Instant::now(),
            completed: false,
        }
    }

    pub fn success(mut self) {
        METRICS.record_request(self.endpoint, "success", self.start.elapsed());
        self.completed = true;
    }

    pub fn error(mut self, category: &str) {
        METRICS.record_request(self.endpoint, category, self.start.elapsed());
        self.completed = true;
    }
}

impl Drop for RequestMetrics {
    fn drop(&mut self) {
        if !self.completed {
            METRICS.record_request(self.endpoint, "dropped", self.start.elapsed());
        }
    }
}
