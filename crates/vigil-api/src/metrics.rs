//! Prometheus metrics for the API server.

use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "vigil_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "vigil_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "vigil_http_requests_in_flight";

    // Pipeline metrics (recorded in vigil-pipeline and vigil-media)
    pub const DETECTIONS_TOTAL: &str = "vigil_detections_total";
    pub const ALERTS_DISPATCHED_TOTAL: &str = "vigil_alerts_dispatched_total";
    pub const INFERENCE_DURATION_SECONDS: &str = "vigil_inference_duration_seconds";
    pub const FRAME_DECODE_FAILURES_TOTAL: &str = "vigil_frame_decode_failures_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Sanitize path for metrics labels (collapse IDs to keep cardinality low).
fn sanitize_path(path: &str) -> String {
    let path = regex_lite::Regex::new(r"/[0-9]+(/|$)")
        .unwrap()
        .replace_all(path, "/:id$1");
    path.to_string()
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path() {
        assert_eq!(sanitize_path("/api/v1/media/42"), "/api/v1/media/:id");
        assert_eq!(sanitize_path("/api/v1/alerts"), "/api/v1/alerts");
        assert_eq!(sanitize_path("/health"), "/health");
    }
}
