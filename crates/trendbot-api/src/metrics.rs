//! Prometheus metrics for the API server.

use std::time::Instant;

use axum::body::Body;
use axum::extract::MatchedPath;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "trendbot_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "trendbot_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "trendbot_http_requests_in_flight";

    // Analysis metrics
    pub const ANALYSES_STARTED_TOTAL: &str = "trendbot_analyses_started_total";
    pub const ANALYSES_COMPLETED_TOTAL: &str = "trendbot_analyses_completed_total";
    pub const ANALYSES_FAILED_TOTAL: &str = "trendbot_analyses_failed_total";
    pub const ANALYSIS_DURATION_SECONDS: &str = "trendbot_analysis_duration_seconds";

    // Upstream metrics
    pub const UPSTREAM_CALLS_TOTAL: &str = "trendbot_upstream_calls_total";
    pub const UPSTREAM_CALL_DURATION_SECONDS: &str = "trendbot_upstream_call_duration_seconds";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", path.to_string()),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record an analysis that passed validation.
pub fn record_analysis_started() {
    counter!(names::ANALYSES_STARTED_TOTAL).increment(1);
}

/// Record a successful analysis.
pub fn record_analysis_completed(duration_secs: f64) {
    counter!(names::ANALYSES_COMPLETED_TOTAL).increment(1);
    histogram!(names::ANALYSIS_DURATION_SECONDS).record(duration_secs);
}

/// Record a failed analysis.
pub fn record_analysis_failed(kind: &'static str) {
    counter!(names::ANALYSES_FAILED_TOTAL, "kind" => kind).increment(1);
}

/// Record one call to an upstream service.
pub fn record_upstream_call(service: &'static str, success: bool, duration_secs: f64) {
    let outcome = if success { "success" } else { "error" };
    counter!(names::UPSTREAM_CALLS_TOTAL, "service" => service, "outcome" => outcome).increment(1);
    histogram!(names::UPSTREAM_CALL_DURATION_SECONDS, "service" => service).record(duration_secs);
}

/// Route template for metrics labels; unmatched paths share one label.
fn route_label(request: &Request<Body>) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string())
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = route_label(&request);
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
    fn test_route_label_unmatched() {
        let request = Request::builder()
            .uri("/some/random/path")
            .body(Body::empty())
            .unwrap();
        assert_eq!(route_label(&request), "unmatched");
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_analysis_started();
        record_analysis_failed("upstream_fetch");
        record_upstream_call("youtube", false, 0.25);
    }
}
