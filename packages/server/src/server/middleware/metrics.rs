//! Prometheus HTTP metrics.
//!
//! Every request is counted by method, route and status, and timed by method
//! and route. Routes are labelled with their pattern (`/team/get`), never the
//! raw URI, so the label set stays bounded.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::Response;
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};

/// Label used for requests that matched no route.
const UNMATCHED_PATH: &str = "unmatched";

pub struct HttpMetrics {
    registry: Registry,
    requests_total: IntCounterVec,
    request_duration: HistogramVec,
}

impl HttpMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let requests_total = IntCounterVec::new(
            Opts::new("review_service_http_requests_total", "Total HTTP requests"),
            &["method", "path", "status"],
        )?;
        let request_duration = HistogramVec::new(
            HistogramOpts::new(
                "review_service_http_request_duration_seconds",
                "HTTP request duration in seconds",
            ),
            &["method", "path"],
        )?;

        let registry = Registry::new();
        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(request_duration.clone()))?;

        Ok(Self {
            registry,
            requests_total,
            request_duration,
        })
    }

    pub fn observe(&self, method: &str, path: &str, status: &str, elapsed: Duration) {
        self.requests_total
            .with_label_values(&[method, path, status])
            .inc();
        self.request_duration
            .with_label_values(&[method, path])
            .observe(elapsed.as_secs_f64());
    }

    /// Current values in the Prometheus text exposition format.
    pub fn encode(&self) -> prometheus::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

/// Middleware recording request count and latency.
pub async fn track_metrics(metrics: Arc<HttpMetrics>, request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED_PATH.to_string());

    let response = next.run(request).await;

    metrics.observe(&method, &path, response.status().as_str(), start.elapsed());
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_observed_requests() {
        let metrics = HttpMetrics::new().unwrap();
        metrics.observe("POST", "/team/add", "201", Duration::from_millis(12));
        metrics.observe("POST", "/team/add", "201", Duration::from_millis(3));

        let text = metrics.encode().unwrap();

        assert!(text.contains(
            r#"review_service_http_requests_total{method="POST",path="/team/add",status="201"} 2"#
        ));
        assert!(text.contains(
            r#"review_service_http_request_duration_seconds_count{method="POST",path="/team/add"} 2"#
        ));
    }

    #[test]
    fn separate_instances_do_not_share_counts() {
        let first = HttpMetrics::new().unwrap();
        let second = HttpMetrics::new().unwrap();
        first.observe("GET", "/health", "200", Duration::from_millis(1));

        assert!(!second.encode().unwrap().contains("/health"));
    }
}
