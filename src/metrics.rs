use axum::{
    body::Body,
    extract::MatchedPath,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use once_cell::sync::Lazy;
use prometheus::{
    register_histogram_vec_with_registry, register_int_counter_vec_with_registry, Encoder,
    HistogramVec, IntCounterVec, Registry, TextEncoder,
};
use std::time::Instant;

use crate::errors::ServiceError;

pub static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

static HTTP_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec_with_registry!(
        "http_requests_total",
        "Total number of HTTP requests grouped by method, path and status",
        &["method", "path", "status"],
        REGISTRY
    )
    .expect("register http_requests_total")
});

static HTTP_LATENCY: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec_with_registry!(
        "http_request_duration_seconds",
        "Histogram of response latency in seconds by method and path",
        &["method", "path"],
        REGISTRY
    )
    .expect("register http_request_duration_seconds")
});

/// Records request count and latency for every response.
///
/// The route template (`/api/v1/products/:id`) is used as the path label to
/// keep label cardinality bounded.
pub async fn track_http(request: Request<Body>, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let start = Instant::now();
    let response = next.run(request).await;
    let elapsed = start.elapsed().as_secs_f64();

    let status = response.status().as_u16().to_string();
    HTTP_REQUESTS
        .with_label_values(&[&method, &path, &status])
        .inc();
    HTTP_LATENCY
        .with_label_values(&[&method, &path])
        .observe(elapsed);

    response
}

/// Prometheus text-format exposition endpoint.
pub async fn metrics_endpoint() -> Result<impl IntoResponse, ServiceError> {
    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&REGISTRY.gather(), &mut buffer)
        .map_err(|e| ServiceError::InternalError(format!("metrics encoding failed: {}", e)))?;
    let body = String::from_utf8(buffer)
        .map_err(|e| ServiceError::InternalError(format!("metrics encoding failed: {}", e)))?;
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn exposition_includes_registered_metrics() {
        HTTP_REQUESTS
            .with_label_values(&["GET", "/api/v1/products", "200"])
            .inc();

        let body = metrics_endpoint().await.expect("metrics should encode");
        let text = body.into_response();
        assert_eq!(text.status(), 200);
    }
}
